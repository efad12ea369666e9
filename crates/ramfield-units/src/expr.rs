//! [`UnitExpr`]: an immutable product of named unit symbols.

use std::fmt;
use std::sync::Arc;

use ndarray::ArrayD;
use smallvec::SmallVec;

use crate::dimension::Dimensions;
use crate::error::UnitError;
use crate::rational::Rational;

/// Relative tolerance when deciding two scales are the same.
const SCALE_RTOL: f64 = 1e-12;

/// One named symbol raised to a rational power.
#[derive(Clone, Debug, PartialEq)]
struct Term {
    symbol: Arc<str>,
    exp: Rational,
    /// Dimensions of the bare symbol.
    dims: Dimensions,
    /// Scale of the bare symbol relative to CGS.
    scale: f64,
}

impl Term {
    fn same_definition(&self, other: &Term) -> bool {
        self.dims == other.dims
            && (self.scale - other.scale).abs() <= SCALE_RTOL * self.scale.abs().max(other.scale.abs())
    }
}

/// A unit expression: a numeric factor times a product of symbols with
/// rational exponents.
///
/// Each expression caches its total [`Dimensions`] and its scale relative to
/// the canonical CGS base, so algebra never needs the symbol table. Terms are
/// kept sorted by symbol name, which makes [`Display`](fmt::Display) output
/// deterministic.
///
/// Expressions are immutable; every operation returns a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitExpr {
    factor: f64,
    terms: SmallVec<[Term; 4]>,
    dims: Dimensions,
    scale: f64,
}

impl UnitExpr {
    /// The dimensionless unit with scale one.
    pub fn dimensionless() -> Self {
        Self {
            factor: 1.0,
            terms: SmallVec::new(),
            dims: Dimensions::DIMENSIONLESS,
            scale: 1.0,
        }
    }

    /// A single symbol with the given dimensions and CGS scale.
    ///
    /// Normally called by [`UnitSymbols`](crate::UnitSymbols); exposed for
    /// callers that build ad-hoc symbols.
    pub fn symbol(name: &str, dims: Dimensions, scale: f64) -> Self {
        let term = Term {
            symbol: Arc::from(name),
            exp: Rational::ONE,
            dims,
            scale,
        };
        Self {
            factor: 1.0,
            terms: std::iter::once(term).collect(),
            dims,
            scale,
        }
    }

    /// `None` when a term's exponent overflows the dimension algebra.
    fn from_parts(factor: f64, mut terms: SmallVec<[Term; 4]>) -> Option<Self> {
        terms.retain(|t| !t.exp.is_zero());
        terms.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let mut dims = Dimensions::DIMENSIONLESS;
        let mut scale = factor;
        for t in &terms {
            dims = dims.multiply(&t.dims.pow(t.exp)?)?;
            scale *= t.scale.powf(t.exp.to_f64());
        }
        Some(Self {
            factor,
            terms,
            dims,
            scale,
        })
    }

    /// Total dimension exponents.
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    /// Scale relative to the canonical CGS unit of the same dimensions.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The bare numeric factor (1 unless a literal appeared in the source).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether the dimension exponents are all zero.
    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_dimensionless()
    }

    /// Symbol names and exponents in canonical order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, Rational)> + '_ {
        self.terms.iter().map(|t| (&*t.symbol, t.exp))
    }

    /// `self * other`.
    ///
    /// Both operands must draw each symbol name from one definition; a
    /// name with two different scales or dimensions is
    /// [`UnitError::ConflictingSymbol`].
    pub fn multiply(&self, other: &UnitExpr) -> Result<UnitExpr, UnitError> {
        let overflow = || UnitError::ExponentOverflow {
            expr: format!("({self})*({other})"),
        };
        let mut terms = self.terms.clone();
        for o in &other.terms {
            match terms.iter_mut().find(|t| t.symbol == o.symbol) {
                Some(t) if !t.same_definition(o) => {
                    return Err(UnitError::ConflictingSymbol {
                        name: o.symbol.to_string(),
                    })
                }
                Some(t) => t.exp = t.exp.checked_add(o.exp).ok_or_else(overflow)?,
                None => terms.push(o.clone()),
            }
        }
        Self::from_parts(self.factor * other.factor, terms).ok_or_else(overflow)
    }

    /// `self / other`.
    pub fn divide(&self, other: &UnitExpr) -> Result<UnitExpr, UnitError> {
        self.multiply(&other.powi(-1)?)
    }

    /// `self ** n` for a rational `n`.
    pub fn pow(&self, n: Rational) -> Result<UnitExpr, UnitError> {
        let overflow = || UnitError::ExponentOverflow {
            expr: format!("({self})**({n})"),
        };
        let terms = self
            .terms
            .iter()
            .map(|t| {
                Some(Term {
                    exp: t.exp.checked_mul(n)?,
                    ..t.clone()
                })
            })
            .collect::<Option<SmallVec<[Term; 4]>>>()
            .ok_or_else(overflow)?;
        Self::from_parts(self.factor.powf(n.to_f64()), terms).ok_or_else(overflow)
    }

    /// `self ** n` for an integer `n`.
    pub fn powi(&self, n: i32) -> Result<UnitExpr, UnitError> {
        self.pow(Rational::integer(n))
    }

    /// Multiply the numeric factor by `k`.
    pub fn scaled(&self, k: f64) -> UnitExpr {
        Self {
            factor: self.factor * k,
            terms: self.terms.clone(),
            dims: self.dims,
            scale: self.scale * k,
        }
    }

    /// Whether values in `self` can be converted to `other`.
    pub fn is_convertible_to(&self, other: &UnitExpr) -> bool {
        self.dims == other.dims
    }

    /// Same dimensions and (within rounding) the same scale, so values need
    /// no rescaling even if the symbols differ.
    pub fn is_equivalent(&self, other: &UnitExpr) -> bool {
        self.dims == other.dims
            && ((self.scale - other.scale).abs() <= SCALE_RTOL * self.scale.abs().max(other.scale.abs()))
    }

    /// Multiplier taking a value in `self` to a value in `to`.
    pub fn conversion_factor(&self, to: &UnitExpr) -> Result<f64, UnitError> {
        if !self.is_convertible_to(to) {
            return Err(UnitError::IncompatibleUnits {
                from: self.to_string(),
                from_dims: self.dims.to_string(),
                to: to.to_string(),
                to_dims: to.dims.to_string(),
            });
        }
        Ok(self.scale / to.scale)
    }
}

impl Default for UnitExpr {
    fn default() -> Self {
        Self::dimensionless()
    }
}

/// Convert an array of values from one unit to another.
///
/// Fails with [`UnitError::IncompatibleUnits`] when the dimension vectors
/// differ. Converting between equivalent units returns an unscaled copy.
pub fn convert(
    values: &ArrayD<f64>,
    from: &UnitExpr,
    to: &UnitExpr,
) -> Result<ArrayD<f64>, UnitError> {
    let k = from.conversion_factor(to)?;
    if from.is_equivalent(to) {
        return Ok(values.clone());
    }
    Ok(values.mapv(|v| v * k))
}

fn fmt_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let a = x.abs();
    if (1e-3..1e6).contains(&a) {
        write!(f, "{x}")
    } else {
        write!(f, "{x:e}")
    }
}

fn fmt_exponent(f: &mut fmt::Formatter<'_>, e: Rational) -> fmt::Result {
    if e == Rational::ONE {
        Ok(())
    } else if e.is_integer() {
        write!(f, "**{}", e.numer())
    } else {
        write!(f, "**({}/{})", e.numer(), e.denom())
    }
}

impl fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() && self.factor == 1.0 {
            return write!(f, "dimensionless");
        }
        let mut wrote = false;
        if self.factor != 1.0 {
            fmt_number(f, self.factor)?;
            wrote = true;
        }
        for t in self.terms.iter().filter(|t| !t.exp.is_negative()) {
            if wrote {
                write!(f, "*")?;
            }
            write!(f, "{}", t.symbol)?;
            fmt_exponent(f, t.exp)?;
            wrote = true;
        }
        if !wrote {
            write!(f, "1")?;
        }
        for t in self.terms.iter().filter(|t| t.exp.is_negative()) {
            write!(f, "/{}", t.symbol)?;
            fmt_exponent(f, t.exp.abs())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::BaseDimension;
    use ndarray::arr1;

    fn cm() -> UnitExpr {
        UnitExpr::symbol("cm", Dimensions::base(BaseDimension::Length), 1.0)
    }

    fn km() -> UnitExpr {
        UnitExpr::symbol("km", Dimensions::base(BaseDimension::Length), 1e5)
    }

    fn s() -> UnitExpr {
        UnitExpr::symbol("s", Dimensions::base(BaseDimension::Time), 1.0)
    }

    #[test]
    fn divide_cancels_matching_terms() {
        let u = cm().divide(&cm()).unwrap();
        assert!(u.is_dimensionless());
        assert_eq!(u.to_string(), "dimensionless");
    }

    #[test]
    fn display_numerator_then_denominators() {
        let u = cm().powi(3).unwrap().divide(&s()).unwrap();
        assert_eq!(u.to_string(), "cm**3/s");
        let inv = s().powi(-2).unwrap();
        assert_eq!(inv.to_string(), "1/s**2");
    }

    #[test]
    fn fractional_exponents_display_in_parens() {
        let u = cm().pow(Rational::new(-1, 2).unwrap()).unwrap();
        assert_eq!(u.to_string(), "1/cm**(1/2)");
    }

    #[test]
    fn km_per_s_to_cm_per_s() {
        let from = km().divide(&s()).unwrap();
        let to = cm().divide(&s()).unwrap();
        let out = convert(&arr1(&[1.0, 2.0]).into_dyn(), &from, &to).unwrap();
        assert_eq!(out, arr1(&[1e5, 2e5]).into_dyn());
    }

    #[test]
    fn incompatible_conversion_fails() {
        let err = cm().conversion_factor(&s()).unwrap_err();
        assert!(matches!(err, UnitError::IncompatibleUnits { .. }));
    }

    #[test]
    fn equivalent_despite_different_symbols() {
        let a = km();
        let b = cm().scaled(1e5);
        assert!(a.is_equivalent(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn exponent_overflow_is_an_error() {
        let err = cm().powi(65536).unwrap().powi(65536).unwrap_err();
        assert!(matches!(err, UnitError::ExponentOverflow { .. }));
        let err = cm().powi(i32::MAX).unwrap().multiply(&cm()).unwrap_err();
        assert!(matches!(err, UnitError::ExponentOverflow { .. }));
    }

    #[test]
    fn same_name_with_two_scales_conflicts() {
        let mine = UnitExpr::symbol("code_length", Dimensions::base(BaseDimension::Length), 3.0e24);
        let theirs = UnitExpr::symbol("code_length", Dimensions::base(BaseDimension::Length), 1.0e21);
        let err = mine.multiply(&theirs).unwrap_err();
        assert_eq!(
            err,
            UnitError::ConflictingSymbol {
                name: "code_length".into()
            }
        );
        assert_eq!(mine.multiply(&mine).unwrap().to_string(), "code_length**2");
    }
}
