//! Base physical dimensions and their exponent vectors.

use std::fmt;

use crate::rational::Rational;

/// A base physical dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseDimension {
    /// Length (L), canonical unit `cm`.
    Length,
    /// Mass (M), canonical unit `g`.
    Mass,
    /// Time (T), canonical unit `s`.
    Time,
    /// Temperature (Θ), canonical unit `K`.
    Temperature,
}

impl BaseDimension {
    /// All base dimensions in storage order.
    pub const ALL: [BaseDimension; 4] = [
        BaseDimension::Length,
        BaseDimension::Mass,
        BaseDimension::Time,
        BaseDimension::Temperature,
    ];

    /// Short symbol used in diagnostics.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Length => "L",
            Self::Mass => "M",
            Self::Time => "T",
            Self::Temperature => "Θ",
        }
    }

    const fn index(&self) -> usize {
        match self {
            Self::Length => 0,
            Self::Mass => 1,
            Self::Time => 2,
            Self::Temperature => 3,
        }
    }
}

/// Exponent of each [`BaseDimension`].
///
/// Two unit expressions are convertible iff their `Dimensions` are equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    exps: [Rational; 4],
}

impl Dimensions {
    /// All exponents zero.
    pub const DIMENSIONLESS: Dimensions = Dimensions {
        exps: [Rational::ZERO; 4],
    };

    /// A single base dimension raised to the first power.
    pub fn base(dim: BaseDimension) -> Self {
        let mut out = Self::DIMENSIONLESS;
        out.exps[dim.index()] = Rational::ONE;
        out
    }

    /// Build from integer exponents `(length, mass, time, temperature)`.
    pub fn from_ints(length: i32, mass: i32, time: i32, temperature: i32) -> Self {
        Self {
            exps: [
                Rational::integer(length),
                Rational::integer(mass),
                Rational::integer(time),
                Rational::integer(temperature),
            ],
        }
    }

    /// Exponent of one base dimension.
    pub fn exponent(&self, dim: BaseDimension) -> Rational {
        self.exps[dim.index()]
    }

    /// Whether every exponent is zero.
    pub fn is_dimensionless(&self) -> bool {
        self.exps.iter().all(Rational::is_zero)
    }

    /// Dimensions of the Gaussian magnetic field, `g**(1/2)/(cm**(1/2)*s)`.
    pub fn magnetic() -> Self {
        Self {
            exps: [-Rational::HALF, Rational::HALF, Rational::integer(-1), Rational::ZERO],
        }
    }

    /// Exponents add. `None` when an exponent leaves the representable
    /// range.
    pub fn multiply(&self, other: &Dimensions) -> Option<Dimensions> {
        let mut exps = self.exps;
        for (e, o) in exps.iter_mut().zip(other.exps.iter()) {
            *e = e.checked_add(*o)?;
        }
        Some(Dimensions { exps })
    }

    /// Exponents subtract.
    pub fn divide(&self, other: &Dimensions) -> Option<Dimensions> {
        let mut exps = self.exps;
        for (e, o) in exps.iter_mut().zip(other.exps.iter()) {
            *e = e.checked_sub(*o)?;
        }
        Some(Dimensions { exps })
    }

    /// Exponents scale.
    pub fn pow(&self, n: Rational) -> Option<Dimensions> {
        let mut exps = self.exps;
        for e in exps.iter_mut() {
            *e = e.checked_mul(n)?;
        }
        Some(Dimensions { exps })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let mut first = true;
        for dim in BaseDimension::ALL {
            let e = self.exponent(dim);
            if e.is_zero() {
                continue;
            }
            if !first {
                write!(f, "·")?;
            }
            first = false;
            if e == Rational::ONE {
                write!(f, "{}", dim.symbol())?;
            } else {
                write!(f, "{}^({e})", dim.symbol())?;
            }
        }
        Ok(())
    }
}
