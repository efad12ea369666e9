//! Scalar values with units.

use std::fmt;

use crate::error::UnitError;
use crate::expr::UnitExpr;

/// A scalar paired with its unit. Used for physical constants and
/// per-dataset conversion factors.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    /// Numeric value expressed in [`unit`](Quantity::unit).
    pub value: f64,
    /// Unit of `value`.
    pub unit: UnitExpr,
}

impl Quantity {
    /// Pair a value with a unit.
    pub fn new(value: f64, unit: UnitExpr) -> Self {
        Self { value, unit }
    }

    /// A dimensionless number.
    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, UnitExpr::dimensionless())
    }

    /// Express in another unit.
    pub fn to(&self, unit: &UnitExpr) -> Result<Quantity, UnitError> {
        let k = self.unit.conversion_factor(unit)?;
        Ok(Quantity::new(self.value * k, unit.clone()))
    }

    /// Numeric value in another unit.
    pub fn value_in(&self, unit: &UnitExpr) -> Result<f64, UnitError> {
        Ok(self.to(unit)?.value)
    }

    /// Product; units multiply.
    pub fn mul(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(
            self.value * other.value,
            self.unit.multiply(&other.unit)?,
        ))
    }

    /// Quotient; units divide.
    pub fn div(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(
            self.value / other.value,
            self.unit.divide(&other.unit)?,
        ))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
