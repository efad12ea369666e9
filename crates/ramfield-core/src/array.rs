//! [`FieldArray`]: an n-dimensional array of values carrying a unit.

use ndarray::ArrayD;
use ramfield_units::{convert, Quantity, UnitError, UnitExpr};

use crate::error::FieldError;

/// Field values together with their unit.
///
/// Arithmetic keeps units consistent: products and quotients combine units
/// algebraically, sums and differences convert the right operand into the
/// left operand's unit first. Operands must have identical shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    values: ArrayD<f64>,
    unit: UnitExpr,
}

impl FieldArray {
    /// Wrap values with a unit.
    pub fn new(values: ArrayD<f64>, unit: UnitExpr) -> Self {
        Self { values, unit }
    }

    /// Wrap values as dimensionless.
    pub fn dimensionless(values: ArrayD<f64>) -> Self {
        Self::new(values, UnitExpr::dimensionless())
    }

    /// A 1-D array from a vector.
    pub fn from_vec(values: Vec<f64>, unit: UnitExpr) -> Self {
        Self::new(ndarray::Array1::from(values).into_dyn(), unit)
    }

    /// The raw values, expressed in [`unit`](Self::unit).
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Consume and return the raw values.
    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    /// Unit of the values.
    pub fn unit(&self) -> &UnitExpr {
        &self.unit
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Express the values in another unit.
    pub fn to(&self, unit: &UnitExpr) -> Result<FieldArray, UnitError> {
        Ok(FieldArray::new(
            convert(&self.values, &self.unit, unit)?,
            unit.clone(),
        ))
    }

    /// Raw values converted into `unit`, without the unit attached.
    pub fn values_in(&self, unit: &UnitExpr) -> Result<ArrayD<f64>, UnitError> {
        convert(&self.values, &self.unit, unit)
    }

    /// Replace the unit without touching the values.
    pub fn with_unit(self, unit: UnitExpr) -> FieldArray {
        FieldArray::new(self.values, unit)
    }

    fn check_shape(&self, other: &FieldArray) -> Result<(), FieldError> {
        if self.shape() != other.shape() {
            return Err(FieldError::ShapeMismatch {
                left: self.shape().to_vec(),
                right: other.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// Element-wise product.
    pub fn mul(&self, other: &FieldArray) -> Result<FieldArray, FieldError> {
        self.check_shape(other)?;
        Ok(FieldArray::new(
            &self.values * &other.values,
            self.unit.multiply(&other.unit)?,
        ))
    }

    /// Element-wise quotient.
    pub fn div(&self, other: &FieldArray) -> Result<FieldArray, FieldError> {
        self.check_shape(other)?;
        Ok(FieldArray::new(
            &self.values / &other.values,
            self.unit.divide(&other.unit)?,
        ))
    }

    /// Element-wise sum in the left operand's unit.
    pub fn add(&self, other: &FieldArray) -> Result<FieldArray, FieldError> {
        self.check_shape(other)?;
        let rhs = other.values_in(&self.unit)?;
        Ok(FieldArray::new(&self.values + &rhs, self.unit.clone()))
    }

    /// Element-wise difference in the left operand's unit.
    pub fn sub(&self, other: &FieldArray) -> Result<FieldArray, FieldError> {
        self.check_shape(other)?;
        let rhs = other.values_in(&self.unit)?;
        Ok(FieldArray::new(&self.values - &rhs, self.unit.clone()))
    }

    /// Multiply every element by a dimensionless scalar.
    pub fn scale(&self, k: f64) -> FieldArray {
        FieldArray::new(self.values.mapv(|v| v * k), self.unit.clone())
    }

    /// Multiply every element by a quantity; units combine.
    pub fn mul_quantity(&self, q: &Quantity) -> Result<FieldArray, FieldError> {
        Ok(FieldArray::new(
            self.values.mapv(|v| v * q.value),
            self.unit.multiply(&q.unit)?,
        ))
    }

    /// Divide every element by a quantity; units combine.
    pub fn div_quantity(&self, q: &Quantity) -> Result<FieldArray, FieldError> {
        Ok(FieldArray::new(
            self.values.mapv(|v| v / q.value),
            self.unit.divide(&q.unit)?,
        ))
    }

    /// `quantity - self`, in the quantity's unit.
    pub fn subtract_from(&self, q: &Quantity) -> Result<FieldArray, FieldError> {
        let mine = self.values_in(&q.unit)?;
        Ok(FieldArray::new(mine.mapv(|v| q.value - v), q.unit.clone()))
    }
}
