//! The [`DerivedField`] trait.

use ramfield_core::{FieldArray, FieldError};

use crate::context::EvalContext;

/// Computes a field from other fields.
///
/// # Contract
///
/// - `evaluate()` reads its inputs through `ctx` (`ctx.get(..)`), which
///   memoizes them and detects cycles.
/// - Implementations capture any dataset configuration they need when they
///   are constructed; evaluation must not consult global state.
/// - The returned array may carry any unit convertible to the field's
///   declared unit; the context converts it.
///
/// # Object safety
///
/// The registry stores fields as `Arc<dyn DerivedField>`. Plain closures
/// implement the trait.
///
/// # Examples
///
/// ```
/// use ramfield_core::{FieldArray, FieldError};
/// use ramfield_eval::{DerivedField, EvalContext};
///
/// struct Doubled;
///
/// impl DerivedField for Doubled {
///     fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError> {
///         Ok(ctx.field("gas", "density")?.scale(2.0))
///     }
/// }
/// ```
pub trait DerivedField: Send + Sync {
    /// Compute the field for the context's chunk.
    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError>;
}

impl<F> DerivedField for F
where
    F: Fn(&mut EvalContext<'_>) -> Result<FieldArray, FieldError> + Send + Sync,
{
    fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<FieldArray, FieldError> {
        self(ctx)
    }
}
