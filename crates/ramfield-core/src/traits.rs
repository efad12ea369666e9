//! The raw-data loader seam between the engine and on-disk storage.

use ndarray::ArrayD;
use ramfield_units::UnitExpr;

use crate::error::FieldError;
use crate::key::{Chunk, FieldKey};

/// Supplies on-disk field values for a chunk.
///
/// Implementations read the simulation's native storage. The engine calls
/// [`load`](RawLoader::load) at most once per raw field and chunk within one
/// evaluation context, so a loader need not cache.
///
/// Loaders are shared across worker threads during parallel evaluation.
pub trait RawLoader: Send + Sync {
    /// Read the values of an on-disk field for `chunk`.
    ///
    /// Returns [`FieldError::DataNotFound`] when the field is not stored.
    fn load(&self, key: &FieldKey, chunk: &Chunk) -> Result<ArrayD<f64>, FieldError>;

    /// The unit the loader's values are stored in, when the loader knows it
    /// better than the field definition does.
    fn native_unit(&self, _key: &FieldKey) -> Option<UnitExpr> {
        None
    }
}

impl<L: RawLoader + ?Sized> RawLoader for std::sync::Arc<L> {
    fn load(&self, key: &FieldKey, chunk: &Chunk) -> Result<ArrayD<f64>, FieldError> {
        (**self).load(key, chunk)
    }

    fn native_unit(&self, key: &FieldKey) -> Option<UnitExpr> {
        (**self).native_unit(key)
    }
}
