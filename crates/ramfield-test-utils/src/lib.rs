//! Test utilities and mock types for Ramfield development.
//!
//! Provides a [`MockLoader`] implementing [`RawLoader`] with per-field load
//! counters, writers for RAMSES-style text and binary fixtures, and a
//! logging initialiser for tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use ndarray::{Array1, ArrayD};
use ramfield_core::{Chunk, ChunkId, FieldError, FieldKey, RawLoader};
use ramfield_units::UnitExpr;

pub use fixtures::{write_cooling_table, write_info_file, write_rt_info_file, CoolingTableFixture};

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock implementation of [`RawLoader`].
///
/// Backed by a `HashMap<FieldKey, ArrayD<f64>>` shared by every chunk, with
/// optional per-chunk overrides. Counts how many times each key is loaded
/// so tests can assert memoization.
#[derive(Default)]
pub struct MockLoader {
    fields: HashMap<FieldKey, ArrayD<f64>>,
    per_chunk: HashMap<(FieldKey, ChunkId), ArrayD<f64>>,
    units: HashMap<FieldKey, UnitExpr>,
    loads: Mutex<HashMap<FieldKey, usize>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a 1-D field for every chunk.
    pub fn set_field(&mut self, key: impl Into<FieldKey>, data: Vec<f64>) {
        self.fields
            .insert(key.into(), Array1::from(data).into_dyn());
    }

    /// Builder form of [`set_field`](Self::set_field).
    pub fn with_field(mut self, key: impl Into<FieldKey>, data: Vec<f64>) -> Self {
        self.set_field(key, data);
        self
    }

    /// Pre-populate a 1-D field for one chunk only.
    pub fn set_chunk_field(&mut self, key: impl Into<FieldKey>, chunk: ChunkId, data: Vec<f64>) {
        self.per_chunk
            .insert((key.into(), chunk), Array1::from(data).into_dyn());
    }

    /// Report a native unit for a key.
    pub fn set_native_unit(&mut self, key: impl Into<FieldKey>, unit: UnitExpr) {
        self.units.insert(key.into(), unit);
    }

    /// Number of times `key` has been loaded.
    pub fn load_count(&self, key: &FieldKey) -> usize {
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Total loads across all keys.
    pub fn total_loads(&self) -> usize {
        self.loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl RawLoader for MockLoader {
    fn load(&self, key: &FieldKey, chunk: &Chunk) -> Result<ArrayD<f64>, FieldError> {
        let data = self
            .per_chunk
            .get(&(key.clone(), chunk.id))
            .or_else(|| self.fields.get(key))
            .cloned()
            .ok_or_else(|| FieldError::DataNotFound {
                key: key.clone(),
                chunk: chunk.id,
            })?;
        *self
            .loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_insert(0) += 1;
        Ok(data)
    }

    fn native_unit(&self, key: &FieldKey) -> Option<UnitExpr> {
        self.units.get(key).cloned()
    }
}
