//! Core types and traits for the Ramfield field engine.
//!
//! Defines the fundamental abstractions shared by the evaluator and the
//! frontends: field keys, chunks, unit-bearing arrays, error types, the
//! raw-data loader trait, and the warning sink.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod diagnostics;
pub mod error;
pub mod key;
pub mod traits;

pub use array::FieldArray;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::FieldError;
pub use key::{Chunk, ChunkId, FieldKey, SamplingType};
pub use traits::RawLoader;
