//! Field registry and dependency-aware evaluation.
//!
//! A [`FieldRegistry`] holds one definition per [`FieldKey`](ramfield_core::FieldKey):
//! raw (supplied by a [`RawLoader`](ramfield_core::RawLoader)), derived
//! (computed by a [`DerivedField`] from other fields), or an alias of
//! another key. An [`EvalContext`] resolves requests recursively against one
//! chunk, memoizing every result and rejecting cycles. The [`Evaluator`]
//! creates contexts and fans a request out over many chunks.
//!
//! Dependencies are discovered by the field functions themselves at run
//! time: a derived field asks the context for whatever it needs, and the
//! context recurses.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod derived;
pub mod evaluator;
pub mod registry;

pub use context::EvalContext;
pub use derived::DerivedField;
pub use evaluator::Evaluator;
pub use registry::{DeclaredUnit, FieldDefinition, FieldRegistry, FieldSource};
