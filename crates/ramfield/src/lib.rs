//! Ramfield: a derived-field engine for RAMSES simulation outputs.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Ramfield sub-crates. For most users, adding `ramfield` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ramfield::prelude::*;
//! use ramfield_test_utils::MockLoader;
//!
//! let params = DatasetParams::default()
//!     .with_fields([("ramses", "Density"), ("ramses", "Pressure")]);
//! let fields = FieldSetBuilder::new(params).build().unwrap();
//!
//! let loader = MockLoader::new()
//!     .with_field(("ramses", "Density"), vec![2.0])
//!     .with_field(("ramses", "Pressure"), vec![4.0]);
//! let ev = fields.evaluator(&loader);
//! let rho = ev.get(&FieldKey::new("gas", "density"), Chunk::new(0, 1)).unwrap();
//! assert_eq!(rho.unit().to_string(), "g/cm**3");
//! assert_eq!(rho.values()[[0]], 2.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`units`] | `ramfield-units` | Unit expressions, symbol tables, quantities |
//! | [`types`] | `ramfield-core` | Field keys, chunks, unit-bearing arrays, loader trait |
//! | [`interp`] | `ramfield-interp` | Bilinear table interpolation |
//! | [`eval`] | `ramfield-eval` | Field registry and dependency-aware evaluation |
//! | [`ramses`] | `ramfield-ramses` | RAMSES parameters, tables, and field families |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Unit algebra (`ramfield-units`).
///
/// Parse unit strings with [`units::UnitSymbols`] and convert arrays with
/// [`units::convert`].
pub use ramfield_units as units;

/// Core types and traits (`ramfield-core`).
///
/// Contains [`types::FieldKey`], [`types::FieldArray`], the
/// [`types::RawLoader`] trait, and the [`types::Diagnostics`] warning sink.
pub use ramfield_core as types;

/// Lookup-table interpolation (`ramfield-interp`).
pub use ramfield_interp as interp;

/// Registry and evaluation (`ramfield-eval`).
///
/// Register fields in an [`eval::FieldRegistry`] and resolve them with an
/// [`eval::Evaluator`].
pub use ramfield_eval as eval;

/// The RAMSES frontend (`ramfield-ramses`).
///
/// Build a dataset's field set with [`ramses::FieldSetBuilder`].
pub use ramfield_ramses as ramses;

/// Common imports for typical Ramfield usage.
///
/// ```rust
/// use ramfield::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use ramfield_core::{
        Chunk, ChunkId, Diagnostics, FieldArray, FieldError, FieldKey, RawLoader, SamplingType,
    };

    // Units
    pub use ramfield_units::{Quantity, UnitError, UnitExpr, UnitSymbols};

    // Interpolation
    pub use ramfield_interp::{BilinearInterpolator, BoundsPolicy};

    // Evaluation
    pub use ramfield_eval::{
        DeclaredUnit, DerivedField, EvalContext, Evaluator, FieldDefinition, FieldRegistry,
    };

    // RAMSES
    pub use ramfield_ramses::{
        Capabilities, CosmicClock, DatasetParams, FieldSetBuilder, FrontendError, RamsesFields,
        RegistrationPass,
    };
}
