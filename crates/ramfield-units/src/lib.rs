//! Symbolic unit algebra for Ramfield.
//!
//! Units are products of named symbols raised to rational powers. Every
//! [`UnitExpr`] caches its [`Dimensions`] and its scale relative to CGS, so
//! conversion between two expressions is a dimension check plus a ratio of
//! scales:
//!
//! ```
//! use ramfield_units::{convert, UnitSymbols};
//! use ndarray::arr1;
//!
//! let symbols = UnitSymbols::cgs();
//! let kms = symbols.parse("km/s").unwrap();
//! let cms = symbols.parse("cm/s").unwrap();
//! let out = convert(&arr1(&[2.0]).into_dyn(), &kms, &cms).unwrap();
//! assert_eq!(out[[0]], 2.0e5);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dimension;
pub mod error;
pub mod expr;
pub mod quantity;
pub mod rational;
pub mod symbols;

pub use dimension::{BaseDimension, Dimensions};
pub use error::UnitError;
pub use expr::{convert, UnitExpr};
pub use quantity::Quantity;
pub use rational::Rational;
pub use symbols::UnitSymbols;
