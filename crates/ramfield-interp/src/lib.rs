//! Bilinear lookup-table interpolation.
//!
//! A [`BilinearInterpolator`] wraps two monotone sample axes and a 2-D table
//! of values. Queries are vectorised over arrays of any shape and the output
//! keeps the query shape. A [`TableStack`] holds several tables that share
//! the same axes, such as per-species abundances.
//!
//! ```
//! use ndarray::{arr1, arr2};
//! use ramfield_interp::{BilinearInterpolator, BoundsPolicy};
//!
//! let table = arr2(&[[1.0, 1.0], [1.2, 1.2]]);
//! let interp = BilinearInterpolator::new(vec![0.0, 1.0], vec![4.0, 5.0], table, BoundsPolicy::Clamp)?;
//! let out = interp.evaluate(&arr1(&[0.5]).into_dyn(), &arr1(&[4.0]).into_dyn())?;
//! assert!((out[[0]] - 1.1).abs() < 1e-12);
//! # Ok::<(), ramfield_interp::InterpError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod axis;
pub mod bilinear;
pub mod error;
pub mod stack;

pub use axis::Axis;
pub use bilinear::{BilinearInterpolator, BoundsPolicy};
pub use error::InterpError;
pub use stack::TableStack;
