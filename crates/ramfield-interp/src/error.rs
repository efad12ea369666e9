//! Interpolator construction and query errors.

use thiserror::Error;

/// Errors from building or querying an interpolator.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InterpError {
    /// An axis has no samples.
    #[error("axis {axis} is empty")]
    EmptyAxis {
        /// Axis index (0 or 1).
        axis: usize,
    },
    /// An axis is not non-decreasing, or holds a non-finite sample.
    #[error("axis {axis} is not monotone at index {index}")]
    NonMonotonicAxis {
        /// Axis index (0 or 1).
        axis: usize,
        /// First offending sample.
        index: usize,
    },
    /// Table or query shapes disagree.
    #[error("{what}: expected shape {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// What was being checked.
        what: &'static str,
        /// Required shape.
        expected: Vec<usize>,
        /// Shape supplied.
        found: Vec<usize>,
    },
    /// A query fell outside the sampled range under [`BoundsPolicy::Reject`].
    ///
    /// [`BoundsPolicy::Reject`]: crate::BoundsPolicy::Reject
    #[error("query {value} on axis {axis} outside [{min}, {max}]")]
    OutOfBounds {
        /// Axis index (0 or 1).
        axis: usize,
        /// Offending coordinate.
        value: f64,
        /// Lowest sample.
        min: f64,
        /// Highest sample.
        max: f64,
    },
}
