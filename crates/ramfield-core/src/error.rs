//! Error types for field resolution and evaluation.

use ramfield_units::UnitError;
use thiserror::Error;

use crate::key::{ChunkId, FieldKey};

/// Errors surfaced to a caller that requested a field.
///
/// Missing optional capabilities never produce these: the frontend disables
/// the affected field family instead. A `FieldError` means the caller asked
/// for something that cannot be produced.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldError {
    /// No raw, derived, or alias definition exists for the key.
    #[error("unknown field {key}")]
    UnknownField {
        /// The key that was requested.
        key: FieldKey,
    },
    /// A field requested itself, directly or transitively.
    #[error("circular dependency: {}", format_cycle(.cycle))]
    CircularDependency {
        /// The resolution path, starting and ending with the repeated key.
        cycle: Vec<FieldKey>,
    },
    /// The raw-data loader has no data for an on-disk field.
    #[error("no data for {key} in chunk {chunk}")]
    DataNotFound {
        /// The on-disk field.
        key: FieldKey,
        /// The chunk being evaluated.
        chunk: ChunkId,
    },
    /// Unit parsing, combination, or conversion failed.
    #[error(transparent)]
    Unit(#[from] UnitError),
    /// Two operands of an array operation have different shapes.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// Shape of the left operand.
        left: Vec<usize>,
        /// Shape of the right operand.
        right: Vec<usize>,
    },
    /// A field function failed for a field-specific reason.
    #[error("evaluating {key}: {reason}")]
    Evaluation {
        /// The field being evaluated.
        key: FieldKey,
        /// Human-readable description of the failure.
        reason: String,
    },
}

fn format_cycle(cycle: &[FieldKey]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
