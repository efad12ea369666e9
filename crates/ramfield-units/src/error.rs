//! Unit algebra errors.

use thiserror::Error;

/// Errors from parsing, combining, or converting units.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum UnitError {
    /// An identifier is not defined in the symbol table.
    #[error("unknown unit '{name}'")]
    UnknownUnit {
        /// The unrecognised identifier.
        name: String,
    },
    /// The two units do not share a dimension vector.
    #[error("cannot convert '{from}' ({from_dims}) to '{to}' ({to_dims})")]
    IncompatibleUnits {
        /// Source unit string.
        from: String,
        /// Source dimensions.
        from_dims: String,
        /// Target unit string.
        to: String,
        /// Target dimensions.
        to_dims: String,
    },
    /// The unit string is not a well-formed expression.
    #[error("malformed unit expression '{input}': {reason}")]
    Parse {
        /// The full input string.
        input: String,
        /// What went wrong.
        reason: String,
    },
    /// Combining units pushed an exponent outside the representable range.
    #[error("exponent overflow in '{expr}'")]
    ExponentOverflow {
        /// The operation that overflowed.
        expr: String,
    },
    /// One symbol name carries two different definitions, as when
    /// combining units from two datasets' symbol tables.
    #[error("unit '{name}' has conflicting definitions")]
    ConflictingSymbol {
        /// The shared symbol name.
        name: String,
    },
    /// A symbol was defined with a non-finite or non-positive scale.
    #[error("invalid scale {scale} for unit '{name}'")]
    InvalidScale {
        /// The symbol being defined.
        name: String,
        /// The rejected scale.
        scale: f64,
    },
}
