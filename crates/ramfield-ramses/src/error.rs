//! Frontend error types.

use std::io;
use std::path::PathBuf;

use ramfield_units::UnitError;
use thiserror::Error;

/// Dataset parameters are missing or inconsistent.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A CGS unit scale is NaN, infinite, zero, or negative.
    #[error("invalid {name} = {value}")]
    InvalidUnit {
        /// Parameter name (`unit_l`, `unit_d`, or `unit_t`).
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Cosmological parameters are unusable.
    #[error("invalid cosmology: {reason}")]
    InvalidCosmology {
        /// Which invariant was violated.
        reason: String,
    },
    /// Axis order is empty, too long, or has unknown axes.
    #[error("invalid axis order {axes:?}")]
    InvalidAxisOrder {
        /// The configured axes.
        axes: Vec<String>,
    },
    /// A required key is absent from a parameter file.
    #[error("{}: missing key '{key}'", .file.display())]
    MissingKey {
        /// The file being read.
        file: PathBuf,
        /// The absent key.
        key: String,
    },
    /// A parameter value does not parse.
    #[error("{}: bad value for '{key}': '{value}'", .file.display())]
    BadValue {
        /// The file being read.
        file: PathBuf,
        /// The key.
        key: String,
        /// The unparsable text.
        value: String,
    },
    /// The output number cannot be derived from the file name.
    #[error("cannot determine output number from {}", .path.display())]
    OutputNumber {
        /// The offending path.
        path: PathBuf,
    },
}

/// Errors reading a binary lookup table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The underlying read failed for a reason other than truncation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The file is truncated or its records disagree with the header.
    #[error("corrupt table: {reason}")]
    Corrupt {
        /// What was wrong.
        reason: String,
    },
    /// The file uses the pre-2010 cooling layout.
    #[error("unsupported legacy table format")]
    LegacyFormat,
}

impl TableError {
    /// Whether the file is present but unusable, as opposed to unreadable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Corrupt { .. } | Self::LegacyFormat)
    }
}

/// Errors that abort building a dataset's field set.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Dataset parameters failed validation.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// A table could not be read.
    #[error("table: {0}")]
    Table(#[from] TableError),
    /// A unit expression failed.
    #[error("units: {0}")]
    Unit(#[from] UnitError),
    /// A parameter file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
