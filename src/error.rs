//! Error types for interval collapsing

use thiserror::Error;

/// Main error type for the crate
///
/// The merge pipeline itself never fails. Errors come from configuration
/// and from the row layer, which has to find and normalize fields before
/// anything reaches the merger.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (unsupported dimension, bad field list, unreadable file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A row is missing a grouping or range field
    #[error("Row {row}: missing field '{field}'")]
    MissingField {
        /// Zero-based index of the offending row
        row: usize,
        /// Name of the missing field
        field: String,
    },

    /// A start/end value could not be normalized for the selected dimension
    #[error("Row {row}: invalid time value {value} in field '{field}': {reason}")]
    InvalidTime {
        /// Zero-based index of the offending row
        row: usize,
        /// Field holding the value
        field: String,
        /// The raw value as rendered JSON
        value: String,
        /// Why normalization failed
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for collapse operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Whether this error was raised before any record was processed
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
