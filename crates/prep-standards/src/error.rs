//! Error types for reference table loading.

use thiserror::Error;

/// Errors that can occur when loading a reference table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StandardsError {
    /// Failed to parse a CSV row.
    #[error("Failed to parse {file}: {message}")]
    CsvParse { file: String, message: String },

    /// The same key appears twice in a table.
    #[error("Duplicate {field} '{value}' in {file}")]
    DuplicateKey {
        field: &'static str,
        value: String,
        file: String,
    },
}

/// Result type for reference table loading.
pub type Result<T> = std::result::Result<T, StandardsError>;
