//! Error types for configuration loading and data ingestion.

use std::path::PathBuf;
use thiserror::Error;

use prep_model::ModelError;

/// Errors that can occur during ingestion operations.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Configuration file is not valid JSON or has the wrong shape.
    #[error("invalid configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No configuration entry for a dataset name.
    #[error("no config found for dataframe: {name}")]
    ConfigNotFound { name: String },

    /// Invalid location, format or codec in a configuration entry.
    #[error(transparent)]
    Model(#[from] ModelError),

    // === Table Errors ===
    /// Failed to parse a table with Polars.
    #[error("failed to read table {path}: {message}")]
    TableRead { path: PathBuf, message: String },

    /// Cohort registry file is malformed.
    #[error("invalid cohort registry {path}: {reason}")]
    CohortParse { path: PathBuf, reason: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Map an `io::Error` on `path` to `FileNotFound` or `FileRead`.
pub(crate) fn io_error(path: &std::path::Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}
