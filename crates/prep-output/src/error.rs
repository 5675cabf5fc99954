//! Error types for output generation.

use std::path::PathBuf;
use thiserror::Error;

use prep_model::ModelError;

/// Errors that can occur while writing pipeline outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create an output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write a file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars failed to serialize a table.
    #[error("failed to write table {path}: {message}")]
    TableWrite { path: PathBuf, message: String },

    /// Failed to serialize a JSON sidecar.
    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The format cannot apply the requested codec.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
