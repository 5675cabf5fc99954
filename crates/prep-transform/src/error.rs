//! Error types for frame transforms.

use thiserror::Error;

use prep_model::ModelError;

/// Errors raised while cleaning or reshaping a stage frame.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the transform reads is absent.
    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    /// A stage parameter is absent from the configuration.
    #[error("missing parameter '{name}'")]
    MissingParameter { name: &'static str },

    /// A non-empty date value does not match the configured format.
    #[error("cannot parse '{value}' in column {column} with format '{format}'")]
    DateParse {
        column: String,
        value: String,
        format: String,
    },

    /// A dtype name in the configuration is not recognised.
    #[error("unsupported dtype '{dtype}' for column {column}")]
    UnsupportedDtype { column: String, dtype: String },

    /// A column could not be converted to its configured dtype.
    #[error("cannot convert column {column} to {dtype}: {message}")]
    DtypeCoercion {
        column: String,
        dtype: String,
        message: String,
    },

    /// Two rows share the same (index, category) cell in a value matrix.
    #[error("duplicate entry for index '{index}' and column '{category}'")]
    DuplicatePivotEntry { index: String, category: String },

    /// Invalid reference date or other model-level problem.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
