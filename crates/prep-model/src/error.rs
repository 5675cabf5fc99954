use thiserror::Error;

use crate::format::{Codec, TableFormat};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("compression {method} cannot be applied to {format} files")]
    UnsupportedCompression { format: TableFormat, method: Codec },
    #[error("compression is enabled for {location} but no method is configured")]
    MissingCodec { location: String },
    #[error("invalid reference date '{value}' for format '{format}': {source}")]
    InvalidReferenceDate {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("unknown stage: {0}")]
    UnknownStage(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
