//! Table formats and compression codecs understood by the tabular I/O layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Serialization format of a source or destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableFormat {
    /// Delimited text with a header row.
    #[serde(rename = "csv")]
    Csv,
    /// Apache Parquet columnar files.
    #[serde(rename = "parquet")]
    Parquet,
    /// Arrow IPC, the dataframe library's native binary serialization.
    ///
    /// Configurations written for the pickle-based tooling name this format
    /// `pkl`; the alias is accepted.
    #[serde(rename = "ipc", alias = "arrow", alias = "feather", alias = "pkl")]
    Ipc,
}

impl TableFormat {
    /// File extension used when building paths.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Ipc => "ipc",
        }
    }

    /// Whether the format can apply the given codec.
    pub fn supports(self, codec: Codec) -> bool {
        match self {
            Self::Csv => matches!(codec, Codec::Gzip),
            Self::Parquet => true,
            Self::Ipc => matches!(codec, Codec::Zstd | Codec::Lz4),
        }
    }

    /// Whether an explicit index-inclusion write option is meaningful.
    ///
    /// The native binary format has no notion of a written index.
    pub fn accepts_index_option(self) -> bool {
        !matches!(self, Self::Ipc)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "ipc" | "arrow" | "feather" | "pkl" => Ok(Self::Ipc),
            other => Err(ModelError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Named compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Gzip,
    Snappy,
    Zstd,
    Lz4,
    Brotli,
}

impl Codec {
    /// Suffix appended to file names written with this codec.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
            Self::Brotli => "brotli",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickle_name_maps_to_native_format() {
        let format: TableFormat = serde_json::from_str("\"pkl\"").unwrap();
        assert_eq!(format, TableFormat::Ipc);
        assert_eq!("PKL".parse::<TableFormat>().unwrap(), TableFormat::Ipc);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(serde_json::from_str::<TableFormat>("\"xlsx\"").is_err());
        assert!(matches!(
            "xlsx".parse::<TableFormat>(),
            Err(ModelError::UnsupportedFormat(name)) if name == "xlsx"
        ));
    }

    #[test]
    fn codec_support_matrix() {
        assert!(TableFormat::Csv.supports(Codec::Gzip));
        assert!(!TableFormat::Csv.supports(Codec::Snappy));
        assert!(TableFormat::Parquet.supports(Codec::Brotli));
        assert!(TableFormat::Ipc.supports(Codec::Zstd));
        assert!(!TableFormat::Ipc.supports(Codec::Gzip));
    }

    #[test]
    fn index_option_only_for_text_and_columnar() {
        assert!(TableFormat::Csv.accepts_index_option());
        assert!(TableFormat::Parquet.accepts_index_option());
        assert!(!TableFormat::Ipc.accepts_index_option());
    }
}
