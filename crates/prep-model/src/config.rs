//! Per-dataset configuration records.
//!
//! A [`DatasetConfig`] is what the configuration provider returns for one
//! dataset name. Stages receive it by reference from the orchestrator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::format::{Codec, TableFormat};

/// Configuration for one dataset (one pipeline stage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name; also the stem of the source and destination files.
    pub name: String,
    pub source: Location,
    pub destination: Location,
    #[serde(default)]
    pub parameters: Parameters,
}

impl DatasetConfig {
    /// Full path of the source table.
    pub fn source_file(&self) -> Result<PathBuf> {
        self.source.file_path(&self.name)
    }

    /// Full path of the destination table.
    pub fn destination_file(&self) -> Result<PathBuf> {
        self.destination.file_path(&self.name)
    }

    /// Path of a sidecar file (cohort registry, code catalog) next to the output.
    pub fn destination_sidecar(&self, file_name: &str) -> PathBuf {
        self.destination.path.join(file_name)
    }
}

/// Where a table lives and how it is encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub format: TableFormat,
    #[serde(default)]
    pub compression: Compression,
}

impl Location {
    /// The effective codec, if compression is enabled.
    pub fn codec(&self) -> Result<Option<Codec>> {
        if !self.compression.enabled {
            return Ok(None);
        }
        let Some(method) = self.compression.method else {
            return Err(ModelError::MissingCodec {
                location: self.path.display().to_string(),
            });
        };
        if !self.format.supports(method) {
            return Err(ModelError::UnsupportedCompression {
                format: self.format,
                method,
            });
        }
        Ok(Some(method))
    }

    /// Build `<path>/<name>.<ext>` or `<path>/<name>.<ext>.<codec>`.
    pub fn file_path(&self, name: &str) -> Result<PathBuf> {
        Ok(construct_path(
            &self.path,
            name,
            self.format,
            self.codec()?,
        ))
    }
}

/// Build a table path from its parts.
pub fn construct_path(
    base: &Path,
    name: &str,
    format: TableFormat,
    codec: Option<Codec>,
) -> PathBuf {
    let file_name = match codec {
        Some(codec) => format!("{name}.{}.{}", format.extension(), codec.suffix()),
        None => format!("{name}.{}", format.extension()),
    };
    base.join(file_name)
}

/// Compression settings of a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compression {
    pub enabled: bool,
    #[serde(default)]
    pub method: Option<Codec>,
}

/// Stage-specific parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// Column name to dtype name, applied as a strict cast.
    #[serde(default)]
    pub dtype_conversion: BTreeMap<String, String>,
    /// strftime-style format of the stage's temporal column.
    #[serde(default)]
    pub date_format: Option<String>,
    /// Reference date used to compute ages.
    #[serde(default)]
    pub age_date: Option<AgeDate>,
}

/// Reference date for age computation, with the format it is written in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeDate {
    pub date: String,
    pub format: String,
}

impl AgeDate {
    /// Parse the reference date. Formats carrying a time of day are accepted;
    /// only the calendar date is kept.
    pub fn parse(&self) -> Result<NaiveDate> {
        let value = self.date.trim();
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, &self.format) {
            return Ok(datetime.date());
        }
        NaiveDate::parse_from_str(value, &self.format).map_err(|source| {
            ModelError::InvalidReferenceDate {
                value: self.date.clone(),
                format: self.format.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(format: TableFormat, enabled: bool, method: Option<Codec>) -> Location {
        Location {
            path: PathBuf::from("data/processed"),
            format,
            compression: Compression { enabled, method },
        }
    }

    #[test]
    fn path_without_compression() {
        let loc = location(TableFormat::Csv, false, Some(Codec::Gzip));
        assert_eq!(
            loc.file_path("labs").unwrap(),
            PathBuf::from("data/processed/labs.csv")
        );
    }

    #[test]
    fn path_with_compression_suffix() {
        let loc = location(TableFormat::Csv, true, Some(Codec::Gzip));
        assert_eq!(
            loc.file_path("labs").unwrap(),
            PathBuf::from("data/processed/labs.csv.gzip")
        );
    }

    #[test]
    fn incompatible_codec_is_an_error() {
        let loc = location(TableFormat::Ipc, true, Some(Codec::Snappy));
        assert!(matches!(
            loc.file_path("labs"),
            Err(ModelError::UnsupportedCompression { .. })
        ));
    }

    #[test]
    fn enabled_without_method_is_an_error() {
        let loc = location(TableFormat::Parquet, true, None);
        assert!(matches!(loc.codec(), Err(ModelError::MissingCodec { .. })));
    }

    #[test]
    fn age_date_accepts_date_and_datetime_formats() {
        let date = AgeDate {
            date: "31/Dec/2023".to_string(),
            format: "%d/%b/%Y".to_string(),
        };
        assert_eq!(
            date.parse().unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        let datetime = AgeDate {
            date: "2023-12-31 10:00:00".to_string(),
            format: "%Y-%m-%d %H:%M:%S".to_string(),
        };
        assert_eq!(
            datetime.parse().unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn dataset_config_deserializes() {
        let json = r#"{
            "name": "demographic",
            "source": {"path": "data/raw/", "format": "csv",
                       "compression": {"enabled": false, "method": "gzip"}},
            "destination": {"path": "data/processed/", "format": "parquet",
                            "compression": {"enabled": true, "method": "snappy"}},
            "parameters": {
                "dtype_conversion": {"AGE": "Int64"},
                "age_date": {"date": "01/Jan/2024", "format": "%d/%b/%Y"}
            }
        }"#;
        let config: DatasetConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "demographic");
        assert_eq!(
            config.destination_file().unwrap(),
            PathBuf::from("data/processed/demographic.parquet.snappy")
        );
        assert_eq!(
            config.destination_sidecar("unique_ids.json"),
            PathBuf::from("data/processed/unique_ids.json")
        );
        assert_eq!(config.parameters.dtype_conversion["AGE"], "Int64");
        assert!(config.parameters.date_format.is_none());
    }
}
