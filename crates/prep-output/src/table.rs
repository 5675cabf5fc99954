//! Tabular file writing.

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use polars::prelude::*;
use tracing::debug;

use prep_model::{Codec, ModelError, TableFormat};

use crate::common::create_file;
use crate::error::{OutputError, Result};

/// Name of the positional index column prepended when an index is requested.
pub const INDEX_COLUMN: &str = "index";

/// Keyword options accepted by [`write_table`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Whether to write a zero-based positional index column.
    ///
    /// `None` leaves the format default (no index). The native binary format
    /// does not take this option; an explicit value is dropped for it.
    pub include_index: Option<bool>,
}

impl WriteOptions {
    /// Options used by every pipeline stage: no index column.
    pub fn without_index() -> Self {
        Self {
            include_index: Some(false),
        }
    }

    /// Remove options the target format cannot accept.
    pub fn compatible_with(self, format: TableFormat) -> Self {
        if format.accepts_index_option() || self.include_index.is_none() {
            return self;
        }
        debug!(format = %format, "Dropping index option unsupported by format");
        Self {
            include_index: None,
        }
    }
}

/// Write `df` to `path`, creating parent directories as needed.
pub fn write_table(
    df: &DataFrame,
    path: &Path,
    format: TableFormat,
    codec: Option<Codec>,
    options: WriteOptions,
) -> Result<()> {
    if let Some(codec) = codec
        && !format.supports(codec)
    {
        return Err(ModelError::UnsupportedCompression {
            format,
            method: codec,
        }
        .into());
    }

    let options = options.compatible_with(format);
    let mut frame = if options.include_index == Some(true) {
        df.with_row_index(INDEX_COLUMN.into(), None)
            .map_err(|e| table_write(path, &e))?
    } else {
        df.clone()
    };

    let file = create_file(path)?;
    match format {
        TableFormat::Csv => match codec {
            Some(Codec::Gzip) => {
                let mut encoder = GzEncoder::new(file, Compression::default());
                CsvWriter::new(&mut encoder)
                    .include_header(true)
                    .finish(&mut frame)
                    .map_err(|e| table_write(path, &e))?;
                encoder
                    .finish()
                    .and_then(|mut inner| inner.flush())
                    .map_err(|source| OutputError::Write {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
            _ => {
                let mut file = file;
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(&mut frame)
                    .map_err(|e| table_write(path, &e))?;
            }
        },
        TableFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(parquet_compression(codec))
                .finish(&mut frame)
                .map_err(|e| table_write(path, &e))?;
        }
        TableFormat::Ipc => {
            IpcWriter::new(file)
                .with_compression(ipc_compression(codec))
                .finish(&mut frame)
                .map_err(|e| table_write(path, &e))?;
        }
    }

    debug!(
        path = %path.display(),
        format = %format,
        codec = ?codec,
        rows = frame.height(),
        columns = frame.width(),
        "Wrote table"
    );
    Ok(())
}

fn parquet_compression(codec: Option<Codec>) -> ParquetCompression {
    match codec {
        None => ParquetCompression::Uncompressed,
        Some(Codec::Snappy) => ParquetCompression::Snappy,
        Some(Codec::Gzip) => ParquetCompression::Gzip(None),
        Some(Codec::Zstd) => ParquetCompression::Zstd(None),
        Some(Codec::Lz4) => ParquetCompression::Lz4Raw,
        Some(Codec::Brotli) => ParquetCompression::Brotli(None),
    }
}

fn ipc_compression(codec: Option<Codec>) -> Option<IpcCompression> {
    match codec {
        Some(Codec::Lz4) => Some(IpcCompression::LZ4),
        Some(_) => Some(IpcCompression::default()),
        None => None,
    }
}

fn table_write(path: &Path, err: &PolarsError) -> OutputError {
    OutputError::TableWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Series::new("PERSONID".into(), vec!["P1", "P2"]).into(),
            Series::new("A01".into(), vec![1i64, 0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_index_option_dropped_for_native_format() {
        let options = WriteOptions::without_index().compatible_with(TableFormat::Ipc);
        assert_eq!(options.include_index, None);
        let options = WriteOptions::without_index().compatible_with(TableFormat::Csv);
        assert_eq!(options.include_index, Some(false));
    }

    #[test]
    fn test_csv_with_index_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/diagnosis.csv");
        write_table(
            &sample(),
            &path,
            TableFormat::Csv,
            None,
            WriteOptions {
                include_index: Some(true),
            },
        )
        .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("index,PERSONID,A01"));
        assert_eq!(content.lines().nth(2), Some("1,P2,0"));
    }

    #[test]
    fn test_csv_without_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diagnosis.csv");
        write_table(
            &sample(),
            &path,
            TableFormat::Csv,
            None,
            WriteOptions::without_index(),
        )
        .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "PERSONID,A01\nP1,1\nP2,0\n");
    }

    #[test]
    fn test_unsupported_codec_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = write_table(
            &sample(),
            &dir.path().join("x.ipc"),
            TableFormat::Ipc,
            Some(Codec::Brotli),
            WriteOptions::default(),
        );
        assert!(matches!(
            result,
            Err(OutputError::Model(ModelError::UnsupportedCompression { .. }))
        ));
    }
}
