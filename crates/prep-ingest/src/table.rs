//! Tabular file reading.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use polars::prelude::*;
use tracing::debug;

use prep_model::{Codec, ModelError, TableFormat};

use crate::error::{IngestError, Result, io_error};

/// Read a table from `path` in the given format.
///
/// `codec` is the compression the file was written with. Parquet and IPC
/// carry their codec in the file itself; CSV needs it to decompress.
pub fn read_table(path: &Path, format: TableFormat, codec: Option<Codec>) -> Result<DataFrame> {
    if let Some(codec) = codec
        && !format.supports(codec)
    {
        return Err(ModelError::UnsupportedCompression {
            format,
            method: codec,
        }
        .into());
    }

    let df = match format {
        TableFormat::Csv => read_csv(path, codec)?,
        TableFormat::Parquet => {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| table_read(path, &e))?
        }
        TableFormat::Ipc => {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            IpcReader::new(file)
                .finish()
                .map_err(|e| table_read(path, &e))?
        }
    };

    debug!(
        path = %path.display(),
        format = %format,
        rows = df.height(),
        columns = df.width(),
        "Read table"
    );
    Ok(df)
}

fn read_csv(path: &Path, codec: Option<Codec>) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None);

    match codec {
        Some(Codec::Gzip) => {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            let mut bytes = Vec::new();
            GzDecoder::new(file)
                .read_to_end(&mut bytes)
                .map_err(|e| io_error(path, e))?;
            options
                .into_reader_with_file_handle(Cursor::new(bytes))
                .finish()
                .map_err(|e| table_read(path, &e))
        }
        _ => {
            if !path.exists() {
                return Err(IngestError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            options
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .map_err(|e| table_read(path, &e))?
                .finish()
                .map_err(|e| table_read(path, &e))
        }
    }
}

fn table_read(path: &Path, err: &PolarsError) -> IngestError {
    IngestError::TableRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    #[test]
    fn test_read_plain_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demographic.csv");
        std::fs::write(&path, "PERSONID,GENDER\nP1,Male\nP2,\n").unwrap();

        let df = read_table(&path, TableFormat::Csv, None).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        assert_eq!(df.column("GENDER").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_gzip_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labs.csv.gzip");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"PERSONID,RESULTVALUE\nP1,4.5\n").unwrap();
        encoder.finish().unwrap();

        let df = read_table(&path, TableFormat::Csv, Some(Codec::Gzip)).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.get_column_names_owned(),
            vec![PlSmallStr::from("PERSONID"), PlSmallStr::from("RESULTVALUE")]
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        for format in [TableFormat::Csv, TableFormat::Parquet, TableFormat::Ipc] {
            let result = read_table(&dir.path().join("absent"), format, None);
            assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
        }
    }

    #[test]
    fn test_incompatible_codec() {
        let result = read_table(Path::new("x.csv"), TableFormat::Csv, Some(Codec::Snappy));
        assert!(matches!(
            result,
            Err(IngestError::Model(ModelError::UnsupportedCompression { .. }))
        ));
    }

    #[test]
    fn test_garbage_parquet_is_table_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.parquet");
        std::fs::write(&path, b"not parquet").unwrap();
        let result = read_table(&path, TableFormat::Parquet, None);
        assert!(matches!(result, Err(IngestError::TableRead { .. })));
    }
}
