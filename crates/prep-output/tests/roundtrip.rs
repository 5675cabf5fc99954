//! Write a table, read it back with the same configuration, compare.

use polars::prelude::*;
use tempfile::TempDir;

use prep_ingest::read_table;
use prep_model::{Codec, TableFormat, construct_path};
use prep_output::{WriteOptions, write_table};

fn labs_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("PERSONID".into(), vec!["P1", "P2", "P3"]).into(),
        Series::new("HBA1C".into(), vec![Some(5.5f64), None, Some(7.25)]).into(),
        Series::new("CK".into(), vec![Some("120"), Some("high"), None]).into(),
        Series::new("POMPE".into(), vec![Some(1i64), Some(0), None]).into(),
    ])
    .unwrap()
}

#[test]
fn tables_survive_write_then_read() {
    let dir = TempDir::new().unwrap();
    let df = labs_frame();
    let configurations = [
        (TableFormat::Csv, None),
        (TableFormat::Csv, Some(Codec::Gzip)),
        (TableFormat::Parquet, None),
        (TableFormat::Parquet, Some(Codec::Snappy)),
        (TableFormat::Parquet, Some(Codec::Zstd)),
        (TableFormat::Ipc, None),
        (TableFormat::Ipc, Some(Codec::Lz4)),
    ];

    for (format, codec) in configurations {
        let path = construct_path(dir.path(), "labs", format, codec);
        write_table(&df, &path, format, codec, WriteOptions::without_index()).unwrap();
        let back = read_table(&path, format, codec).unwrap();
        assert_eq!(
            back.get_column_names(),
            df.get_column_names(),
            "{format} {codec:?}"
        );
        assert!(back.equals_missing(&df), "{format} {codec:?}\n{back}");
    }
}

#[test]
fn index_column_is_added_only_on_request() {
    let dir = TempDir::new().unwrap();
    let df = labs_frame();
    let path = dir.path().join("labs.parquet");

    write_table(
        &df,
        &path,
        TableFormat::Parquet,
        None,
        WriteOptions {
            include_index: Some(true),
        },
    )
    .unwrap();
    let back = read_table(&path, TableFormat::Parquet, None).unwrap();
    assert_eq!(back.width(), df.width() + 1);
    assert_eq!(back.get_column_names()[0].as_str(), "index");

    let path = dir.path().join("labs.ipc");
    write_table(
        &df,
        &path,
        TableFormat::Ipc,
        None,
        WriteOptions {
            include_index: Some(true),
        },
    )
    .unwrap();
    let back = read_table(&path, TableFormat::Ipc, None).unwrap();
    assert_eq!(back.width(), df.width());
}
