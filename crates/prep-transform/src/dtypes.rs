//! Configured column type coercions.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::frame_ops::require_columns;

/// Resolve a configured dtype name.
pub fn parse_dtype(column: &str, name: &str) -> Result<DataType> {
    let dtype = match name.trim() {
        "int8" | "Int8" => DataType::Int8,
        "int16" | "Int16" => DataType::Int16,
        "int32" | "Int32" => DataType::Int32,
        "int" | "int64" | "Int64" => DataType::Int64,
        "uint8" | "UInt8" => DataType::UInt8,
        "uint16" | "UInt16" => DataType::UInt16,
        "uint32" | "UInt32" => DataType::UInt32,
        "uint64" | "UInt64" => DataType::UInt64,
        "float32" | "Float32" => DataType::Float32,
        "float" | "float64" | "Float64" => DataType::Float64,
        "str" | "string" | "object" | "category" => DataType::String,
        "bool" | "boolean" => DataType::Boolean,
        other => {
            return Err(TransformError::UnsupportedDtype {
                column: column.to_string(),
                dtype: other.to_string(),
            });
        }
    };
    Ok(dtype)
}

/// Cast every configured column to its dtype.
///
/// Casts are strict: a declared column that is absent, or a value that does
/// not convert, fails the whole coercion.
pub fn apply_dtypes(df: &mut DataFrame, conversions: &BTreeMap<String, String>) -> Result<()> {
    for (column, name) in conversions {
        let dtype = parse_dtype(column, name)?;
        require_columns(df, &[column.as_str()])?;
        let series = df.column(column)?.as_materialized_series();
        if series.dtype() == &dtype {
            continue;
        }
        let cast = series
            .strict_cast(&dtype)
            .map_err(|err| TransformError::DtypeCoercion {
                column: column.clone(),
                dtype: name.clone(),
                message: err.to_string(),
            })?;
        df.with_column(cast)?;
        debug!(column = %column, dtype = %dtype, "Coerced column");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversions(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_casts_integers_and_strings() {
        let mut df = DataFrame::new(vec![
            Series::new("ENCNTRID".into(), vec![Some(1.0f64), None]).into(),
            Series::new("ICDCODE".into(), vec![10i64, 20]).into(),
        ])
        .unwrap();
        apply_dtypes(
            &mut df,
            &conversions(&[("ENCNTRID", "Int64"), ("ICDCODE", "str")]),
        )
        .unwrap();
        assert_eq!(df.column("ENCNTRID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("ENCNTRID").unwrap().null_count(), 1);
        assert_eq!(df.column("ICDCODE").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_incompatible_value_fails_loudly() {
        let mut df = DataFrame::new(vec![
            Series::new("RESULTVALUE".into(), vec!["4.5", "high"]).into(),
        ])
        .unwrap();
        let err = apply_dtypes(&mut df, &conversions(&[("RESULTVALUE", "float64")])).unwrap_err();
        assert!(matches!(err, TransformError::DtypeCoercion { column, .. } if column == "RESULTVALUE"));
    }

    #[test]
    fn test_undeclared_column_and_unknown_dtype() {
        let mut df = DataFrame::new(vec![Series::new("A".into(), vec![1i64]).into()]).unwrap();
        let err = apply_dtypes(&mut df, &conversions(&[("B", "int64")])).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"column 'B' not found");
        let err = apply_dtypes(&mut df, &conversions(&[("A", "decimal")])).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"unsupported dtype 'decimal' for column A");
    }
}
