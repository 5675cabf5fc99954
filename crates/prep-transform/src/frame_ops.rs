//! Row- and column-level cleaning operations shared by the stages.
//!
//! Column operations mutate the frame in place and keep the column at its
//! original position. Row operations return a new frame.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use prep_common::{column_strings, is_null_token};
use prep_model::CohortRegistry;
use prep_model::columns::PERSON_ID;

use crate::dates::{parse_datetime, to_epoch_millis};
use crate::error::{Result, TransformError};
use crate::keys::row_keys;

/// Which occurrence of a duplicated key to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    First,
    Last,
}

/// Fail with [`TransformError::MissingColumn`] unless every column is present.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(TransformError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Keep only rows whose patient identifier is in the cohort registry.
pub fn filter_to_cohort(df: &DataFrame, cohort: &CohortRegistry) -> Result<DataFrame> {
    require_columns(df, &[PERSON_ID])?;
    let keep: Vec<bool> = column_strings(df, PERSON_ID)?
        .iter()
        .map(|id| id.as_deref().is_some_and(|id| cohort.contains(id)))
        .collect();
    let filtered = filter_rows(df, &keep)?;
    debug!(
        rows_in = df.height(),
        rows_out = filtered.height(),
        "Filtered to cohort"
    );
    Ok(filtered)
}

/// Apply a row mask.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Trim surrounding whitespace from a text column. Non-text columns are left as is.
pub fn trim_strings(df: &mut DataFrame, column: &str) -> Result<()> {
    map_strings(df, column, |value| Some(value.trim().to_string()))
}

/// Rewrite every non-null value of a text column; returning `None` nulls the cell.
pub fn map_strings<F>(df: &mut DataFrame, column: &str, mut f: F) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    require_columns(df, &[column])?;
    let col = df.column(column)?;
    if col.dtype() != &DataType::String {
        return Ok(());
    }
    let values: Vec<Option<String>> = col.str()?.into_iter().map(|v| v.and_then(&mut f)).collect();
    df.with_column(Series::new(column.into(), values))?;
    Ok(())
}

/// Null out the textual null markers (`nan`, `None`) of a text column.
pub fn null_tokens_to_null(df: &mut DataFrame, column: &str) -> Result<()> {
    map_strings(df, column, |value| {
        if is_null_token(value) {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Parse a column into millisecond datetimes under `format`.
///
/// Values are trimmed first; empty values become null. A non-empty value that
/// does not match the format is an error. Columns that are already temporal
/// are only cast.
pub fn parse_dates(df: &mut DataFrame, column: &str, format: &str) -> Result<()> {
    require_columns(df, &[column])?;
    let target = DataType::Datetime(TimeUnit::Milliseconds, None);
    let col = df.column(column)?;
    if matches!(col.dtype(), DataType::Date | DataType::Datetime(_, _)) {
        let cast = col.cast(&target)?;
        df.with_column(cast)?;
        return Ok(());
    }

    let mut millis: Vec<Option<i64>> = Vec::with_capacity(df.height());
    for value in column_strings(df, column)? {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            millis.push(None);
            continue;
        };
        let parsed = parse_datetime(&value, format).ok_or_else(|| TransformError::DateParse {
            column: column.to_string(),
            value: value.clone(),
            format: format.to_string(),
        })?;
        millis.push(Some(to_epoch_millis(parsed)));
    }
    let parsed = Series::new(column.into(), millis).cast(&target)?;
    df.with_column(parsed)?;
    Ok(())
}

/// Stable sort on one column, largest first, nulls last.
pub fn sort_descending_by(df: &DataFrame, column: &str) -> Result<DataFrame> {
    require_columns(df, &[column])?;
    let sorted = df.sort(
        [column],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?;
    Ok(sorted)
}

/// Drop rows repeating an earlier (or later) row on `keys`.
///
/// Nulls compare equal to each other. Surviving rows keep their relative order.
pub fn drop_duplicates(df: &DataFrame, keys: &[&str], keep: Keep) -> Result<DataFrame> {
    require_columns(df, keys)?;
    let rows = row_keys(df, keys)?;
    let mut seen = HashSet::with_capacity(rows.len());
    let mut mask = vec![false; rows.len()];
    let order: Box<dyn Iterator<Item = usize>> = match keep {
        Keep::First => Box::new(0..rows.len()),
        Keep::Last => Box::new((0..rows.len()).rev()),
    };
    for idx in order {
        mask[idx] = seen.insert(&rows[idx]);
    }
    filter_rows(df, &mask)
}

/// Drop the named columns that exist; absent names are ignored.
pub fn drop_columns_if_present(df: &DataFrame, columns: &[&str]) -> DataFrame {
    let present: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|name| df.column(name).is_ok())
        .collect();
    if present.is_empty() {
        return df.clone();
    }
    df.drop_many(present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::from_epoch_millis;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        column_strings(df, name).unwrap()
    }

    #[test]
    fn test_filter_to_cohort_matches_stringified_ids() {
        let df = frame(vec![
            Series::new(PERSON_ID.into(), vec![Some(1i64), Some(2), None, Some(3)]).into(),
            Series::new("X".into(), vec!["a", "b", "c", "d"]).into(),
        ]);
        let cohort = CohortRegistry::from_ids(["3", "1"]);
        let out = filter_to_cohort(&df, &cohort).unwrap();
        assert_eq!(strings(&out, "X"), vec![Some("a".into()), Some("d".into())]);
    }

    #[test]
    fn test_missing_column() {
        let df = frame(vec![Series::new("X".into(), vec![1i64]).into()]);
        let err = filter_to_cohort(&df, &CohortRegistry::default()).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { column } if column == PERSON_ID));
    }

    #[test]
    fn test_trim_and_null_tokens() {
        let mut df = frame(vec![
            Series::new("R".into(), vec![Some(" 4.5 "), Some("nan"), None, Some("None")]).into(),
        ]);
        trim_strings(&mut df, "R").unwrap();
        null_tokens_to_null(&mut df, "R").unwrap();
        assert_eq!(strings(&df, "R"), vec![Some("4.5".into()), None, None, None]);
    }

    #[test]
    fn test_parse_dates() {
        let mut df = frame(vec![
            Series::new("D".into(), vec![Some(" 02/Jan/1970"), None, Some(" ")]).into(),
        ]);
        parse_dates(&mut df, "D", "%d/%b/%Y").unwrap();
        let col = df.column("D").unwrap();
        assert_eq!(col.dtype(), &DataType::Datetime(TimeUnit::Milliseconds, None));
        assert_eq!(col.null_count(), 2);
        let AnyValue::Datetime(ms, _, _) = col.get(0).unwrap() else {
            panic!("expected datetime");
        };
        assert_eq!(from_epoch_millis(ms).unwrap().to_string(), "1970-01-02 00:00:00");
    }

    #[test]
    fn test_parse_dates_rejects_mismatch() {
        let mut df = frame(vec![Series::new("D".into(), vec!["1970-01-02"]).into()]);
        let err = parse_dates(&mut df, "D", "%d/%b/%Y").unwrap_err();
        assert!(matches!(err, TransformError::DateParse { value, .. } if value == "1970-01-02"));
    }

    #[test]
    fn test_sort_descending_is_stable_with_nulls_last() {
        let df = frame(vec![
            Series::new("T".into(), vec![Some(1i64), None, Some(3), Some(1)]).into(),
            Series::new("X".into(), vec!["a", "b", "c", "d"]).into(),
        ]);
        let out = sort_descending_by(&df, "T").unwrap();
        assert_eq!(
            strings(&out, "X"),
            vec![Some("c".into()), Some("a".into()), Some("d".into()), Some("b".into())]
        );
    }

    #[test]
    fn test_drop_duplicates_first_and_last() {
        let df = frame(vec![
            Series::new("K".into(), vec![Some("A"), Some("B"), Some("A"), None, None]).into(),
            Series::new("X".into(), vec![1i64, 2, 3, 4, 5]).into(),
        ]);
        let first = drop_duplicates(&df, &["K"], Keep::First).unwrap();
        assert_eq!(
            strings(&first, "X"),
            vec![Some("1".into()), Some("2".into()), Some("4".into())]
        );
        let last = drop_duplicates(&df, &["K"], Keep::Last).unwrap();
        assert_eq!(
            strings(&last, "X"),
            vec![Some("2".into()), Some("3".into()), Some("5".into())]
        );
    }

    #[test]
    fn test_drop_columns_if_present() {
        let df = frame(vec![
            Series::new("ORDERID".into(), vec![1i64]).into(),
            Series::new("X".into(), vec![1i64]).into(),
        ]);
        let out = drop_columns_if_present(&df, &["ORDERID", "TASKASSAY"]);
        assert_eq!(out.get_column_names_owned(), vec![PlSmallStr::from("X")]);
    }
}
