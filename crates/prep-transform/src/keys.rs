//! Row keys used for grouping, de-duplication and ordering.
//!
//! Equality is decided on the stringified cell (the same rendering used for
//! identifiers everywhere else). Ordering is typed: numbers sort before text,
//! numbers compare numerically and text compares lexicographically.

use std::cmp::Ordering;

use polars::prelude::{AnyValue, Column, DataFrame, IdxSize};

use prep_common::{any_to_f64, any_to_string, column_strings};

use crate::error::Result;

/// Typed ordering key for one cell.
#[derive(Debug, Clone)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Build the ordering key of a cell; `None` for nulls.
    pub fn from_any(value: AnyValue<'_>) -> Option<Self> {
        match value {
            AnyValue::Null => None,
            AnyValue::String(s) => Some(Self::Text(s.to_string())),
            AnyValue::StringOwned(s) => Some(Self::Text(s.to_string())),
            AnyValue::Boolean(b) => Some(Self::Number(if b { 1.0 } else { 0.0 })),
            AnyValue::Date(days) => Some(Self::Number(f64::from(days))),
            AnyValue::Datetime(v, _, _) => Some(Self::Number(v as f64)),
            other => {
                let text = any_to_string(other.clone());
                Some(match any_to_f64(other) {
                    Some(n) => Self::Number(n),
                    None => Self::Text(text),
                })
            }
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

/// Ordering key of the cell at `idx`.
pub fn sort_key_at(column: &Column, idx: usize) -> Result<Option<SortKey>> {
    Ok(SortKey::from_any(column.get(idx)?))
}

/// Stringified composite key of every row over `keys`.
pub fn row_keys(df: &DataFrame, keys: &[&str]) -> Result<Vec<Vec<Option<String>>>> {
    let columns = keys
        .iter()
        .map(|key| column_strings(df, key))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut rows = vec![Vec::with_capacity(keys.len()); df.height()];
    for values in columns {
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
    Ok(rows)
}

/// Convert a row position to a polars index.
pub fn to_idx(idx: usize) -> IdxSize {
    idx as IdxSize
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn numbers_sort_before_text() {
        let mut keys = vec![
            SortKey::Text("B".into()),
            SortKey::Number(10.0),
            SortKey::Text("A".into()),
            SortKey::Number(2.0),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                SortKey::Number(2.0),
                SortKey::Number(10.0),
                SortKey::Text("A".into()),
                SortKey::Text("B".into()),
            ]
        );
    }

    #[test]
    fn integer_cells_compare_numerically() {
        assert!(SortKey::from_any(AnyValue::Int64(9)) < SortKey::from_any(AnyValue::Int64(10)));
        assert!(SortKey::from_any(AnyValue::String("9")) > SortKey::from_any(AnyValue::String("10")));
        assert!(SortKey::from_any(AnyValue::Null).is_none());
    }

    #[test]
    fn row_keys_keep_nulls() {
        let df = DataFrame::new(vec![
            Series::new("P".into(), vec![Some("P1"), None]).into_column(),
            Series::new("E".into(), vec![1i64, 2]).into_column(),
        ])
        .unwrap();
        let keys = row_keys(&df, &["P", "E"]).unwrap();
        assert_eq!(
            keys,
            vec![
                vec![Some("P1".to_string()), Some("1".to_string())],
                vec![None, Some("2".to_string())],
            ]
        );
    }
}
