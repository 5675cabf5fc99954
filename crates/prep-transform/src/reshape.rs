//! Long-to-wide reshaping and per-patient label attachment.
//!
//! Every reshape drops rows whose index or category key is null and emits
//! rows and columns in key order (see [`SortKey`]).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use polars::prelude::*;
use tracing::debug;

use prep_common::column_strings;

use crate::error::{Result, TransformError};
use crate::frame_ops::{Keep, filter_rows, require_columns};
use crate::keys::{SortKey, row_keys, sort_key_at, to_idx};

/// How label rows are matched onto a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Every matrix row is kept; unmatched patients get a null label.
    Left,
    /// Matrix rows without a label row are dropped.
    Inner,
}

/// Distinct values of a key column with the first row holding each, in key order.
struct Distinct {
    /// Representative row of each distinct value, sorted by value.
    rows: Vec<usize>,
    /// Stringified value → position in `rows`.
    position: HashMap<String, usize>,
    /// Stringified value of each input row (`None` for nulls).
    per_row: Vec<Option<String>>,
}

fn distinct_sorted(df: &DataFrame, column: &str) -> Result<Distinct> {
    let per_row = column_strings(df, column)?;
    let col = df.column(column)?;
    let mut first_rows: Vec<(usize, String)> = Vec::new();
    let mut seen: HashMap<&str, ()> = HashMap::new();
    for (idx, value) in per_row.iter().enumerate() {
        if let Some(value) = value
            && seen.insert(value.as_str(), ()).is_none()
        {
            first_rows.push((idx, value.clone()));
        }
    }
    let mut keyed = Vec::with_capacity(first_rows.len());
    for (idx, value) in first_rows {
        keyed.push((sort_key_at(col, idx)?, idx, value));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut rows = Vec::with_capacity(keyed.len());
    let mut position = HashMap::with_capacity(keyed.len());
    for (pos, (_, idx, value)) in keyed.into_iter().enumerate() {
        rows.push(idx);
        position.insert(value, pos);
    }
    Ok(Distinct {
        rows,
        position,
        per_row,
    })
}

fn take_rows(column: &Column, rows: impl IntoIterator<Item = Option<usize>>) -> Result<Column> {
    let idx = IdxCa::from_iter_options("idx".into(), rows.into_iter().map(|r| r.map(to_idx)));
    Ok(column.take(&idx)?)
}

/// Collapse each group of rows sharing `keys` into one row.
///
/// Every other column takes the first (or last) non-null value within the
/// group, null if the group has none. Groups with a null key are dropped;
/// output rows are sorted by key, key columns first.
pub fn collapse_groups(df: &DataFrame, keys: &[&str], keep: Keep) -> Result<DataFrame> {
    require_columns(df, keys)?;
    let rows = row_keys(df, keys)?;

    let mut group_of: HashMap<&[Option<String>], usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, key) in rows.iter().enumerate() {
        if key.iter().any(Option::is_none) {
            continue;
        }
        match group_of.entry(key.as_slice()) {
            Entry::Occupied(entry) => groups[*entry.get()].push(idx),
            Entry::Vacant(entry) => {
                entry.insert(groups.len());
                groups.push(vec![idx]);
            }
        }
    }

    let key_columns: Vec<&Column> = keys
        .iter()
        .map(|key| df.column(key))
        .collect::<PolarsResult<_>>()?;
    let mut ordered: Vec<(Vec<Option<SortKey>>, Vec<usize>)> = Vec::with_capacity(groups.len());
    for members in groups {
        let head = members[0];
        let sort_keys = key_columns
            .iter()
            .map(|col| sort_key_at(col, head))
            .collect::<Result<Vec<_>>>()?;
        ordered.push((sort_keys, members));
    }
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for col in &key_columns {
        columns.push(take_rows(col, ordered.iter().map(|(_, m)| Some(m[0])))?);
    }
    for col in df.get_columns() {
        if keys.contains(&col.name().as_str()) {
            continue;
        }
        let mut picks = Vec::with_capacity(ordered.len());
        for (_, members) in &ordered {
            let mut pick = None;
            let candidates: Box<dyn Iterator<Item = &usize>> = match keep {
                Keep::First => Box::new(members.iter()),
                Keep::Last => Box::new(members.iter().rev()),
            };
            for &idx in candidates {
                if !matches!(col.get(idx)?, AnyValue::Null) {
                    pick = Some(idx);
                    break;
                }
            }
            picks.push(pick);
        }
        columns.push(take_rows(col, picks)?);
    }

    let collapsed = DataFrame::new(columns)?;
    debug!(
        rows_in = df.height(),
        groups = collapsed.height(),
        keep = ?keep,
        "Collapsed groups"
    );
    Ok(collapsed)
}

/// Cross-tabulate `index` against `category`.
///
/// One row per distinct index value, one `Int64` column per distinct category
/// holding the number of rows for the pair (0 when absent).
pub fn presence_matrix(df: &DataFrame, index: &str, category: &str) -> Result<DataFrame> {
    require_columns(df, &[index, category])?;
    let patients = distinct_sorted(df, index)?;
    let categories = distinct_sorted(df, category)?;

    let mut counts = vec![vec![0i64; patients.rows.len()]; categories.rows.len()];
    for (patient, cat) in patients.per_row.iter().zip(&categories.per_row) {
        let (Some(patient), Some(cat)) = (patient, cat) else {
            continue;
        };
        let row = patients.position[patient];
        let column = categories.position[cat];
        counts[column][row] += 1;
    }

    let mut columns = Vec::with_capacity(categories.rows.len() + 1);
    columns.push(take_rows(
        df.column(index)?,
        patients.rows.iter().map(|&r| Some(r)),
    )?);
    for (pos, values) in counts.into_iter().enumerate() {
        let name = category_name(&categories, pos);
        columns.push(Series::new(name.into(), values).into());
    }
    let matrix = DataFrame::new(columns)?;
    debug!(
        patients = matrix.height(),
        categories = matrix.width() - 1,
        "Built presence matrix"
    );
    Ok(matrix)
}

/// Pivot `value` into one column per distinct `category`, one row per `index`.
///
/// Cells without a source row are null. Two rows for the same
/// (index, category) pair are an error.
pub fn value_matrix(df: &DataFrame, index: &str, category: &str, value: &str) -> Result<DataFrame> {
    require_columns(df, &[index, category, value])?;
    let patients = distinct_sorted(df, index)?;
    let categories = distinct_sorted(df, category)?;

    let mut cells: Vec<Vec<Option<usize>>> =
        vec![vec![None; patients.rows.len()]; categories.rows.len()];
    for (idx, (patient, cat)) in patients
        .per_row
        .iter()
        .zip(&categories.per_row)
        .enumerate()
    {
        let (Some(patient), Some(cat)) = (patient, cat) else {
            continue;
        };
        let cell = &mut cells[categories.position[cat]][patients.position[patient]];
        if cell.is_some() {
            return Err(TransformError::DuplicatePivotEntry {
                index: patient.clone(),
                category: cat.clone(),
            });
        }
        *cell = Some(idx);
    }

    let values = df.column(value)?;
    let mut columns = Vec::with_capacity(categories.rows.len() + 1);
    columns.push(take_rows(
        df.column(index)?,
        patients.rows.iter().map(|&r| Some(r)),
    )?);
    for (pos, rows) in cells.into_iter().enumerate() {
        let name = category_name(&categories, pos);
        let mut column = take_rows(values, rows)?;
        column.rename(name.into());
        columns.push(column);
    }
    let matrix = DataFrame::new(columns)?;
    debug!(
        patients = matrix.height(),
        categories = matrix.width() - 1,
        "Built value matrix"
    );
    Ok(matrix)
}

fn category_name(categories: &Distinct, pos: usize) -> String {
    categories.per_row[categories.rows[pos]]
        .clone()
        .unwrap_or_default()
}

/// First row per patient, restricted to the identifier and label columns.
pub fn first_label_per_patient(df: &DataFrame, id: &str, label: &str) -> Result<DataFrame> {
    require_columns(df, &[id, label])?;
    let ids = column_strings(df, id)?;
    let mut seen: HashMap<&str, ()> = HashMap::new();
    let keep: Vec<bool> = ids
        .iter()
        .map(|value| {
            value
                .as_deref()
                .is_some_and(|value| seen.insert(value, ()).is_none())
        })
        .collect();
    let firsts = filter_rows(df, &keep)?;
    Ok(firsts.select([id, label])?)
}

/// Attach the label column of `labels` to `matrix`, matching on `id`.
///
/// `labels` must hold at most one row per identifier. Matrix row order is
/// preserved.
pub fn attach_label(
    matrix: &DataFrame,
    labels: &DataFrame,
    id: &str,
    label: &str,
    how: JoinKind,
) -> Result<DataFrame> {
    require_columns(matrix, &[id])?;
    require_columns(labels, &[id, label])?;

    let mut label_row: HashMap<String, usize> = HashMap::new();
    for (idx, value) in column_strings(labels, id)?.into_iter().enumerate() {
        if let Some(value) = value {
            label_row.entry(value).or_insert(idx);
        }
    }
    let matches: Vec<Option<usize>> = column_strings(matrix, id)?
        .iter()
        .map(|value| value.as_ref().and_then(|v| label_row.get(v).copied()))
        .collect();

    let (mut joined, matches) = match how {
        JoinKind::Left => (matrix.clone(), matches),
        JoinKind::Inner => {
            let keep: Vec<bool> = matches.iter().map(Option::is_some).collect();
            let kept = matches.into_iter().flatten().map(Some).collect();
            (filter_rows(matrix, &keep)?, kept)
        }
    };
    let label_column = take_rows(labels.column(label)?, matches)?;
    joined.with_column(label_column)?;
    debug!(
        rows_in = matrix.height(),
        rows_out = joined.height(),
        how = ?how,
        "Attached label"
    );
    Ok(joined)
}
