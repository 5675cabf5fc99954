//! Label and gender recoding to small nullable integers.

use polars::prelude::*;
use tracing::debug;

use prep_common::column_strings;
use prep_model::{Gender, Label};

use crate::error::Result;
use crate::frame_ops::require_columns;

/// Recode a `YES`/`NO` label column to 1/0 in place.
///
/// `UNKNOWN` and unrecognized values become null. Returns how many non-null
/// values were nulled.
pub fn recode_label(df: &mut DataFrame, column: &str) -> Result<usize> {
    recode(df, column, |raw| Label::from_raw(raw).map(Label::code))
}

/// Recode a `Male`/`Female` column to 1/2 in place.
pub fn recode_gender(df: &mut DataFrame, column: &str) -> Result<usize> {
    recode(df, column, |raw| Gender::from_raw(raw).map(Gender::code))
}

fn recode<F>(df: &mut DataFrame, column: &str, code: F) -> Result<usize>
where
    F: Fn(&str) -> Option<i64>,
{
    require_columns(df, &[column])?;
    let mut unrecognized = 0;
    let values: Vec<Option<i64>> = column_strings(df, column)?
        .into_iter()
        .map(|raw| {
            let raw = raw?;
            let coded = code(&raw);
            if coded.is_none() {
                unrecognized += 1;
            }
            coded
        })
        .collect();
    df.with_column(Series::new(column.into(), values))?;
    if unrecognized > 0 {
        debug!(column, unrecognized, "Recoded unrecognized values to null");
    }
    Ok(unrecognized)
}
