//! Clinical stage: most recent numeric measurement per patient and event.

use polars::prelude::*;
use tracing::info;

use prep_common::{column_strings, parse_f64};
use prep_model::columns::{
    CLINICAL_BOOKKEEPING, EVENT_DATETIME, EVENT_NAME, EVENT_RESULT, LABEL, PERSON_ID,
};
use prep_model::{CohortRegistry, Parameters};

use crate::error::Result;
use crate::frame_ops::{
    Keep, drop_columns_if_present, filter_rows, filter_to_cohort, map_strings,
    null_tokens_to_null, parse_dates, require_columns, sort_descending_by,
};
use crate::recode::recode_label;
use crate::reshape::{JoinKind, attach_label, collapse_groups, first_label_per_patient, value_matrix};

/// Timestamp fragment marking a corrupted clinical event.
pub const MALFORMED_TIMESTAMP_MARKER: &str = "4557";

#[derive(Debug)]
pub struct ClinicalOutput {
    pub frame: DataFrame,
    /// Rows dropped for a malformed timestamp.
    pub malformed_removed: usize,
    /// Rows dropped for a null or non-numeric result.
    pub non_numeric_removed: usize,
}

pub fn transform(
    df: DataFrame,
    cohort: &CohortRegistry,
    params: &Parameters,
) -> Result<ClinicalOutput> {
    require_columns(
        &df,
        &[PERSON_ID, EVENT_DATETIME, EVENT_NAME, EVENT_RESULT, LABEL],
    )?;
    let date_format = crate::required_date_format(params)?;

    let mut df = filter_to_cohort(&df, cohort)?;
    recode_label(&mut df, LABEL)?;
    let df = drop_columns_if_present(&df, &CLINICAL_BOOKKEEPING);

    let well_formed: Vec<bool> = column_strings(&df, EVENT_DATETIME)?
        .iter()
        .map(|ts| {
            ts.as_deref()
                .is_none_or(|ts| !ts.contains(MALFORMED_TIMESTAMP_MARKER))
        })
        .collect();
    let mut df = filter_rows(&df, &well_formed)?;
    let malformed_removed = well_formed.iter().filter(|keep| !**keep).count();

    parse_dates(&mut df, EVENT_DATETIME, date_format)?;
    let mut df = sort_descending_by(&df, EVENT_DATETIME)?;

    null_tokens_to_null(&mut df, EVENT_RESULT)?;
    let results: Vec<Option<f64>> = column_strings(&df, EVENT_RESULT)?
        .iter()
        .map(|value| {
            value
                .as_deref()
                .and_then(parse_f64)
                .filter(|v| !v.is_nan())
        })
        .collect();
    let numeric: Vec<bool> = results.iter().map(Option::is_some).collect();
    let non_numeric_removed = numeric.iter().filter(|keep| !**keep).count();
    df.with_column(Series::new(EVENT_RESULT.into(), results))?;
    let mut df = filter_rows(&df, &numeric)?;

    map_strings(&mut df, EVENT_NAME, |name| {
        Some(name.trim_end_matches('.').to_string())
    })?;

    let latest = collapse_groups(&df, &[PERSON_ID, EVENT_NAME], Keep::First)?;
    let matrix = value_matrix(&latest, PERSON_ID, EVENT_NAME, EVENT_RESULT)?;

    let labels = first_label_per_patient(&df, PERSON_ID, LABEL)?;
    let frame = attach_label(&matrix, &labels, PERSON_ID, LABEL, JoinKind::Inner)?;

    info!(
        malformed_removed,
        non_numeric_removed,
        patients = frame.height(),
        events = frame.width().saturating_sub(2),
        "Clinical matrix ready"
    );
    Ok(ClinicalOutput {
        frame,
        malformed_removed,
        non_numeric_removed,
    })
}
