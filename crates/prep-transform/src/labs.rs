//! Labs stage: most recent result per patient and panel.

use polars::prelude::*;
use tracing::info;

use prep_model::columns::{LABEL, ORDER_CATALOG, ORDER_DATE, PERSON_ID, RESULT_VALUE};
use prep_model::{CohortRegistry, Parameters};

use crate::dtypes::apply_dtypes;
use crate::error::Result;
use crate::frame_ops::{
    Keep, drop_duplicates, filter_to_cohort, parse_dates, require_columns, sort_descending_by,
};
use crate::recode::recode_label;
use crate::reshape::{JoinKind, attach_label, first_label_per_patient, value_matrix};
use crate::EventOutput;

pub fn transform(df: DataFrame, cohort: &CohortRegistry, params: &Parameters) -> Result<EventOutput> {
    require_columns(
        &df,
        &[PERSON_ID, ORDER_DATE, ORDER_CATALOG, RESULT_VALUE, LABEL],
    )?;
    let date_format = crate::required_date_format(params)?;

    let mut df = filter_to_cohort(&df, cohort)?;
    let cohort_rows = df.height();
    apply_dtypes(&mut df, &params.dtype_conversion)?;
    parse_dates(&mut df, ORDER_DATE, date_format)?;
    let mut df = sort_descending_by(&df, ORDER_DATE)?;
    recode_label(&mut df, LABEL)?;

    let latest = drop_duplicates(&df, &[PERSON_ID, ORDER_CATALOG], Keep::First)?;
    let matrix = value_matrix(&latest, PERSON_ID, ORDER_CATALOG, RESULT_VALUE)?;

    let labels = first_label_per_patient(&latest, PERSON_ID, LABEL)?;
    let frame = attach_label(&matrix, &labels, PERSON_ID, LABEL, JoinKind::Inner)?;

    info!(
        results = latest.height(),
        patients = frame.height(),
        panels = frame.width().saturating_sub(2),
        "Labs matrix ready"
    );
    Ok(EventOutput { frame, cohort_rows })
}
