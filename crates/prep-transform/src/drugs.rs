//! Drugs stage: order counts per drug mnemonic.

use polars::prelude::*;
use tracing::info;

use prep_model::columns::{ENCOUNTER_ID, LABEL, ORDER_DATE, ORDER_MNEMONIC, PERSON_ID};
use prep_model::{CohortRegistry, Parameters};

use crate::error::Result;
use crate::frame_ops::{
    Keep, filter_to_cohort, parse_dates, require_columns, sort_descending_by, trim_strings,
};
use crate::recode::recode_label;
use crate::reshape::{
    JoinKind, attach_label, collapse_groups, first_label_per_patient, presence_matrix,
};
use crate::EventOutput;

pub fn transform(df: DataFrame, cohort: &CohortRegistry, params: &Parameters) -> Result<EventOutput> {
    require_columns(
        &df,
        &[PERSON_ID, ENCOUNTER_ID, ORDER_DATE, ORDER_MNEMONIC, LABEL],
    )?;
    let date_format = crate::required_date_format(params)?;

    let mut df = filter_to_cohort(&df, cohort)?;
    let cohort_rows = df.height();
    parse_dates(&mut df, ORDER_DATE, date_format)?;
    trim_strings(&mut df, ORDER_MNEMONIC)?;
    recode_label(&mut df, LABEL)?;

    // Keeping the last row after a descending sort keeps the earliest order.
    let df = sort_descending_by(&df, ORDER_DATE)?;
    let orders = collapse_groups(&df, &[PERSON_ID, ENCOUNTER_ID, ORDER_MNEMONIC], Keep::Last)?;
    let matrix = presence_matrix(&orders, PERSON_ID, ORDER_MNEMONIC)?;

    let labels = first_label_per_patient(&df, PERSON_ID, LABEL)?;
    let frame = attach_label(&matrix, &labels, PERSON_ID, LABEL, JoinKind::Left)?;

    info!(
        orders = orders.height(),
        patients = frame.height(),
        mnemonics = frame.width().saturating_sub(2),
        "Drugs matrix ready"
    );
    Ok(EventOutput { frame, cohort_rows })
}
