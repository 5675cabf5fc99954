//! Diagnosis stage: encounter counts per diagnosis code and the code catalog.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::info;

use prep_common::column_strings;
use prep_model::columns::{DIAGNOSIS_CODE, DIAGNOSIS_DESCRIPTION, ENCOUNTER_ID, LABEL, PERSON_ID};
use prep_model::{CohortRegistry, Parameters};

use crate::dtypes::apply_dtypes;
use crate::error::Result;
use crate::frame_ops::{Keep, filter_to_cohort, require_columns};
use crate::recode::recode_label;
use crate::reshape::{
    JoinKind, attach_label, collapse_groups, first_label_per_patient, presence_matrix,
};

const SELECTED: [&str; 5] = [
    PERSON_ID,
    ENCOUNTER_ID,
    DIAGNOSIS_CODE,
    DIAGNOSIS_DESCRIPTION,
    LABEL,
];

#[derive(Debug)]
pub struct DiagnosisOutput {
    /// One row per patient, one count column per diagnosis code, then the label.
    pub frame: DataFrame,
    /// Diagnosis code to its first recorded description.
    pub catalog: BTreeMap<String, String>,
}

pub fn transform(
    df: DataFrame,
    cohort: &CohortRegistry,
    params: &Parameters,
) -> Result<DiagnosisOutput> {
    require_columns(&df, &SELECTED)?;
    let mut df = filter_to_cohort(&df, cohort)?.select(SELECTED)?;
    apply_dtypes(&mut df, &params.dtype_conversion)?;

    let catalog = code_catalog(&df)?;

    let events = collapse_groups(&df, &[PERSON_ID, ENCOUNTER_ID, DIAGNOSIS_CODE], Keep::Last)?;
    let matrix = presence_matrix(&events, PERSON_ID, DIAGNOSIS_CODE)?;

    let mut labels = first_label_per_patient(&events, PERSON_ID, LABEL)?;
    recode_label(&mut labels, LABEL)?;
    let frame = attach_label(&matrix, &labels, PERSON_ID, LABEL, JoinKind::Left)?;

    info!(
        events = events.height(),
        patients = frame.height(),
        codes = catalog.len(),
        "Diagnosis matrix ready"
    );
    Ok(DiagnosisOutput { frame, catalog })
}

/// First non-null description recorded for each code.
fn code_catalog(df: &DataFrame) -> Result<BTreeMap<String, String>> {
    let codes = column_strings(df, DIAGNOSIS_CODE)?;
    let descriptions = column_strings(df, DIAGNOSIS_DESCRIPTION)?;
    let mut catalog = BTreeMap::new();
    for (code, description) in codes.into_iter().zip(descriptions) {
        if let (Some(code), Some(description)) = (code, description) {
            catalog.entry(code).or_insert(description);
        }
    }
    Ok(catalog)
}
