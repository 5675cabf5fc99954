//! Record-linkage and reshaping transforms for the five preprocessing stages.
//!
//! Every stage transform is a pure function from a source `DataFrame` (plus
//! its parameters and, for the dependent stages, the cohort registry) to the
//! frame that gets written, along with any side products.

pub mod clinical;
pub mod dates;
pub mod demographic;
pub mod diagnosis;
pub mod drugs;
pub mod dtypes;
pub mod error;
pub mod frame_ops;
pub mod keys;
pub mod labs;
pub mod recode;
pub mod reshape;

use polars::prelude::DataFrame;

use prep_model::Parameters;

// === Errors ===
pub use error::{Result, TransformError};

// === Stage outputs ===
pub use clinical::ClinicalOutput;
pub use demographic::DemographicOutput;
pub use diagnosis::DiagnosisOutput;

// === Shared operations ===
pub use dtypes::{apply_dtypes, parse_dtype};
pub use frame_ops::{
    Keep, drop_duplicates, filter_to_cohort, parse_dates, require_columns, sort_descending_by,
    trim_strings,
};
pub use recode::{recode_gender, recode_label};
pub use reshape::{
    JoinKind, attach_label, collapse_groups, first_label_per_patient, presence_matrix,
    value_matrix,
};

/// Output of the drugs and labs transforms.
#[derive(Debug)]
pub struct EventOutput {
    /// One row per patient, one column per category, then the label.
    pub frame: DataFrame,
    /// Source rows left after the cohort filter.
    pub cohort_rows: usize,
}

pub(crate) fn required_date_format(params: &Parameters) -> Result<&str> {
    params
        .date_format
        .as_deref()
        .ok_or(TransformError::MissingParameter {
            name: "date_format",
        })
}
