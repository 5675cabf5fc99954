//! Demographic stage: one cleaned row per patient and the cohort registry.

use polars::prelude::*;
use tracing::info;

use prep_common::column_strings;
use prep_model::columns::{
    AGE, BIRTH_DATE, CONTINENT, COUNTRY, DEATH, DEATH_DATE, GENDER, LABEL, NATIONALITY, PERSON_ID,
    REGION,
};
use prep_model::{CohortRegistry, Parameters};
use prep_standards::NationalityTable;

use crate::dates::{age_at, from_epoch_millis};
use crate::dtypes::apply_dtypes;
use crate::error::{Result, TransformError};
use crate::frame_ops::{Keep, drop_duplicates, parse_dates, require_columns};
use crate::recode::{recode_gender, recode_label};

/// Format of the birth and death dates in the demographic extract.
pub const DEMOGRAPHIC_DATE_FORMAT: &str = "%d/%b/%Y";

const DEDUP_KEYS: [&str; 3] = [PERSON_ID, GENDER, NATIONALITY];

/// Result of the demographic transform.
#[derive(Debug)]
pub struct DemographicOutput {
    pub frame: DataFrame,
    /// Distinct surviving patient identifiers, first-seen order.
    pub cohort: CohortRegistry,
    pub duplicates_removed: usize,
}

pub fn transform(
    df: DataFrame,
    params: &Parameters,
    nationalities: &NationalityTable,
) -> Result<DemographicOutput> {
    require_columns(
        &df,
        &[PERSON_ID, GENDER, NATIONALITY, BIRTH_DATE, DEATH_DATE, LABEL],
    )?;
    let reference = params
        .age_date
        .as_ref()
        .ok_or(TransformError::MissingParameter { name: "age_date" })?
        .parse()?;

    let mut df = df;
    parse_dates(&mut df, BIRTH_DATE, DEMOGRAPHIC_DATE_FORMAT)?;
    parse_dates(&mut df, DEATH_DATE, DEMOGRAPHIC_DATE_FORMAT)?;

    let rows_in = df.height();
    let mut df = drop_duplicates(&df, &DEDUP_KEYS, Keep::First)?;
    let duplicates_removed = rows_in - df.height();
    if duplicates_removed > 0 {
        info!(duplicates_removed, "Dropped duplicated patient rows");
    }

    let births = df.column(BIRTH_DATE)?.cast(&DataType::Int64)?;
    let ages: Vec<Option<i64>> = births
        .i64()?
        .into_iter()
        .map(|millis| {
            let birth = from_epoch_millis(millis?)?.date();
            age_at(birth, reference)
        })
        .collect();
    df.with_column(Series::new(AGE.into(), ages))?;

    let deaths: Vec<i8> = df
        .column(DEATH_DATE)?
        .is_not_null()
        .into_iter()
        .map(|present| i8::from(present.unwrap_or(false)))
        .collect();
    df.with_column(Series::new(DEATH.into(), deaths))?;

    recode_label(&mut df, LABEL)?;
    recode_gender(&mut df, GENDER)?;
    apply_dtypes(&mut df, &params.dtype_conversion)?;

    let recorded = column_strings(&df, NATIONALITY)?;
    let lookup = |field: for<'a> fn(&'a NationalityTable, &str) -> Option<&'a str>| -> Vec<Option<String>> {
        recorded
            .iter()
            .map(|n| {
                n.as_deref()
                    .and_then(|n| field(nationalities, n))
                    .map(str::to_string)
            })
            .collect()
    };
    let countries = lookup(NationalityTable::country);
    let continents = lookup(NationalityTable::continent);
    let regions = lookup(NationalityTable::region);
    df.with_column(Series::new(COUNTRY.into(), countries))?;
    df.with_column(Series::new(CONTINENT.into(), continents))?;
    df.with_column(Series::new(REGION.into(), regions))?;

    let cohort = CohortRegistry::from_ids(column_strings(&df, PERSON_ID)?.into_iter().flatten());
    info!(
        patients = cohort.len(),
        rows = df.height(),
        "Demographic frame ready"
    );
    Ok(DemographicOutput {
        frame: df,
        cohort,
        duplicates_removed,
    })
}
