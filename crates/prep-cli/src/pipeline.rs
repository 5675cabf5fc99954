//! Stage orchestration.
//!
//! Stages run sequentially in canonical order. Each one reads its source
//! table, runs its transform and writes its outputs, and its result is
//! recorded as a [`StageOutcome`]. A failed demographic stage skips the
//! stages that depend on the cohort registry; any other failure is recorded
//! and the run continues.

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polars::prelude::DataFrame;
use tracing::{error, info, info_span, warn};

use prep_ingest::{PipelineConfig, read_cohort, read_table};
use prep_model::columns::{CODE_CATALOG_FILE, COHORT_FILE};
use prep_model::{CohortRegistry, DatasetConfig, StageKind, StageOutcome, StageStatus, StageSummary};
use prep_output::{WriteOptions, write_code_catalog, write_cohort, write_table};
use prep_standards::NationalityTable;
use prep_transform::{clinical, demographic, diagnosis, drugs, labs};

use crate::logging::StageLogs;

/// Outcomes of one pipeline run, in run order.
#[derive(Debug, Default)]
pub struct PipelineResult {
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineResult {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(StageOutcome::succeeded)
    }

    pub fn outcome(&self, stage: StageKind) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|outcome| outcome.stage == stage)
    }
}

/// Stages to run for an `--only` selection, in canonical order. Empty selects all.
pub fn selected_stages(only: &[StageKind]) -> Vec<StageKind> {
    StageKind::ALL
        .into_iter()
        .filter(|stage| only.is_empty() || only.contains(stage))
        .collect()
}

/// Run `stages` against `config`.
pub fn run_pipeline(
    config: &PipelineConfig,
    stages: &[StageKind],
    logs: &StageLogs,
    progress: &ProgressBar,
) -> PipelineResult {
    let run_start = Instant::now();
    let mut result = PipelineResult::default();
    let mut cohort_unavailable: Option<String> = None;
    info!(
        datasets = config.datasets().len(),
        stages = stages.len(),
        "Pipeline starting"
    );

    for &stage in stages {
        progress.set_message(stage.as_str());
        if let Err(error) = logs.begin(stage) {
            warn!(stage = %stage, error = %error, "Cannot open stage log file");
        }

        let span = info_span!("stage", stage = %stage);
        let entered = span.enter();
        let start = Instant::now();

        let skip_reason = cohort_unavailable
            .as_ref()
            .filter(|_| stage.needs_cohort())
            .cloned();
        let status = match skip_reason {
            Some(reason) => {
                warn!(reason = %reason, "Stage skipped");
                StageStatus::Skipped { reason }
            }
            None => match run_stage(stage, config) {
                Ok(summary) => {
                    info!(
                        rows = summary.rows,
                        columns = summary.columns,
                        output = %summary.output.display(),
                        duration_ms = start.elapsed().as_millis(),
                        "Stage succeeded"
                    );
                    StageStatus::Succeeded(summary)
                }
                Err(err) => {
                    let reason = format!("{err:#}");
                    error!(error = %reason, "Stage failed");
                    if stage == StageKind::Demographic {
                        cohort_unavailable =
                            Some("demographic stage failed; cohort registry unavailable".to_string());
                    }
                    StageStatus::Failed { reason }
                }
            },
        };

        result.outcomes.push(StageOutcome {
            stage,
            status,
            duration_ms: start.elapsed().as_millis(),
        });
        drop(entered);
        if let Err(error) = logs.end() {
            warn!(stage = %stage, error = %error, "Cannot flush stage log file");
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        stages = result.outcomes.len(),
        failed = result.outcomes.iter().filter(|o| !o.succeeded()).count(),
        duration_ms = run_start.elapsed().as_millis(),
        "Pipeline finished"
    );
    result
}

/// Run one stage end to end.
pub fn run_stage(stage: StageKind, config: &PipelineConfig) -> Result<StageSummary> {
    let dataset = config.dataset(stage.as_str())?;
    let params = &dataset.parameters;
    match stage {
        StageKind::Demographic => run_demographic(dataset),
        StageKind::Diagnosis => {
            let (source, cohort) = source_and_cohort(config, dataset)?;
            let output = diagnosis::transform(source, &cohort, params)
                .context("transform diagnosis")?;
            let path = dataset.destination_sidecar(CODE_CATALOG_FILE);
            write_code_catalog(&output.catalog, &path)
                .with_context(|| format!("write code catalog {}", path.display()))?;
            info!(codes = output.catalog.len(), path = %path.display(), "Wrote code catalog");
            write_output(dataset, &output.frame)
        }
        StageKind::Drugs => {
            let (source, cohort) = source_and_cohort(config, dataset)?;
            let output = drugs::transform(source, &cohort, params).context("transform drugs")?;
            write_output(dataset, &output.frame)
        }
        StageKind::Labs => {
            let (source, cohort) = source_and_cohort(config, dataset)?;
            let output = labs::transform(source, &cohort, params).context("transform labs")?;
            write_output(dataset, &output.frame)
        }
        StageKind::Clinical => {
            let (source, cohort) = source_and_cohort(config, dataset)?;
            let output =
                clinical::transform(source, &cohort, params).context("transform clinical")?;
            write_output(dataset, &output.frame)
        }
    }
}

fn run_demographic(dataset: &DatasetConfig) -> Result<StageSummary> {
    let nationalities = NationalityTable::embedded().context("load nationality table")?;
    let source = read_source(dataset)?;
    let output = demographic::transform(source, &dataset.parameters, &nationalities)
        .context("transform demographic")?;
    let summary = write_output(dataset, &output.frame)?;

    let path = dataset.destination_sidecar(COHORT_FILE);
    write_cohort(&output.cohort, &path)
        .with_context(|| format!("write cohort registry {}", path.display()))?;
    info!(
        patients = output.cohort.len(),
        path = %path.display(),
        "Wrote cohort registry"
    );
    Ok(summary)
}

fn source_and_cohort(
    config: &PipelineConfig,
    dataset: &DatasetConfig,
) -> Result<(DataFrame, CohortRegistry)> {
    let cohort = load_cohort(config)?;
    Ok((read_source(dataset)?, cohort))
}

/// The registry lives next to the demographic output.
fn load_cohort(config: &PipelineConfig) -> Result<CohortRegistry> {
    let demographic = config.dataset(StageKind::Demographic.as_str())?;
    let path = demographic.destination_sidecar(COHORT_FILE);
    let cohort = read_cohort(&path)
        .with_context(|| format!("read cohort registry {}", path.display()))?;
    info!(patients = cohort.len(), "Loaded cohort registry");
    Ok(cohort)
}

fn read_source(dataset: &DatasetConfig) -> Result<DataFrame> {
    let path = dataset.source_file()?;
    let codec = dataset.source.codec()?;
    let df = read_table(&path, dataset.source.format, codec)
        .with_context(|| format!("read source {}", path.display()))?;
    info!(
        rows = df.height(),
        columns = df.width(),
        path = %path.display(),
        "Read source"
    );
    Ok(df)
}

fn write_output(dataset: &DatasetConfig, df: &DataFrame) -> Result<StageSummary> {
    let path = dataset.destination_file()?;
    let codec = dataset.destination.codec()?;
    write_table(
        df,
        &path,
        dataset.destination.format,
        codec,
        WriteOptions::without_index(),
    )
    .with_context(|| format!("write output {}", path.display()))?;
    Ok(StageSummary {
        rows: df.height(),
        columns: df.width(),
        output: path,
    })
}
