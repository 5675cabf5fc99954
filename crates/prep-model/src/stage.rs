//! Pipeline stages and their outcomes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One of the five dataset stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Demographic,
    Diagnosis,
    Drugs,
    Labs,
    Clinical,
}

impl StageKind {
    /// Canonical run order. Demographic comes first because it writes the
    /// cohort registry every other stage reads.
    pub const ALL: [StageKind; 5] = [
        StageKind::Demographic,
        StageKind::Diagnosis,
        StageKind::Drugs,
        StageKind::Labs,
        StageKind::Clinical,
    ];

    /// Dataset name used to look up the stage configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Demographic => "demographic",
            Self::Diagnosis => "diagnosis",
            Self::Drugs => "drugs",
            Self::Labs => "labs",
            Self::Clinical => "clinical",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Demographic => "Patient attributes; establishes the cohort and label",
            Self::Diagnosis => "Diagnosis code presence matrix and code catalog",
            Self::Drugs => "Drug order presence matrix",
            Self::Labs => "Most recent lab result per panel",
            Self::Clinical => "Most recent clinical measurement per event",
        }
    }

    /// Whether the stage reads the cohort registry.
    pub fn needs_cohort(self) -> bool {
        !matches!(self, Self::Demographic)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStage(s.to_string()))
    }
}

/// Shape and location of a successfully written stage output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub rows: usize,
    pub columns: usize,
    pub output: PathBuf,
}

/// What happened to a stage during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageStatus {
    Succeeded(StageSummary),
    Failed { reason: String },
    Skipped { reason: String },
}

/// Result of running (or not running) one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: StageKind,
    pub status: StageStatus,
    pub duration_ms: u128,
}

impl StageOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, StageStatus::Succeeded(_))
    }

    pub fn summary(&self) -> Option<&StageSummary> {
        match &self.status {
            StageStatus::Succeeded(summary) => Some(summary),
            _ => None,
        }
    }
}
