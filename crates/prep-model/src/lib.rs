//! Shared types for the preprocessing pipeline.
//!
//! Configuration records, table formats, categorical codes, the cohort
//! registry and stage outcomes live here so every other crate can agree on
//! them without pulling in the dataframe stack.

pub mod codes;
pub mod cohort;
pub mod columns;
pub mod config;
pub mod error;
pub mod format;
pub mod stage;

pub use codes::{Gender, Label};
pub use cohort::CohortRegistry;
pub use config::{AgeDate, Compression, DatasetConfig, Location, Parameters, construct_path};
pub use error::{ModelError, Result};
pub use format::{Codec, TableFormat};
pub use stage::{StageKind, StageOutcome, StageStatus, StageSummary};
