//! Input side of the preprocessing pipeline.
//!
//! # Features
//!
//! - **Configuration**: load `config.json` and look up a dataset by name
//! - **Table Reading**: CSV (optionally gzip-compressed), Parquet and Arrow IPC
//! - **Cohort Registry**: read the patient identifiers written by the demographic stage

mod cohort;
mod config;
mod error;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Configuration ===
pub use config::{DEFAULT_CONFIG_FILE, PipelineConfig};

// === Table Reading ===
pub use table::read_table;

// === Cohort Registry ===
pub use cohort::read_cohort;
