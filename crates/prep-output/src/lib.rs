//! Output side of the preprocessing pipeline.
//!
//! - [`table`]: write a stage frame as CSV, Parquet or Arrow IPC
//! - [`sidecar`]: the cohort registry and the diagnosis code catalog

pub mod common;
pub mod error;
pub mod sidecar;
pub mod table;

pub use error::{OutputError, Result};
pub use sidecar::{write_code_catalog, write_cohort};
pub use table::{INDEX_COLUMN, WriteOptions, write_table};
