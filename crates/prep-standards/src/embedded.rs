//! Embedded reference data.
//!
//! Reference tables are embedded at compile time using `include_str!()`, so
//! the pipeline never resolves data paths at runtime.

/// Nationality → country / continent / region.
///
/// Columns: `nationality,country,continent,region`. An empty cell means the
/// nationality has no entry for that attribute.
pub const NATIONALITIES: &str = include_str!("../data/nationalities.csv");
