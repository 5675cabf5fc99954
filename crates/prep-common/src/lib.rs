//! Shared utilities for the preprocessing crates.
//!
//! This crate provides the polars `AnyValue` conversions every stage relies
//! on when it compares identifiers, recodes categorical text or coerces
//! result values to numbers.

pub mod polars;

pub use polars::{
    any_to_f64, any_to_string, column_strings, format_numeric, is_null_token, parse_f64,
};
