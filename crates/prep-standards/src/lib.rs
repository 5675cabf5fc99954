//! Static reference tables used by the preprocessing stages.
//!
//! - [`nationality`]: nationality → country / continent / region
//! - [`embedded`]: the raw CSV content compiled into the crate

pub mod embedded;
pub mod error;
pub mod nationality;

pub use error::{Result, StandardsError};
pub use nationality::{Nationality, NationalityTable};
