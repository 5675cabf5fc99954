//! Orchestration library for the `prep` binary.

pub mod logging;
pub mod pipeline;
pub mod progress;
