//! CLI argument definitions for the preprocessing pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use prep_ingest::DEFAULT_CONFIG_FILE;
use prep_model::StageKind;

#[derive(Parser)]
#[command(
    name = "prep",
    version,
    about = "Clean and reshape clinical extracts into per-patient tables",
    long_about = "Clean and reshape clinical extracts into per-patient tables.\n\n\
                  Runs the demographic, diagnosis, drugs, labs and clinical stages in order.\n\
                  The demographic stage writes the cohort registry the other stages filter on."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Pipeline configuration file.
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Run only the named stage (repeatable). Stages still run in canonical order.
    #[arg(long = "only", value_name = "STAGE")]
    pub only: Vec<StageKind>,

    /// Directory receiving one log file per stage.
    #[arg(long = "logs-dir", value_name = "DIR", default_value = "logs", global = true)]
    pub logs_dir: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the pipeline stages in run order.
    Stages,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
