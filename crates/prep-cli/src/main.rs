//! Preprocessing pipeline CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use prep_cli::logging::{LogConfig, LogFormat, StageLogs, init_logging};
use prep_cli::pipeline::{PipelineResult, run_pipeline, selected_stages};
use prep_cli::progress::stage_progress_bar;
use prep_ingest::PipelineConfig;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_stages, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let stage_logs = StageLogs::new(&cli.logs_dir);
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config, &stage_logs) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Some(Command::Stages) => {
            print_stages();
            0
        }
        None => match run(&cli, &stage_logs) {
            Ok(result) => {
                print_summary(&result);
                if result.all_succeeded() { 0 } else { 1 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli, stage_logs: &StageLogs) -> Result<PipelineResult> {
    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("load configuration {}", cli.config.display()))?;
    let stages = selected_stages(&cli.only);
    let progress = stage_progress_bar(stages.len());
    Ok(run_pipeline(&config, &stages, stage_logs, &progress))
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stderr().is_terminal(),
    };
    config
}
