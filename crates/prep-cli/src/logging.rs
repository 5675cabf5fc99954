//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Two layers are installed:
//!
//! - stderr, filtered by the CLI verbosity (or `RUST_LOG`), in the chosen format;
//! - a per-stage log file at INFO with timestamps, `<logs-dir>/<stage>.log`,
//!   appended to across runs. The orchestrator switches the active file as
//!   each stage begins; events outside a stage are not written to any file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use prep_model::StageKind;

/// Configuration for the stderr layer.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when set.
    pub use_env_filter: bool,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
        }
    }
}

/// Initialize the global subscriber: stderr plus the per-stage file layer.
pub fn init_logging(config: &LogConfig, stage_logs: &StageLogs) -> Result<(), TryInitError> {
    let filter = build_env_filter(config);

    let stderr: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .without_time()
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target)
            .without_time()
            .with_filter(filter)
            .boxed(),
    };

    let stage_file = fmt::layer()
        .with_writer(stage_logs.clone())
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO)
        .boxed();

    tracing_subscriber::registry()
        .with(vec![stderr, stage_file])
        .try_init()
}

/// Switchable destination for the per-stage log files.
#[derive(Debug, Clone)]
pub struct StageLogs {
    dir: PathBuf,
    active: Arc<Mutex<Option<File>>>,
}

impl StageLogs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log file of a stage.
    pub fn path_for(&self, stage: StageKind) -> PathBuf {
        self.dir.join(format!("{}.log", stage.as_str()))
    }

    /// Route file output to the stage's log, creating the directory if needed.
    pub fn begin(&self, stage: StageKind) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(stage);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut active = self.lock()?;
        *active = Some(file);
        Ok(path)
    }

    /// Flush and detach the active stage log.
    pub fn end(&self) -> io::Result<()> {
        let mut active = self.lock()?;
        if let Some(mut file) = active.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Option<File>>> {
        self.active
            .lock()
            .map_err(|_| io::Error::other("stage log lock poisoned"))
    }
}

/// Writer handed out per event; discards output while no stage is active.
pub struct StageLogGuard {
    active: Arc<Mutex<Option<File>>>,
}

impl Write for StageLogGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .active
            .lock()
            .map_err(|_| io::Error::other("stage log lock poisoned"))?;
        match guard.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .active
            .lock()
            .map_err(|_| io::Error::other("stage log lock poisoned"))?;
        match guard.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for StageLogs {
    type Writer = StageLogGuard;

    fn make_writer(&'a self) -> Self::Writer {
        StageLogGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// Build the stderr filter, respecting `RUST_LOG` unless an explicit level was given.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let level = config.level_filter.to_string().to_lowercase();
    // Dependencies stay at warn to reduce noise.
    let directives = format!(
        "warn,prep_cli={level},prep_ingest={level},prep_model={level},\
         prep_output={level},prep_standards={level},prep_transform={level}"
    );
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    } else {
        EnvFilter::new(directives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stage_files_are_appended_and_switched() {
        let dir = TempDir::new().unwrap();
        let logs = StageLogs::new(dir.path().join("logs"));

        let path = logs.begin(StageKind::Labs).unwrap();
        assert_eq!(path, dir.path().join("logs").join("labs.log"));
        logs.make_writer().write_all(b"first\n").unwrap();
        logs.end().unwrap();

        logs.make_writer().write_all(b"dropped\n").unwrap();

        logs.begin(StageKind::Labs).unwrap();
        logs.make_writer().write_all(b"second\n").unwrap();
        logs.end().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
