//! Configuration provider.
//!
//! The configuration file holds one entry per dataset under `dataframes`.
//! It is parsed once by the orchestrator, which hands each stage a borrowed
//! [`DatasetConfig`].

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use prep_model::DatasetConfig;

use crate::error::{IngestError, Result, io_error};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Every dataset configuration of one pipeline run.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    dataframes: Vec<DatasetConfig>,
}

impl PipelineConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let config = Self::from_json(&content).map_err(|source| IngestError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            datasets = config.dataframes.len(),
            "Loaded pipeline configuration"
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Look up the configuration of one dataset by name.
    pub fn dataset(&self, name: &str) -> Result<&DatasetConfig> {
        self.dataframes
            .iter()
            .find(|config| config.name == name)
            .ok_or_else(|| IngestError::ConfigNotFound {
                name: name.to_string(),
            })
    }

    pub fn datasets(&self) -> &[DatasetConfig] {
        &self.dataframes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"{
        "dataframes": [
            {
                "name": "labs",
                "source": {"path": "data/raw", "format": "csv",
                           "compression": {"enabled": false, "method": null}},
                "destination": {"path": "data/processed", "format": "pkl",
                                "compression": {"enabled": false, "method": null}},
                "parameters": {"date_format": "%d/%m/%Y %H:%M", "dtype_conversion": {}}
            }
        ]
    }"#;

    fn temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_load_and_lookup() {
        let file = temp_config(CONFIG);
        let config = PipelineConfig::load(file.path()).unwrap();
        let labs = config.dataset("labs").unwrap();
        assert_eq!(labs.parameters.date_format.as_deref(), Some("%d/%m/%Y %H:%M"));
        assert_eq!(config.datasets().len(), 1);
    }

    #[test]
    fn test_missing_dataset() {
        let config = PipelineConfig::from_json(CONFIG).unwrap();
        assert!(matches!(
            config.dataset("clinical"),
            Err(IngestError::ConfigNotFound { name }) if name == "clinical"
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = PipelineConfig::load(Path::new("does/not/exist/config.json"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_unsupported_format_fails_parse() {
        let file = temp_config(&CONFIG.replace("\"pkl\"", "\"xlsx\""));
        assert!(matches!(
            PipelineConfig::load(file.path()),
            Err(IngestError::ConfigParse { .. })
        ));
    }
}
