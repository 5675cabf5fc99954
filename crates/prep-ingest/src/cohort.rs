//! Cohort registry loading.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use prep_common::format_numeric;
use prep_model::CohortRegistry;

use crate::error::{IngestError, Result, io_error};

/// Read a cohort registry written by the demographic stage.
///
/// The file is a JSON array of identifiers. Numbers are accepted and
/// stringified the same way identifier cells are, so `123` and `"123"`
/// name the same patient.
pub fn read_cohort(path: &Path) -> Result<CohortRegistry> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let values: Vec<Value> =
        serde_json::from_str(&content).map_err(|e| IngestError::CohortParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        let id = match value {
            Value::String(s) => s,
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.to_string(),
                (None, Some(f)) => format_numeric(f),
                (None, None) => n.to_string(),
            },
            other => {
                return Err(IngestError::CohortParse {
                    path: path.to_path_buf(),
                    reason: format!("unsupported identifier {other}"),
                });
            }
        };
        ids.push(id);
    }

    let registry = CohortRegistry::from_ids(ids);
    debug!(path = %path.display(), patients = registry.len(), "Read cohort registry");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("unique_ids.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_strings_and_numbers() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"["P1", 42, 7.0, "P1"]"#);
        let registry = read_cohort(&path).unwrap();
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["P1", "42", "7"]);
    }

    #[test]
    fn test_missing_registry() {
        let dir = TempDir::new().unwrap();
        let result = read_cohort(&dir.path().join("unique_ids.json"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_malformed_registry() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{"P1": true}"#);
        assert!(matches!(
            read_cohort(&path),
            Err(IngestError::CohortParse { .. })
        ));

        let path = write(&dir, r#"[null]"#);
        assert!(matches!(
            read_cohort(&path),
            Err(IngestError::CohortParse { .. })
        ));
    }
}
