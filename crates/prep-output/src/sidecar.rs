//! JSON side products written next to the stage outputs.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use prep_model::CohortRegistry;

use crate::common::create_file;
use crate::error::{OutputError, Result};

/// Persist the cohort registry as a JSON array of identifiers.
pub fn write_cohort(registry: &CohortRegistry, path: &Path) -> Result<()> {
    write_json(path, registry.as_slice())?;
    debug!(path = %path.display(), patients = registry.len(), "Wrote cohort registry");
    Ok(())
}

/// Persist the diagnosis code → description catalog as a JSON object sorted by code.
pub fn write_code_catalog(catalog: &BTreeMap<String, String>, path: &Path) -> Result<()> {
    write_json(path, catalog)?;
    debug!(path = %path.display(), codes = catalog.len(), "Wrote code catalog");
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut file = create_file(path)?;
    serde_json::to_writer(&mut file, value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    file.flush().map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cohort_is_json_array_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed/unique_ids.json");
        write_cohort(&CohortRegistry::from_ids(["P2", "P1"]), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["P2","P1"]"#);
    }

    #[test]
    fn test_catalog_sorted_by_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icdcodes.json");
        let catalog = BTreeMap::from([
            ("B20".to_string(), "Bar".to_string()),
            ("A01".to_string(), "Foo".to_string()),
        ]);
        write_code_catalog(&catalog, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"A01":"Foo","B20":"Bar"}"#
        );
    }
}
