//! Nationality reference table.
//!
//! Maps the free-text nationality recorded on a patient to a country, a
//! continent and a region. Lookups never fail: a nationality with no entry,
//! or an entry with an empty attribute, simply yields `None`.

use std::collections::HashMap;
use std::io::Cursor;

use serde::Deserialize;

use crate::embedded;
use crate::error::{Result, StandardsError};

const SOURCE_NAME: &str = "nationalities.csv";

/// Geography attached to one nationality string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nationality {
    pub country: Option<String>,
    pub continent: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NationalityCsvRow {
    nationality: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    continent: String,
    #[serde(default)]
    region: String,
}

/// Immutable nationality lookup.
#[derive(Debug, Clone, Default)]
pub struct NationalityTable {
    entries: HashMap<String, Nationality>,
}

impl NationalityTable {
    /// Load the table compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_csv_str(embedded::NATIONALITIES, SOURCE_NAME)
    }

    /// Parse a table from CSV text with a `nationality,country,continent,region` header.
    pub fn from_csv_str(content: &str, file: &str) -> Result<Self> {
        let cursor = Cursor::new(content.as_bytes());
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(cursor);

        let mut entries = HashMap::new();
        for result in reader.deserialize::<NationalityCsvRow>() {
            let row = result.map_err(|e| StandardsError::CsvParse {
                file: file.to_string(),
                message: e.to_string(),
            })?;
            if row.nationality.is_empty() {
                continue;
            }
            let entry = Nationality {
                country: non_empty(&row.country),
                continent: non_empty(&row.continent),
                region: non_empty(&row.region),
            };
            if entries.insert(row.nationality.clone(), entry).is_some() {
                return Err(StandardsError::DuplicateKey {
                    field: "nationality",
                    value: row.nationality,
                    file: file.to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Exact-match lookup on the recorded nationality string.
    pub fn lookup(&self, nationality: &str) -> Option<&Nationality> {
        self.entries.get(nationality)
    }

    pub fn country(&self, nationality: &str) -> Option<&str> {
        self.lookup(nationality)?.country.as_deref()
    }

    pub fn continent(&self, nationality: &str) -> Option<&str> {
        self.lookup(nationality)?.continent.as_deref()
    }

    pub fn region(&self, nationality: &str) -> Option<&str> {
        self.lookup(nationality)?.region.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_loads() {
        let table = NationalityTable::embedded().unwrap();
        assert!(table.len() > 150);
        assert_eq!(table.country("AMERICAN"), Some("United States"));
        assert_eq!(table.continent("AMERICAN"), Some("North America"));
        assert_eq!(table.region("AMERICAN"), Some("Northern America"));
    }

    #[test]
    fn unknown_nationality_is_none() {
        let table = NationalityTable::embedded().unwrap();
        assert!(table.lookup("MARTIAN").is_none());
        assert_eq!(table.country("MARTIAN"), None);
        assert_eq!(table.country("american"), None);
    }

    #[test]
    fn spellings_present_in_one_table_only() {
        let table = NationalityTable::embedded().unwrap();
        assert_eq!(
            table.country("VENEZUALAN"),
            Some("Venezuela, Bolivarian Republic of")
        );
        assert_eq!(table.continent("VENEZUALAN"), None);
        assert_eq!(table.country("VENEZUELAN"), None);
        assert_eq!(table.continent("VENEZUELAN"), Some("South America"));
    }

    #[test]
    fn quoted_values_keep_commas() {
        let table = NationalityTable::embedded().unwrap();
        assert_eq!(table.country("IRANIAN"), Some("Iran, Islamic Republic of"));
        assert_eq!(table.country("REUNION"), Some("Réunion"));
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let csv = "nationality,country,continent,region\nX,A,B,C\nX,D,E,F\n";
        let err = NationalityTable::from_csv_str(csv, "inline.csv").unwrap_err();
        assert!(matches!(err, StandardsError::DuplicateKey { .. }));
    }
}
