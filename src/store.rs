//! Curated-dataset boundary.
//!
//! The store supplies the names of roads already curated and accepts approved
//! records one at a time. Schema and persistence details live behind the
//! trait.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::candidate::ImportRecord;
use crate::error::{ImportError, Result};

/// Read and write access to the curated road dataset.
pub trait RoadStore {
    /// Names of every road already in the dataset, as stored.
    fn existing_road_names(&self) -> Result<Vec<String>>;

    /// Insert one approved road.
    fn insert_road(&mut self, record: &ImportRecord) -> Result<()>;
}

/// A record the store refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub name: String,
    pub message: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkImportReport {
    pub inserted: usize,
    pub failures: Vec<ImportFailure>,
}

impl BulkImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Insert every record, collecting per-record failures instead of stopping.
///
/// An empty record list is rejected with `NothingToImport`.
pub fn bulk_import(
    store: &mut dyn RoadStore,
    records: &[ImportRecord],
) -> Result<BulkImportReport> {
    if records.is_empty() {
        return Err(ImportError::NothingToImport);
    }

    let mut report = BulkImportReport::default();
    for record in records {
        match store.insert_road(record) {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                warn!("[BulkImport] Failed to insert '{}': {}", record.name, e);
                report.failures.push(ImportFailure {
                    name: record.name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        "[BulkImport] {}/{} roads inserted",
        report.inserted,
        records.len()
    );

    Ok(report)
}

/// Store held entirely in memory.
///
/// Rejects records whose normalized name is already present, mirroring a
/// unique-name constraint.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoadStore {
    names: Vec<String>,
    records: Vec<ImportRecord>,
}

impl InMemoryRoadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with names of already-curated roads.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    /// Records inserted through [`RoadStore::insert_road`].
    pub fn records(&self) -> &[ImportRecord] {
        &self.records
    }
}

impl RoadStore for InMemoryRoadStore {
    fn existing_road_names(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn insert_road(&mut self, record: &ImportRecord) -> Result<()> {
        let key = crate::filter::normalize_name(&record.name);
        if key.is_empty() {
            return Err(ImportError::Store {
                message: "road name is empty".to_string(),
            });
        }
        if self
            .names
            .iter()
            .any(|n| crate::filter::normalize_name(n) == key)
        {
            return Err(ImportError::Store {
                message: format!("road '{}' already exists", record.name),
            });
        }
        self.names.push(record.name.clone());
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ImportRecord {
        ImportRecord {
            name: name.to_string(),
            description: "No detail information".to_string(),
            latitude: 35.0,
            longitude: 139.0,
            route: None,
        }
    }

    #[test]
    fn test_empty_import_rejected() {
        let mut store = InMemoryRoadStore::new();
        let result = bulk_import(&mut store, &[]);
        assert!(matches!(result, Err(ImportError::NothingToImport)));
    }

    #[test]
    fn test_failures_are_collected() {
        let mut store = InMemoryRoadStore::with_names(["Existing Road"]);
        let report = bulk_import(
            &mut store,
            &[record("New Road"), record(" existing road"), record("")],
        )
        .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].name, " existing road");
        assert!(!report.is_clean());
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.existing_road_names().unwrap().len(), 2);
    }
}
