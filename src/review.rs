//! Human review of import candidates.
//!
//! Each candidate starts out pending and can be approved, skipped or edited.
//! Candidates flagged for review (a jump longer than the anomaly threshold)
//! are only approved after an explicit confirmation; this is the one place
//! the anomaly flag changes behaviour.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::candidate::{ImportCandidate, ImportRecord};
use crate::error::{OptionExt, Result};
use crate::store::{bulk_import, BulkImportReport, RoadStore};

/// Review state of one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Skipped,
}

/// Result of asking to approve a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Approval {
    Approved,
    /// Not approved yet; call [`ReviewSession::confirm_approve`] to proceed
    ConfirmationRequired {
        #[serde(rename = "maxSegmentMeters")]
        max_segment_meters: i64,
    },
}

/// A candidate with its review state and edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub candidate: ImportCandidate,
    pub status: ReviewStatus,
    pub edited_name: Option<String>,
    pub edited_description: Option<String>,
}

impl ReviewEntry {
    fn new(candidate: ImportCandidate) -> Self {
        Self {
            candidate,
            status: ReviewStatus::Pending,
            edited_name: None,
            edited_description: None,
        }
    }

    /// Name that will be imported.
    pub fn effective_name(&self) -> &str {
        self.edited_name
            .as_deref()
            .unwrap_or(&self.candidate.display_name)
    }

    /// Description that will be imported.
    pub fn effective_description(&self) -> &str {
        self.edited_description
            .as_deref()
            .unwrap_or(&self.candidate.description_text)
    }

    pub fn to_record(&self) -> ImportRecord {
        self.candidate
            .to_record(Some(self.effective_name()), Some(self.effective_description()))
    }
}

/// Review state for one batch of candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    entries: Vec<ReviewEntry>,
}

impl ReviewSession {
    pub fn new(candidates: Vec<ImportCandidate>) -> Self {
        Self {
            entries: candidates.into_iter().map(ReviewEntry::new).collect(),
        }
    }

    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ReviewEntry> {
        self.entries.iter().find(|e| e.candidate.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut ReviewEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.candidate.id == id)
            .ok_or_unknown_candidate(id)
    }

    /// Approve a candidate, unless it is flagged for review.
    ///
    /// Flagged candidates keep their current status and report
    /// `ConfirmationRequired`.
    pub fn approve(&mut self, id: &str) -> Result<Approval> {
        let entry = self.entry_mut(id)?;
        if entry.candidate.requires_review() {
            debug!(
                "[Review] '{}' needs confirmation (max jump {} m)",
                entry.effective_name(),
                entry.candidate.metrics.rounded_max_segment_meters()
            );
            return Ok(Approval::ConfirmationRequired {
                max_segment_meters: entry.candidate.metrics.rounded_max_segment_meters(),
            });
        }
        entry.status = ReviewStatus::Approved;
        Ok(Approval::Approved)
    }

    /// Approve a candidate after the reviewer confirmed a flagged route.
    pub fn confirm_approve(&mut self, id: &str) -> Result<()> {
        self.entry_mut(id)?.status = ReviewStatus::Approved;
        Ok(())
    }

    pub fn skip(&mut self, id: &str) -> Result<()> {
        self.entry_mut(id)?.status = ReviewStatus::Skipped;
        Ok(())
    }

    /// Return a candidate to pending.
    pub fn reset(&mut self, id: &str) -> Result<()> {
        self.entry_mut(id)?.status = ReviewStatus::Pending;
        Ok(())
    }

    /// Store name/description overrides, then approve through the same gate
    /// as [`ReviewSession::approve`].
    pub fn save_edit(&mut self, id: &str, name: &str, description: &str) -> Result<Approval> {
        let entry = self.entry_mut(id)?;
        entry.edited_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        entry.edited_description = Some(description.to_string()).filter(|d| !d.is_empty());
        self.approve(id)
    }

    pub fn approved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == ReviewStatus::Approved)
            .count()
    }

    /// Bulk-insert records for every approved candidate, in candidate order.
    pub fn approved_records(&self) -> Vec<ImportRecord> {
        self.entries
            .iter()
            .filter(|e| e.status == ReviewStatus::Approved)
            .map(ReviewEntry::to_record)
            .collect()
    }

    /// Submit approved candidates to the store.
    pub fn submit(&self, store: &mut dyn RoadStore) -> Result<BulkImportReport> {
        bulk_import(store, &self.approved_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RouteMetrics;
    use crate::store::InMemoryRoadStore;
    use crate::{Coordinate, ImportError};
    use std::collections::BTreeMap;

    fn candidate(id: &str, flagged: bool) -> ImportCandidate {
        ImportCandidate {
            id: id.to_string(),
            display_name: format!("Road {}", id),
            description_text: "Surface: dirt".to_string(),
            anchor_latitude: 35.0,
            anchor_longitude: 139.0,
            route: Some(vec![Coordinate::new(35.0, 139.0), Coordinate::new(35.01, 139.0)]),
            metrics: RouteMetrics {
                total_distance_meters: 1112.0,
                max_segment_meters: if flagged { 1112.0 } else { 90.0 },
                has_anomalous_segment: flagged,
            },
            tags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_plain_candidate_approves_directly() {
        let mut session = ReviewSession::new(vec![candidate("1", false)]);
        assert_eq!(session.approve("1").unwrap(), Approval::Approved);
        assert_eq!(session.get("1").unwrap().status, ReviewStatus::Approved);
    }

    #[test]
    fn test_flagged_candidate_needs_confirmation() {
        let mut session = ReviewSession::new(vec![candidate("1", true)]);
        assert_eq!(
            session.approve("1").unwrap(),
            Approval::ConfirmationRequired {
                max_segment_meters: 1112
            }
        );
        assert_eq!(session.get("1").unwrap().status, ReviewStatus::Pending);
        assert_eq!(session.approved_count(), 0);

        session.confirm_approve("1").unwrap();
        assert_eq!(session.approved_count(), 1);
    }

    #[test]
    fn test_edit_overrides_record() {
        let mut session = ReviewSession::new(vec![candidate("1", false), candidate("2", false)]);
        let outcome = session.save_edit("2", " Renamed Road ", "Gravel, narrow").unwrap();
        assert_eq!(outcome, Approval::Approved);

        let records = session.approved_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Renamed Road");
        assert_eq!(records[0].description, "Gravel, narrow");
        assert!(records[0].has_geometry());
    }

    #[test]
    fn test_blank_edit_falls_back_to_candidate() {
        let mut session = ReviewSession::new(vec![candidate("1", false)]);
        session.save_edit("1", "  ", "").unwrap();
        let record = &session.approved_records()[0];
        assert_eq!(record.name, "Road 1");
        assert_eq!(record.description, "Surface: dirt");
    }

    #[test]
    fn test_review_json_is_camel_case() {
        let mut session = ReviewSession::new(vec![candidate("1", true)]);
        let outcome = session.approve("1").unwrap();
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["outcome"], "confirmationRequired");
        assert_eq!(json["maxSegmentMeters"], 1112);

        session.save_edit("1", "Renamed", "").unwrap();
        let entry = serde_json::to_value(session.get("1").unwrap()).unwrap();
        assert_eq!(entry["editedName"], "Renamed");
        assert_eq!(entry["status"], "pending");
    }

    #[test]
    fn test_skip_and_reset() {
        let mut session = ReviewSession::new(vec![candidate("1", false)]);
        session.approve("1").unwrap();
        session.skip("1").unwrap();
        assert_eq!(session.approved_count(), 0);
        session.reset("1").unwrap();
        assert_eq!(session.get("1").unwrap().status, ReviewStatus::Pending);
    }

    #[test]
    fn test_unknown_candidate() {
        let mut session = ReviewSession::new(vec![]);
        assert!(matches!(
            session.approve("nope"),
            Err(ImportError::UnknownCandidate { .. })
        ));
    }

    #[test]
    fn test_submit() {
        let mut session = ReviewSession::new(vec![candidate("1", false), candidate("2", true)]);
        let mut store = InMemoryRoadStore::new();
        assert!(matches!(
            session.submit(&mut store),
            Err(ImportError::NothingToImport)
        ));

        session.approve("1").unwrap();
        session.approve("2").unwrap();
        let report = session.submit(&mut store).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(store.records()[0].name, "Road 1");
    }
}
