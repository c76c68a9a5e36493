//! Datastore client capability and an in-memory reference implementation.
//!
//! The [`DatastoreClient`] trait is the injected capability adapters use to
//! read trial history. The datastore — not the core — assigns identifiers
//! and serializes status transitions; adapters only read. Two consecutive
//! fetches carry no snapshot guarantee: the second may return a superset of
//! the first, and callers must tolerate that.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::trial::{Measurement, Metadata, Trial, TrialStatus, TrialSuggestion};

/// A status predicate for trial fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every trial regardless of status.
    All,
    /// ACTIVE trials only.
    Active,
    /// COMPLETED trials only (feasible and infeasible alike).
    Completed,
    /// STOPPED trials only.
    Stopped,
}

impl StatusFilter {
    /// Returns `true` if a trial with `status` passes this filter.
    #[must_use]
    pub fn matches(self, status: TrialStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == TrialStatus::Active,
            StatusFilter::Completed => status == TrialStatus::Completed,
            StatusFilter::Stopped => status == TrialStatus::Stopped,
        }
    }
}

/// The injected capability for reading persisted trial history.
///
/// Implementations may block on network or storage I/O; the core applies no
/// internal timeout and performs zero retries — transient failures surface
/// as [`Error::Retryable`] and retry policy belongs to the hosting
/// environment.
pub trait DatastoreClient: Send + Sync {
    /// Fetches the trials of a study that pass `filter`, in ascending
    /// identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Retryable`] on transient failure.
    fn fetch_trials(&self, study_id: &str, filter: StatusFilter) -> Result<Vec<Trial>>;

    /// Reads back the study-level metadata, including any optimizer-state
    /// blobs persisted from earlier suggestion rounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Retryable`] on transient failure.
    fn fetch_study_metadata(&self, study_id: &str) -> Result<Metadata>;
}

#[derive(Default)]
struct StudyRecord {
    trials: Vec<Trial>,
    next_id: u64,
    metadata: Metadata,
}

impl StudyRecord {
    fn trial_mut(&mut self, study_id: &str, trial_id: u64) -> Result<&mut Trial> {
        self.trials
            .iter_mut()
            .find(|t| t.id() == trial_id)
            .ok_or_else(|| Error::UnknownTrial {
                study_id: study_id.to_string(),
                trial_id,
            })
    }
}

/// An in-memory datastore, the reference implementation of
/// [`DatastoreClient`] used in tests and single-process hosting.
///
/// It is the sole writer of identifiers (dense, starting at 1 per study) and
/// status transitions; terminal records are immutable.
#[derive(Default)]
pub struct InMemoryDatastore {
    studies: RwLock<HashMap<String, StudyRecord>>,
}

impl InMemoryDatastore {
    /// Creates an empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty datastore behind an `Arc`, ready for injection.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Persists suggestions as ACTIVE trials, assigning each a fresh
    /// identifier. Returns the assigned identifiers in suggestion order.
    pub fn register(&self, study_id: &str, suggestions: Vec<TrialSuggestion>) -> Vec<u64> {
        let mut studies = self.studies.write();
        let record = studies.entry(study_id.to_string()).or_default();
        let mut ids = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            record.next_id += 1;
            let id = record.next_id;
            record.trials.push(suggestion.into_trial(id));
            ids.push(id);
        }
        ids
    }

    /// Records an evaluation result, transitioning the trial to COMPLETED.
    ///
    /// # Errors
    ///
    /// Returns an error if the study or trial is unknown, or the trial is
    /// already terminal.
    pub fn complete_trial(
        &self,
        study_id: &str,
        trial_id: u64,
        measurement: Measurement,
    ) -> Result<()> {
        self.with_trial(study_id, trial_id, |trial| trial.complete(measurement))
    }

    /// Records an infeasible outcome: COMPLETED with a reason and no
    /// measurement.
    ///
    /// # Errors
    ///
    /// Returns an error if the study or trial is unknown, or the trial is
    /// already terminal.
    pub fn complete_infeasible(
        &self,
        study_id: &str,
        trial_id: u64,
        reason: impl Into<String>,
    ) -> Result<()> {
        let reason = reason.into();
        self.with_trial(study_id, trial_id, |trial| trial.complete_infeasible(reason))
    }

    /// Records an early-stop decision, transitioning the trial to STOPPED.
    ///
    /// # Errors
    ///
    /// Returns an error if the study or trial is unknown, or the trial is
    /// already terminal.
    pub fn stop_trial(&self, study_id: &str, trial_id: u64, reason: Option<String>) -> Result<()> {
        self.with_trial(study_id, trial_id, |trial| trial.stop(reason))
    }

    /// Folds a metadata delta into one trial's annotations.
    ///
    /// # Errors
    ///
    /// Returns an error if the study or trial is unknown, or the trial is
    /// already terminal. Terminal records are immutable, annotations
    /// included.
    pub fn apply_trial_metadata(
        &self,
        study_id: &str,
        trial_id: u64,
        delta: &Metadata,
    ) -> Result<()> {
        self.with_trial(study_id, trial_id, |trial| {
            if trial.status().is_terminal() {
                return Err(Error::TrialAlreadyTerminal { trial_id });
            }
            trial.metadata_mut().merge(delta);
            Ok(())
        })
    }

    /// Folds a metadata delta into the study-level metadata.
    pub fn apply_study_metadata(&self, study_id: &str, delta: &Metadata) {
        let mut studies = self.studies.write();
        let record = studies.entry(study_id.to_string()).or_default();
        record.metadata.merge(delta);
    }

    fn with_trial<F>(&self, study_id: &str, trial_id: u64, f: F) -> Result<()>
    where
        F: FnOnce(&mut Trial) -> Result<()>,
    {
        let mut studies = self.studies.write();
        let record = studies
            .get_mut(study_id)
            .ok_or_else(|| Error::UnknownStudy {
                study_id: study_id.to_string(),
            })?;
        f(record.trial_mut(study_id, trial_id)?)
    }
}

impl DatastoreClient for InMemoryDatastore {
    fn fetch_trials(&self, study_id: &str, filter: StatusFilter) -> Result<Vec<Trial>> {
        let studies = self.studies.read();
        // Unknown study reads as empty history: a fresh study simply has no
        // trials yet.
        let Some(record) = studies.get(study_id) else {
            return Ok(Vec::new());
        };
        // The buffer is append-only with ascending ids, so insertion order
        // is already identifier order.
        Ok(record
            .trials
            .iter()
            .filter(|t| filter.matches(t.status()))
            .cloned()
            .collect())
    }

    fn fetch_study_metadata(&self, study_id: &str) -> Result<Metadata> {
        let studies = self.studies.read();
        Ok(studies
            .get(study_id)
            .map(|record| record.metadata.clone())
            .unwrap_or_default())
    }
}
