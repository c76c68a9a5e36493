//! Trial records, measurements, and metadata.
//!
//! A [`Trial`] is one proposed-and-possibly-evaluated point. Identifiers are
//! assigned by the datastore, never by an algorithm, and status transitions
//! are written by the datastore alone: algorithms read trial history and emit
//! [`TrialSuggestion`]s or stop decisions, they never mutate existing
//! records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::Assignment;

/// The lifecycle status of a trial.
///
/// `Completed` and `Stopped` are terminal; a record observed in either state
/// must be treated as immutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStatus {
    /// Suggested and in flight; no evaluation result yet.
    Active,
    /// An evaluation result (measurement or infeasibility) was recorded.
    Completed,
    /// An early-stop decision was recorded before completion.
    Stopped,
}

impl TrialStatus {
    /// Returns `true` for the terminal statuses.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TrialStatus::Completed | TrialStatus::Stopped)
    }
}

/// The evaluation result of a trial: metric name to real value, plus
/// bookkeeping about the evaluation itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Metric values keyed by metric name.
    pub metrics: BTreeMap<String, f64>,
    /// Wall-clock seconds the evaluation took.
    pub elapsed_secs: f64,
    /// Training steps (or equivalent progress marker) at measurement time.
    pub steps: u64,
}

impl Measurement {
    /// Creates an empty measurement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metric value.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Returns the value of the named metric, if present.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Opaque key-value annotations persisted alongside trials and studies.
///
/// Values are byte blobs: algorithms store whatever bookkeeping they need
/// (serialized optimizer state included) and the core never interprets it.
/// Keys are namespaced with [`Metadata::namespaced`] to keep independent
/// writers from colliding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Metadata {
    /// Creates an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a namespaced key.
    #[must_use]
    pub fn namespaced(ns: &str, key: &str) -> String {
        format!("{ns}:{key}")
    }

    /// Inserts a value, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the raw bytes stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns the value under `key` as UTF-8, if it is valid UTF-8.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| core::str::from_utf8(v).ok())
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds `delta` into this map; later writers win per key.
    pub fn merge(&mut self, delta: &Metadata) {
        for (key, value) in &delta.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// One proposed-and-possibly-evaluated point in a study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    id: u64,
    parameters: Assignment,
    status: TrialStatus,
    final_measurement: Option<Measurement>,
    infeasibility_reason: Option<String>,
    stopping_reason: Option<String>,
    metadata: Metadata,
}

impl Trial {
    /// Creates an ACTIVE trial with a datastore-assigned identifier.
    ///
    /// Intended for datastore implementations; algorithms produce
    /// [`TrialSuggestion`]s and never mint identifiers.
    #[must_use]
    pub fn new(id: u64, parameters: Assignment) -> Self {
        Self {
            id,
            parameters,
            status: TrialStatus::Active,
            final_measurement: None,
            infeasibility_reason: None,
            stopping_reason: None,
            metadata: Metadata::new(),
        }
    }

    /// Returns the datastore-assigned identifier, unique and monotonically
    /// increasing within a study.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the parameter assignment.
    #[must_use]
    pub fn parameters(&self) -> &Assignment {
        &self.parameters
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn status(&self) -> TrialStatus {
        self.status
    }

    /// Returns the recorded evaluation result, if the trial completed with
    /// one.
    #[must_use]
    pub fn final_measurement(&self) -> Option<&Measurement> {
        self.final_measurement.as_ref()
    }

    /// Returns the infeasibility reason, if the trial completed infeasible.
    #[must_use]
    pub fn infeasibility_reason(&self) -> Option<&str> {
        self.infeasibility_reason.as_deref()
    }

    /// Returns the reason attached to an early-stop decision, if any.
    #[must_use]
    pub fn stopping_reason(&self) -> Option<&str> {
        self.stopping_reason.as_deref()
    }

    /// Returns the trial's metadata annotations.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access to the metadata, for datastore-side delta application.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Returns `true` if the trial reached COMPLETED.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TrialStatus::Completed
    }

    /// Returns `true` if the trial carries a valid objective: completed and
    /// not excluded by an infeasibility reason.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.is_completed() && self.infeasibility_reason.is_none()
    }

    /// Transitions to COMPLETED with an evaluation result.
    ///
    /// Intended for datastore implementations, the sole writers of status.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial is already terminal.
    pub fn complete(&mut self, measurement: Measurement) -> Result<()> {
        self.check_not_terminal()?;
        self.final_measurement = Some(measurement);
        self.status = TrialStatus::Completed;
        Ok(())
    }

    /// Transitions to COMPLETED as infeasible: no measurement is recorded
    /// and the trial is excluded from valid-objective consideration.
    ///
    /// Infeasibility is a first-class terminal state, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial is already terminal.
    pub fn complete_infeasible(&mut self, reason: impl Into<String>) -> Result<()> {
        self.check_not_terminal()?;
        self.infeasibility_reason = Some(reason.into());
        self.status = TrialStatus::Completed;
        Ok(())
    }

    /// Transitions to STOPPED following an early-stop decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial is already terminal.
    pub fn stop(&mut self, reason: Option<String>) -> Result<()> {
        self.check_not_terminal()?;
        self.stopping_reason = reason;
        self.status = TrialStatus::Stopped;
        Ok(())
    }

    fn check_not_terminal(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::TrialAlreadyTerminal { trial_id: self.id });
        }
        Ok(())
    }
}

/// A freshly suggested trial: a parameter assignment plus algorithm
/// metadata, with no identifier yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSuggestion {
    /// The proposed parameter assignment.
    pub parameters: Assignment,
    /// Algorithm bookkeeping to persist with the trial.
    pub metadata: Metadata,
}

impl TrialSuggestion {
    /// Creates a suggestion from a parameter assignment.
    #[must_use]
    pub fn new(parameters: Assignment) -> Self {
        Self {
            parameters,
            metadata: Metadata::new(),
        }
    }

    /// Stamps a datastore-assigned identifier onto the suggestion,
    /// producing an ACTIVE trial record.
    #[must_use]
    pub fn into_trial(self, id: u64) -> Trial {
        let mut trial = Trial::new(id, self.parameters);
        trial.metadata = self.metadata;
        trial
    }
}
