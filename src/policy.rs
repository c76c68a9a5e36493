//! The stateless algorithm adapter ("policy") protocol.
//!
//! A [`Policy`] is the hosting-facing face of an optimization algorithm.
//! The hosting environment instantiates one per study, injecting a
//! [`DatastoreClient`](crate::datastore::DatastoreClient) at construction,
//! and may discard the instance after every call: a policy must never depend
//! on in-memory state from a previous call beyond what it can rederive from
//! the datastore. Crash-and-restart can leave two short-lived instances
//! serving the same study, which is safe exactly because all cross-instance
//! state flows through persisted trial history and metadata.

use crate::designers::random::sample_assignment;
use crate::error::Result;
use crate::study::StudyConfig;
use crate::trial::{Metadata, TrialSuggestion};

/// One suggestion round's input.
#[derive(Clone, Debug)]
pub struct SuggestRequest {
    /// Maximum number of suggestions wanted.
    pub count: usize,
    /// The immutable study specification.
    pub study_config: StudyConfig,
}

/// One suggestion round's output.
#[derive(Clone, Debug, Default)]
pub struct SuggestDecision {
    /// At most `count` new trial suggestions; fewer if the algorithm is
    /// exhausted or infeasible-space-constrained.
    pub suggestions: Vec<TrialSuggestion>,
    /// An opaque study-level metadata delta for the host to persist.
    pub metadata_delta: Metadata,
}

/// One early-stopping round's input.
#[derive(Clone, Debug)]
pub struct EarlyStopRequest {
    /// The immutable study specification.
    pub study_config: StudyConfig,
    /// Identifiers of the trials currently in flight.
    pub active_trial_ids: Vec<u64>,
}

/// A per-trial early-stopping verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EarlyStopDecision {
    /// The trial the verdict applies to.
    pub trial_id: u64,
    /// Whether the trial should transition to STOPPED.
    pub should_stop: bool,
    /// Optional human-readable justification.
    pub reason: Option<String>,
}

impl EarlyStopDecision {
    /// A verdict to stop the trial.
    #[must_use]
    pub fn stop(trial_id: u64, reason: impl Into<String>) -> Self {
        Self {
            trial_id,
            should_stop: true,
            reason: Some(reason.into()),
        }
    }

    /// An explicit verdict to keep the trial running.
    #[must_use]
    pub fn keep(trial_id: u64) -> Self {
        Self {
            trial_id,
            should_stop: false,
            reason: None,
        }
    }
}

/// The stateless suggest/early-stop contract every hosted algorithm honors.
///
/// Errors follow a strict taxonomy: a malformed or empty study specification
/// surfaces a configuration error before any algorithm logic runs; transient
/// datastore failures surface as [`Error::Retryable`](crate::Error) and are
/// propagated unchanged — the policy performs no retries of its own, which
/// keeps reconstruction idempotent.
pub trait Policy: Send {
    /// Proposes up to `request.count` new trials for the study.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed study specification or
    /// a retryable error when fetching trial history transiently fails.
    fn suggest(&mut self, request: &SuggestRequest) -> Result<SuggestDecision>;

    /// Returns stop verdicts for a subset (possibly empty) of the currently
    /// active trials.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Policy::suggest`].
    fn early_stop(&mut self, request: &EarlyStopRequest) -> Result<Vec<EarlyStopDecision>>;

    /// Whether the hosting environment may keep this instance warm across
    /// calls. Purely a hint about reconstruction *cost* — every policy must
    /// remain correct with caching off, reconstructed from scratch before
    /// each call.
    fn should_be_cached(&self) -> bool {
        false
    }
}

/// A uniform random policy with no state to recover.
///
/// Suggestion content never depends on trial history, so it needs no
/// datastore client at all; it exists as the simplest direct (non-bridged)
/// policy and as a load-generating baseline. It deliberately trades the
/// cross-instance determinism property for stream variety: a fresh
/// entropy-seeded instance emits a fresh stream. Hosts that need
/// reproducible suggestions use [`RandomPolicy::with_seed`], or bridge a
/// [`RandomDesigner`](crate::designers::RandomDesigner), whose default seed
/// is derived from the study configuration.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    /// Creates a random policy with a fresh entropy seed. See the type-level
    /// note on determinism.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a random policy with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn suggest(&mut self, request: &SuggestRequest) -> Result<SuggestDecision> {
        request.study_config.validate()?;
        let suggestions = (0..request.count)
            .map(|_| {
                TrialSuggestion::new(sample_assignment(
                    request.study_config.search_space(),
                    &mut self.rng,
                ))
            })
            .collect();
        Ok(SuggestDecision {
            suggestions,
            metadata_delta: Metadata::new(),
        })
    }

    fn early_stop(&mut self, request: &EarlyStopRequest) -> Result<Vec<EarlyStopDecision>> {
        request.study_config.validate()?;
        // Random search has no opinion on partial results.
        Ok(Vec::new())
    }
}
