//! Bridges the designer protocol into the policy protocol.
//!
//! Every [`Designer`] author gets a hosting-ready [`Policy`] for free. On
//! each `suggest` call the bridge fetches the study's COMPLETED trials and
//! either rebuilds the designer from scratch, replaying the entire history
//! ([`DesignerPolicy`]), or restores a persisted checkpoint and replays only
//! the trials observed since it ([`CheckpointingDesignerPolicy`]). Replay is
//! a pure fold over the history in ascending identifier order — the
//! load-bearing property that makes destroy-and-recreate safe.

use std::sync::Arc;

use crate::datastore::{DatastoreClient, StatusFilter};
use crate::designer::{Designer, SerializableDesigner};
use crate::error::Result;
use crate::policy::{EarlyStopDecision, EarlyStopRequest, Policy, SuggestDecision, SuggestRequest};
use crate::study::StudyConfig;
use crate::trial::{Metadata, Trial};

/// Namespace for the bridge's persisted keys in study metadata.
const CHECKPOINT_NS: &str = "delphi.checkpoint";

/// A factory producing a fresh designer from the study specification.
pub type DesignerFactory<D> = Arc<dyn Fn(&StudyConfig) -> Result<D> + Send + Sync>;

/// Fetch the COMPLETED history once, then normalize it for replay: ascending
/// identifier order with duplicates dropped. The datastore promises no
/// stable snapshot, so at-least-once and reordered delivery are tolerated
/// here rather than assumed away.
fn completed_history(client: &dyn DatastoreClient, study_id: &str) -> Result<Vec<Trial>> {
    let mut trials = client.fetch_trials(study_id, StatusFilter::Completed)?;
    trials.sort_by_key(Trial::id);
    trials.dedup_by_key(|t| t.id());
    Ok(trials)
}

/// Wraps a [`Designer`] in full-reconstruction mode: every `suggest` builds
/// a fresh instance and replays the whole COMPLETED history through one
/// `update` call.
///
/// ```
/// use std::sync::Arc;
///
/// use delphi::bridge::DesignerPolicy;
/// use delphi::datastore::InMemoryDatastore;
/// use delphi::designers::CyclingDesigner;
///
/// let datastore = InMemoryDatastore::shared();
/// let policy = DesignerPolicy::new(
///     datastore,
///     "my-study",
///     Arc::new(CyclingDesigner::new),
/// );
/// ```
pub struct DesignerPolicy<D: Designer> {
    client: Arc<dyn DatastoreClient>,
    study_id: String,
    factory: DesignerFactory<D>,
}

impl<D: Designer> DesignerPolicy<D> {
    /// Creates a bridge policy for one study.
    #[must_use]
    pub fn new(
        client: Arc<dyn DatastoreClient>,
        study_id: impl Into<String>,
        factory: DesignerFactory<D>,
    ) -> Self {
        Self {
            client,
            study_id: study_id.into(),
            factory,
        }
    }

    fn reconstruct(&self, config: &StudyConfig, history: &[Trial]) -> Result<D> {
        let mut designer = (self.factory)(config)?;
        tracing::debug!(
            study = %self.study_id,
            trials = history.len(),
            "reconstructing designer from full completed history"
        );
        designer.update(history);
        Ok(designer)
    }
}

impl<D: Designer> Policy for DesignerPolicy<D> {
    fn suggest(&mut self, request: &SuggestRequest) -> Result<SuggestDecision> {
        request.study_config.validate()?;
        let history = completed_history(self.client.as_ref(), &self.study_id)?;
        let mut designer = self.reconstruct(&request.study_config, &history)?;
        let suggestions = designer.suggest(request.count);
        tracing::debug!(
            study = %self.study_id,
            requested = request.count,
            produced = suggestions.len(),
            "suggestion round complete"
        );
        Ok(SuggestDecision {
            suggestions,
            metadata_delta: Metadata::new(),
        })
    }

    /// No generic early-stopping rule exists for an arbitrary designer;
    /// this bridge declines to stop anything. Implement [`Policy`] directly
    /// for domain-specific stopping rules.
    fn early_stop(&mut self, request: &EarlyStopRequest) -> Result<Vec<EarlyStopDecision>> {
        request.study_config.validate()?;
        Ok(Vec::new())
    }
}

/// Wraps a [`SerializableDesigner`] in incremental mode: the designer's
/// encoded state rides in the suggest decision's metadata delta, and the
/// next call restores it and replays only the COMPLETED trials newer than
/// the checkpoint's high-water mark.
///
/// Amortizes replay cost when the encoded state is small relative to the
/// trial history. Behavior is equivalent to full reconstruction by
/// contract; an undecodable or missing checkpoint falls back to it.
pub struct CheckpointingDesignerPolicy<D: SerializableDesigner> {
    inner: DesignerPolicy<D>,
}

impl<D: SerializableDesigner> CheckpointingDesignerPolicy<D> {
    /// Creates an incremental bridge policy for one study.
    #[must_use]
    pub fn new(
        client: Arc<dyn DatastoreClient>,
        study_id: impl Into<String>,
        factory: DesignerFactory<D>,
    ) -> Self {
        Self {
            inner: DesignerPolicy::new(client, study_id, factory),
        }
    }

    fn state_key() -> String {
        Metadata::namespaced(CHECKPOINT_NS, "state")
    }

    fn mark_key() -> String {
        Metadata::namespaced(CHECKPOINT_NS, "last_trial_id")
    }

    /// Restores the checkpointed designer and replays the delta, or falls
    /// back to full reconstruction when no usable checkpoint exists.
    fn restore_or_reconstruct(
        &self,
        config: &StudyConfig,
        history: &[Trial],
        metadata: &Metadata,
    ) -> Result<D> {
        let checkpoint = metadata.get(&Self::state_key());
        let mark = metadata
            .get_str(&Self::mark_key())
            .and_then(|s| s.parse::<u64>().ok());
        if let (Some(blob), Some(mark)) = (checkpoint, mark) {
            match D::load(config, blob) {
                Ok(mut designer) => {
                    let delta: Vec<Trial> = history
                        .iter()
                        .filter(|t| t.id() > mark)
                        .cloned()
                        .collect();
                    tracing::debug!(
                        study = %self.inner.study_id,
                        mark,
                        delta = delta.len(),
                        "restored designer checkpoint"
                    );
                    designer.update(&delta);
                    return Ok(designer);
                }
                Err(err) => {
                    tracing::warn!(
                        study = %self.inner.study_id,
                        error = %err,
                        "designer checkpoint unusable, replaying full history"
                    );
                }
            }
        }
        self.inner.reconstruct(config, history)
    }
}

impl<D: SerializableDesigner> Policy for CheckpointingDesignerPolicy<D> {
    fn suggest(&mut self, request: &SuggestRequest) -> Result<SuggestDecision> {
        request.study_config.validate()?;
        let history = completed_history(self.inner.client.as_ref(), &self.inner.study_id)?;
        let metadata = self
            .inner
            .client
            .fetch_study_metadata(&self.inner.study_id)?;
        let mut designer =
            self.restore_or_reconstruct(&request.study_config, &history, &metadata)?;

        let suggestions = designer.suggest(request.count);

        // Everything up to the newest completed trial is now folded into the
        // encoded state.
        let mark = history.last().map_or(0, Trial::id);
        let mut metadata_delta = Metadata::new();
        metadata_delta.insert(Self::state_key(), designer.dump()?);
        metadata_delta.insert(Self::mark_key(), mark.to_string());
        Ok(SuggestDecision {
            suggestions,
            metadata_delta,
        })
    }

    fn early_stop(&mut self, request: &EarlyStopRequest) -> Result<Vec<EarlyStopDecision>> {
        self.inner.early_stop(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::InMemoryDatastore;
    use crate::designers::CyclingDesigner;
    use crate::error::Error;
    use crate::space::SearchSpace;
    use crate::study::{Goal, MetricInformation};
    use crate::trial::Measurement;

    fn int_config() -> StudyConfig {
        let mut space = SearchSpace::new();
        space.select_root().add_int_param("x", 1, 10).unwrap();
        StudyConfig::new(space).with_metric(MetricInformation::new("loss", Goal::Minimize))
    }

    fn cycling_factory() -> DesignerFactory<CyclingDesigner> {
        Arc::new(CyclingDesigner::new)
    }

    fn run_and_complete(
        datastore: &Arc<InMemoryDatastore>,
        policy: &mut dyn Policy,
        config: &StudyConfig,
        count: usize,
    ) -> Vec<i64> {
        let decision = policy
            .suggest(&SuggestRequest {
                count,
                study_config: config.clone(),
            })
            .unwrap();
        let xs: Vec<i64> = decision
            .suggestions
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        let ids = datastore.register("s", decision.suggestions);
        for id in ids {
            datastore
                .complete_trial("s", id, Measurement::new().with_metric("loss", 0.0))
                .unwrap();
        }
        datastore.apply_study_metadata("s", &decision.metadata_delta);
        xs
    }

    #[test]
    fn full_replay_advances_with_history() {
        let datastore = InMemoryDatastore::shared();
        let config = int_config();
        let mut policy = DesignerPolicy::new(datastore.clone(), "s", cycling_factory());

        let first = run_and_complete(&datastore, &mut policy, &config, 3);
        assert_eq!(first, vec![1, 2, 3]);
        let second = run_and_complete(&datastore, &mut policy, &config, 3);
        assert_eq!(second, vec![4, 5, 6]);
    }

    #[test]
    fn two_fresh_instances_agree_on_the_same_history() {
        let datastore = InMemoryDatastore::shared();
        let config = int_config();
        let mut warm = DesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        let _ = run_and_complete(&datastore, &mut warm, &config, 4);

        // Simulate crash-and-restart: two adapters for the same study.
        let mut a = DesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        let mut b = DesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        let request = SuggestRequest {
            count: 3,
            study_config: config,
        };
        let from_a = a.suggest(&request).unwrap();
        let from_b = b.suggest(&request).unwrap();
        assert_eq!(from_a.suggestions, from_b.suggestions);
    }

    #[test]
    fn checkpoint_mode_matches_full_reconstruction() {
        let config = int_config();

        // Incremental: three rounds, each persisting its checkpoint.
        let ck_store = InMemoryDatastore::shared();
        let mut incremental =
            CheckpointingDesignerPolicy::new(ck_store.clone(), "s", cycling_factory());
        for _ in 0..3 {
            run_and_complete(&ck_store, &mut incremental, &config, 2);
        }

        // Full replay over an identical history.
        let full_store = InMemoryDatastore::shared();
        let mut full = DesignerPolicy::new(full_store.clone(), "s", cycling_factory());
        for _ in 0..3 {
            run_and_complete(&full_store, &mut full, &config, 2);
        }

        let request = SuggestRequest {
            count: 4,
            study_config: config,
        };
        let from_checkpoint = incremental.suggest(&request).unwrap();
        let from_replay = full.suggest(&request).unwrap();
        assert_eq!(from_checkpoint.suggestions, from_replay.suggestions);
    }

    #[test]
    fn corrupt_checkpoint_falls_back_to_full_replay() {
        let datastore = InMemoryDatastore::shared();
        let config = int_config();
        let mut policy =
            CheckpointingDesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        let _ = run_and_complete(&datastore, &mut policy, &config, 3);

        let mut corrupt = Metadata::new();
        corrupt.insert(
            CheckpointingDesignerPolicy::<CyclingDesigner>::state_key(),
            b"not json".to_vec(),
        );
        datastore.apply_study_metadata("s", &corrupt);

        let decision = policy
            .suggest(&SuggestRequest {
                count: 3,
                study_config: config,
            })
            .unwrap();
        let xs: Vec<i64> = decision
            .suggestions
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        assert_eq!(xs, vec![4, 5, 6]);
    }

    #[test]
    fn metadata_delta_is_empty_in_full_mode_and_present_in_checkpoint_mode() {
        let datastore = InMemoryDatastore::shared();
        let config = int_config();
        let request = SuggestRequest {
            count: 1,
            study_config: config,
        };

        let mut full = DesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        assert!(full.suggest(&request).unwrap().metadata_delta.is_empty());

        let mut incremental =
            CheckpointingDesignerPolicy::new(datastore.clone(), "s", cycling_factory());
        let delta = incremental.suggest(&request).unwrap().metadata_delta;
        assert!(delta
            .get(&CheckpointingDesignerPolicy::<CyclingDesigner>::state_key())
            .is_some());
    }

    struct FlakyClient;

    impl DatastoreClient for FlakyClient {
        fn fetch_trials(&self, _study_id: &str, _filter: StatusFilter) -> Result<Vec<Trial>> {
            Err(Error::Retryable("connection reset".to_string()))
        }

        fn fetch_study_metadata(&self, _study_id: &str) -> Result<Metadata> {
            Err(Error::Retryable("connection reset".to_string()))
        }
    }

    #[test]
    fn transient_fetch_failure_propagates_unchanged() {
        let mut policy = DesignerPolicy::new(Arc::new(FlakyClient), "s", cycling_factory());
        let err = policy
            .suggest(&SuggestRequest {
                count: 1,
                study_config: int_config(),
            })
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn bridge_policies_are_not_cached_by_default() {
        let datastore = InMemoryDatastore::shared();
        let policy = DesignerPolicy::new(datastore, "s", cycling_factory());
        assert!(!policy.should_be_cached());
    }
}
