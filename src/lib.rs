#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Algorithm-hosting core for a distributed blackbox-optimization service:
//! conditional search spaces, trial records, and the contract by which
//! arbitrary suggestion/early-stopping algorithms are exposed behind a
//! uniform, stateless interface.
//!
//! Algorithms want ordinary sequential, in-memory semantics — observe
//! completed trials, propose new ones. The hosting environment is
//! distributed and failure-prone, so any adapter wrapping an algorithm must
//! survive being destroyed and recreated at any time, recovering all state
//! purely from the persisted trial history. This crate reconciles the two:
//! write a [`Designer`](designer::Designer) with plain stateful semantics,
//! and the [`bridge`] turns it into a [`Policy`](policy::Policy) that
//! reconstructs itself from history on every call.
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`](space::SearchSpace) | Schema of tunable parameters, including conditional (guarded) children. |
//! | [`StudyConfig`](study::StudyConfig) | Immutable per-study specification: space + metric definitions + metadata. |
//! | [`Trial`](trial::Trial) | One proposed-and-possibly-evaluated point; ids and status owned by the datastore. |
//! | [`DatastoreClient`](datastore::DatastoreClient) | Injected capability for reading persisted trial history. |
//! | [`Policy`](policy::Policy) | Stateless hosting-facing suggest/early-stop contract. |
//! | [`Designer`](designer::Designer) | Stateful in-process suggest/update contract for algorithm authors. |
//! | [`DesignerPolicy`](bridge::DesignerPolicy) | Bridges a designer into a policy via full history replay. |
//! | [`CheckpointingDesignerPolicy`](bridge::CheckpointingDesignerPolicy) | Same bridge, amortized via serialized designer checkpoints. |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use delphi::prelude::*;
//!
//! // Declare the study: one integer parameter, one metric.
//! let mut space = SearchSpace::new();
//! space.select_root().add_int_param("x", 1, 10)?;
//! let config =
//!     StudyConfig::new(space).with_metric(MetricInformation::new("loss", Goal::Minimize));
//!
//! // Host a designer behind the stateless policy contract.
//! let datastore = InMemoryDatastore::shared();
//! let mut policy = DesignerPolicy::new(
//!     datastore.clone(),
//!     "quickstart",
//!     Arc::new(CyclingDesigner::new),
//! );
//!
//! let decision = policy.suggest(&SuggestRequest {
//!     count: 2,
//!     study_config: config.clone(),
//! })?;
//! let ids = datastore.register("quickstart", decision.suggestions);
//!
//! // Evaluate and complete the trials...
//! for id in ids {
//!     datastore.complete_trial(
//!         "quickstart",
//!         id,
//!         Measurement::new().with_metric("loss", 0.5),
//!     )?;
//! }
//!
//! // The policy can be dropped and rebuilt at any point; history carries
//! // all the state it needs.
//! # Ok::<(), delphi::Error>(())
//! ```
//!
//! # Determinism contract
//!
//! Designer state is reconstructible from (study specification, ordered
//! COMPLETED-trial history, algorithm metadata). Two freshly-constructed
//! instances fed identical histories must produce suggestion streams with
//! identical observable effects. Everything else in the crate — ascending-id
//! replay, checkpoint equivalence, the no-internal-retry rule — exists to
//! keep that property easy to uphold.

pub mod bridge;
pub mod datastore;
pub mod designer;
pub mod designers;
mod error;
pub mod policy;
pub mod space;
pub mod study;
pub mod trial;
pub mod value;

pub use error::{Error, Result};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use delphi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bridge::{CheckpointingDesignerPolicy, DesignerFactory, DesignerPolicy};
    pub use crate::datastore::{DatastoreClient, InMemoryDatastore, StatusFilter};
    pub use crate::designer::{Designer, PartiallySerializableDesigner, SerializableDesigner};
    pub use crate::designers::{CyclingDesigner, RandomDesigner};
    pub use crate::error::{Error, Result};
    pub use crate::policy::{
        EarlyStopDecision, EarlyStopRequest, Policy, RandomPolicy, SuggestDecision, SuggestRequest,
    };
    pub use crate::space::{
        Assignment, ParameterConfig, ParameterDomain, ParameterKind, ScaleType, SearchSpace,
        SpaceSelector,
    };
    pub use crate::study::{Goal, MetricInformation, StudyConfig};
    pub use crate::trial::{Measurement, Metadata, Trial, TrialStatus, TrialSuggestion};
    pub use crate::value::ParameterValue;
}
