//! The sequential optimizer ("designer") protocol and its serialization
//! tiers.
//!
//! A [`Designer`] is the simplified, single-process-lifetime contract for
//! algorithm authors who do not want to think about distribution: observe
//! completed trials through [`Designer::update`], propose new assignments
//! through [`Designer::suggest`]. The bridge in [`crate::bridge`] turns any
//! designer into a hosting-ready [`Policy`](crate::policy::Policy) by
//! reconstructing it from persisted trial history on every call.
//!
//! Designer state is ephemeral by contract: it must be reconstructible
//! deterministically from the study configuration plus the ordered
//! COMPLETED-trial history. Two freshly-constructed instances fed identical
//! histories must produce suggestion streams with identical observable
//! effects.

use crate::error::Result;
use crate::study::StudyConfig;
use crate::trial::{Trial, TrialSuggestion};

/// A stateful, in-process suggest/update optimization algorithm.
///
/// Implementations are constructed once from a [`StudyConfig`] and have no
/// required relationship to persisted identifiers — they operate purely on
/// parameter and measurement content.
///
/// # Implementing a custom designer
///
/// ```
/// use delphi::designer::Designer;
/// use delphi::space::Assignment;
/// use delphi::trial::{Trial, TrialSuggestion};
/// use delphi::value::ParameterValue;
///
/// /// Proposes the midpoint until anything completes, then gives up.
/// struct Midpoint {
///     observed: usize,
/// }
///
/// impl Designer for Midpoint {
///     fn update(&mut self, completed: &[Trial]) {
///         self.observed += completed.len();
///     }
///
///     fn suggest(&mut self, count: usize) -> Vec<TrialSuggestion> {
///         if self.observed > 0 {
///             return Vec::new(); // exhausted
///         }
///         let mut params = Assignment::new();
///         params.insert("x".to_string(), ParameterValue::Double(0.5));
///         vec![TrialSuggestion::new(params); count]
///     }
/// }
/// ```
pub trait Designer: Send {
    /// Folds a batch of newly COMPLETED trials into internal state.
    ///
    /// Batches arrive in ascending identifier order during replay; state
    /// may be order-sensitive, and the bridge upholds that ordering. An
    /// empty batch must be a no-op.
    fn update(&mut self, completed: &[Trial]);

    /// Returns at most `count` new parameter assignments given everything
    /// observed so far. Fewer is permitted if the algorithm is exhausted or
    /// constrained by infeasible space.
    ///
    /// `count == 0` means "no work requested" and returns an empty sequence;
    /// it is not an exhaustion signal and must not perturb internal state.
    fn suggest(&mut self, count: usize) -> Vec<TrialSuggestion>;
}

/// A designer whose entire state can be encoded into an opaque blob.
///
/// Decoding the blob (plus the study configuration every designer receives)
/// must produce a behaviorally-equivalent instance — nothing else from the
/// original instance is required.
///
/// This tier is purely a performance optimization over full-reconstruction
/// replay: worthwhile when the encoded state is asymptotically smaller than
/// the trial history (parametric and population-based methods), pointless
/// when it is not (non-parametric models). Correctness must hold identically
/// whether or not a designer implements it.
pub trait SerializableDesigner: Designer + Sized {
    /// Encodes the full internal state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded.
    fn dump(&self) -> Result<Vec<u8>>;

    /// Decodes a blob produced by [`SerializableDesigner::dump`] into a
    /// behaviorally-equivalent instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is malformed or from an incompatible
    /// version.
    fn load(config: &StudyConfig, blob: &[u8]) -> Result<Self>;
}

/// A designer of which only a subset of state is encodable.
///
/// Full recovery additionally requires re-invoking the designer's
/// constructor with the *same* arguments used originally (e.g. a
/// user-supplied mutation operator can be re-supplied but not serialized).
pub trait PartiallySerializableDesigner: Designer {
    /// Encodes the serializable subset of state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded.
    fn dump_partial(&self) -> Result<Vec<u8>>;

    /// Restores the serializable subset into `self`.
    ///
    /// # Preconditions
    ///
    /// `self` must have been constructed with the same arguments as the
    /// instance that produced the blob. Restoring into a
    /// differently-constructed instance is a contract violation with
    /// undefined behavior — it is not detectable here.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is malformed.
    fn restore_partial(&mut self, blob: &[u8]) -> Result<()>;
}
