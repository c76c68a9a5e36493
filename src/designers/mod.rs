//! Built-in baseline designers.
//!
//! These are deliberately simple algorithms: a uniform random designer and a
//! deterministic index-cycling designer. They exist as correct references
//! for the designer protocol and as the replay baselines hosting tests are
//! written against, not as competitive optimizers.

mod cycling;
pub(crate) mod random;

pub use cycling::CyclingDesigner;
pub use random::RandomDesigner;
