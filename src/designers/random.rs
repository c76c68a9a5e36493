//! Uniform random designer.

use core::hash::{Hash, Hasher};
use std::hash::DefaultHasher;

use serde::{Deserialize, Serialize};

use crate::designer::{Designer, PartiallySerializableDesigner};
use crate::error::{Error, Result};
use crate::space::{Assignment, ParameterConfig, ParameterDomain, ScaleType, SearchSpace};
use crate::study::StudyConfig;
use crate::trial::{Trial, TrialSuggestion};
use crate::value::ParameterValue;

/// Samples every active parameter uniformly, honoring each parameter's
/// declared scale type.
///
/// The default seed is derived from the study configuration and `update`
/// advances the stream once per observed completed trial, so two instances
/// reconstructed from identical histories resume identical streams while
/// successive suggestion rounds still explore new points. Serves as a
/// baseline and as the startup phase of more sophisticated designers.
pub struct RandomDesigner {
    config: StudyConfig,
    rng: fastrand::Rng,
}

/// Derives a stable seed from the study configuration's canonical encoding.
fn seed_from_config(config: &StudyConfig) -> Result<u64> {
    let bytes = serde_json::to_vec(config)?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(hasher.finish())
}

impl RandomDesigner {
    /// Creates a random designer seeded deterministically from the study
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the study configuration is invalid.
    pub fn new(config: &StudyConfig) -> Result<Self> {
        let seed = seed_from_config(config)?;
        Self::with_seed(config, seed)
    }

    /// Creates a random designer with a fixed seed for reproducibility.
    ///
    /// # Errors
    ///
    /// Returns an error if the study configuration is invalid.
    pub fn with_seed(config: &StudyConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed),
        })
    }
}

impl Designer for RandomDesigner {
    fn update(&mut self, completed: &[Trial]) {
        // Trial content never informs the sampling, only the stream
        // position: one draw per observed trial keeps replayed instances in
        // lockstep without repeating earlier rounds.
        for _ in completed {
            self.rng.u64(..);
        }
    }

    fn suggest(&mut self, count: usize) -> Vec<TrialSuggestion> {
        (0..count)
            .map(|_| {
                TrialSuggestion::new(sample_assignment(
                    self.config.search_space(),
                    &mut self.rng,
                ))
            })
            .collect()
    }
}

/// The serializable subset of a [`RandomDesigner`]: its rng position. The
/// study configuration is a constructor argument and must be re-supplied.
#[derive(Serialize, Deserialize)]
struct RandomState {
    version: u32,
    rng_seed: u64,
}

impl PartiallySerializableDesigner for RandomDesigner {
    fn dump_partial(&self) -> Result<Vec<u8>> {
        let state = RandomState {
            version: 1,
            rng_seed: self.rng.get_seed(),
        };
        Ok(serde_json::to_vec(&state)?)
    }

    fn restore_partial(&mut self, blob: &[u8]) -> Result<()> {
        let state: RandomState = serde_json::from_slice(blob)?;
        if state.version != 1 {
            return Err(Error::Precondition(format!(
                "unsupported random designer state version {}",
                state.version
            )));
        }
        self.rng = fastrand::Rng::with_seed(state.rng_seed);
        Ok(())
    }
}

/// Samples one flattened assignment: every root parameter plus, recursively,
/// the children whose guards match the values just drawn.
pub(crate) fn sample_assignment(space: &SearchSpace, rng: &mut fastrand::Rng) -> Assignment {
    let mut out = Assignment::new();
    sample_level(space.params(), rng, &mut out);
    out
}

fn sample_level(params: &[ParameterConfig], rng: &mut fastrand::Rng, out: &mut Assignment) {
    for cfg in params {
        let value = sample_one(cfg, rng);
        for group in cfg.children() {
            if group.matches.contains(&value) {
                sample_level(&group.params, rng, out);
            }
        }
        out.insert(cfg.name().to_string(), value);
    }
}

fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.f64()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn sample_one(cfg: &ParameterConfig, rng: &mut fastrand::Rng) -> ParameterValue {
    match cfg.domain() {
        ParameterDomain::Double { min, max } => {
            let value = match cfg.scale_type() {
                ScaleType::Log => f64_range(rng, min.ln(), max.ln()).exp(),
                // Log-uniform measured from the upper bound.
                ScaleType::ReverseLog => min + max - f64_range(rng, min.ln(), max.ln()).exp(),
                _ => f64_range(rng, *min, *max),
            };
            ParameterValue::Double(value.clamp(*min, *max))
        }
        ParameterDomain::Integer { min, max } => {
            let value = match cfg.scale_type() {
                ScaleType::Log | ScaleType::ReverseLog => {
                    let raw = f64_range(rng, (*min as f64).ln(), (*max as f64).ln())
                        .exp()
                        .round() as i64;
                    let raw = if cfg.scale_type() == ScaleType::ReverseLog {
                        min + max - raw
                    } else {
                        raw
                    };
                    // Rounding can push just outside the bounds.
                    raw.clamp(*min, *max)
                }
                _ => rng.i64(*min..=*max),
            };
            ParameterValue::Int(value)
        }
        ParameterDomain::Discrete { values } => {
            ParameterValue::Discrete(values[rng.usize(0..values.len())])
        }
        ParameterDomain::Categorical { values } => {
            ParameterValue::Str(values[rng.usize(0..values.len())].clone())
        }
    }
}
