//! Deterministic index-cycling designer.

use serde::{Deserialize, Serialize};

use crate::designer::{Designer, SerializableDesigner};
use crate::error::{Error, Result};
use crate::space::{Assignment, ParameterConfig, ParameterDomain};
use crate::study::StudyConfig;
use crate::trial::{Trial, TrialSuggestion};
use crate::value::ParameterValue;

/// Number of grid points a DOUBLE parameter is swept across.
const DOUBLE_GRID_POINTS: u64 = 11;

/// Cycles deterministically through each parameter's feasible range.
///
/// The next suggestion index is the highest completed trial identifier
/// observed so far (plus one per suggestion already emitted since the last
/// update), so trials stopped early leave gaps rather than rewinding the
/// cycle. Each parameter maps the index into its own domain: integers count
/// up from the lower bound modulo the range span, discrete and categorical
/// parameters cycle their feasible values in order, and doubles sweep a
/// fixed uniform grid between the bounds.
///
/// Entirely history-driven, which makes it the reference algorithm for
/// replay determinism: any two instances fed the same completed history
/// propose the same assignments.
pub struct CyclingDesigner {
    config: StudyConfig,
    mark: u64,
    emitted: u64,
}

impl CyclingDesigner {
    /// Creates a cycling designer for the given study.
    ///
    /// # Errors
    ///
    /// Returns an error if the study configuration is invalid.
    pub fn new(config: &StudyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            mark: 0,
            emitted: 0,
        })
    }

    fn assignment_for(&self, index: u64) -> Assignment {
        let mut out = Assignment::new();
        cycle_level(self.config.search_space().params(), index, &mut out);
        out
    }
}

impl Designer for CyclingDesigner {
    fn update(&mut self, completed: &[Trial]) {
        // An empty batch has no maximum and stays a no-op.
        if let Some(max_id) = completed.iter().map(Trial::id).max() {
            self.mark = self.mark.max(max_id);
            self.emitted = 0;
        }
    }

    fn suggest(&mut self, count: usize) -> Vec<TrialSuggestion> {
        let mut suggestions = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.mark + self.emitted;
            suggestions.push(TrialSuggestion::new(self.assignment_for(index)));
            self.emitted += 1;
        }
        suggestions
    }
}

fn cycle_level(params: &[ParameterConfig], index: u64, out: &mut Assignment) {
    for cfg in params {
        let value = cycle_one(cfg, index);
        for group in cfg.children() {
            if group.matches.contains(&value) {
                cycle_level(&group.params, index, out);
            }
        }
        out.insert(cfg.name().to_string(), value);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn cycle_one(cfg: &ParameterConfig, index: u64) -> ParameterValue {
    match cfg.domain() {
        ParameterDomain::Double { min, max } => {
            let step = index % DOUBLE_GRID_POINTS;
            let fraction = step as f64 / (DOUBLE_GRID_POINTS - 1) as f64;
            ParameterValue::Double(min + fraction * (max - min))
        }
        ParameterDomain::Integer { min, max } => {
            let span = i128::from(*max) - i128::from(*min) + 1;
            let value = i128::from(*min) + i128::from(index) % span;
            ParameterValue::Int(value as i64)
        }
        ParameterDomain::Discrete { values } => {
            ParameterValue::Discrete(values[index as usize % values.len()])
        }
        ParameterDomain::Categorical { values } => {
            ParameterValue::Str(values[index as usize % values.len()].clone())
        }
    }
}

/// The full encodable state of a [`CyclingDesigner`].
///
/// Only observed history is captured: the in-flight emission cursor restarts
/// at zero on load, exactly as it does after a fresh replay.
#[derive(Serialize, Deserialize)]
struct CyclingState {
    version: u32,
    last_completed_id: u64,
}

impl SerializableDesigner for CyclingDesigner {
    fn dump(&self) -> Result<Vec<u8>> {
        let state = CyclingState {
            version: 1,
            last_completed_id: self.mark,
        };
        Ok(serde_json::to_vec(&state)?)
    }

    fn load(config: &StudyConfig, blob: &[u8]) -> Result<Self> {
        let state: CyclingState = serde_json::from_slice(blob)?;
        if state.version != 1 {
            return Err(Error::Precondition(format!(
                "unsupported cycling designer state version {}",
                state.version
            )));
        }
        let mut designer = Self::new(config)?;
        designer.mark = state.last_completed_id;
        Ok(designer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SearchSpace;
    use crate::study::{Goal, MetricInformation};
    use crate::trial::Measurement;

    fn int_config() -> StudyConfig {
        let mut space = SearchSpace::new();
        space.select_root().add_int_param("x", 1, 10).unwrap();
        StudyConfig::new(space).with_metric(MetricInformation::new("loss", Goal::Minimize))
    }

    fn completed_trial(id: u64, x: i64) -> Trial {
        let mut params = Assignment::new();
        params.insert("x".to_string(), ParameterValue::Int(x));
        let mut trial = TrialSuggestion::new(params).into_trial(id);
        trial
            .complete(Measurement::new().with_metric("loss", 0.0))
            .unwrap();
        trial
    }

    #[test]
    fn fresh_designer_starts_at_lower_bound() {
        let mut designer = CyclingDesigner::new(&int_config()).unwrap();
        let xs: Vec<i64> = designer
            .suggest(3)
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        assert_eq!(xs, vec![1, 2, 3]);
    }

    #[test]
    fn three_completed_trials_advance_to_four_five_six() {
        let mut designer = CyclingDesigner::new(&int_config()).unwrap();
        let history = vec![
            completed_trial(1, 1),
            completed_trial(2, 2),
            completed_trial(3, 3),
        ];
        designer.update(&history);
        let xs: Vec<i64> = designer
            .suggest(3)
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        assert_eq!(xs, vec![4, 5, 6]);
    }

    #[test]
    fn index_follows_highest_completed_id_not_count() {
        let mut designer = CyclingDesigner::new(&int_config()).unwrap();
        // Trial 3 was stopped early and never completes; the gap stays.
        designer.update(&[
            completed_trial(1, 1),
            completed_trial(2, 2),
            completed_trial(4, 4),
        ]);
        let xs: Vec<i64> = designer
            .suggest(1)
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        assert_eq!(xs, vec![5]);
    }

    #[test]
    fn integer_wraps_modulo_span() {
        let mut designer = CyclingDesigner::new(&int_config()).unwrap();
        designer.update(&(1..=10).map(|i| completed_trial(i, 0)).collect::<Vec<_>>());
        let xs: Vec<i64> = designer
            .suggest(2)
            .iter()
            .map(|s| s.parameters["x"].as_int().unwrap())
            .collect();
        // Index 10 wraps back to the lower bound of [1, 10].
        assert_eq!(xs, vec![1, 2]);
    }

    #[test]
    fn categorical_index_four_proposes_b() {
        let cfg = ParameterConfig::categorical("c", ["a", "b", "c"]);
        assert_eq!(cycle_one(&cfg, 4), ParameterValue::from("b"));
    }

    #[test]
    fn double_sweeps_within_bounds() {
        let cfg = ParameterConfig::double("x", 0.0, 1.0);
        for index in 0..30 {
            let v = cycle_one(&cfg, index).as_double().unwrap();
            assert!((0.0..=1.0).contains(&v), "index {index} produced {v}");
        }
        assert_eq!(cycle_one(&cfg, 0), ParameterValue::Double(0.0));
        assert_eq!(cycle_one(&cfg, 10), ParameterValue::Double(1.0));
    }

    #[test]
    fn empty_update_is_idempotent() {
        let mut a = CyclingDesigner::new(&int_config()).unwrap();
        let mut b = CyclingDesigner::new(&int_config()).unwrap();
        a.update(&[]);
        a.update(&[]);
        a.update(&[]);
        assert_eq!(a.suggest(4), b.suggest(4));
    }

    #[test]
    fn dump_load_is_behaviorally_equivalent() {
        let config = int_config();
        let mut original = CyclingDesigner::new(&config).unwrap();
        original.update(&[completed_trial(1, 1), completed_trial(2, 2)]);
        let blob = original.dump().unwrap();

        let mut restored = CyclingDesigner::load(&config, &blob).unwrap();
        assert_eq!(original.suggest(5), restored.suggest(5));
    }

    #[test]
    fn load_rejects_unknown_version() {
        let config = int_config();
        let blob = serde_json::to_vec(&serde_json::json!({
            "version": 99,
            "last_completed_id": 0,
        }))
        .unwrap();
        assert!(matches!(
            CyclingDesigner::load(&config, &blob),
            Err(Error::Precondition(_))
        ));
    }
}
