//! Conditional search-space model.
//!
//! A [`SearchSpace`] is a tree of [`ParameterConfig`]s rooted at an implicit
//! root. Each config may own conditional children guarded by a match
//! condition on the parent's realized value; traversal from the root
//! following matching guards yields the *active* parameter set for a given
//! assignment. Configurations whose value matches no guard simply contribute
//! no children — some assignments are shallower than others.
//!
//! # Example
//!
//! ```
//! use delphi::space::SearchSpace;
//! use delphi::value::ParameterValue;
//!
//! let mut space = SearchSpace::new();
//! let mut root = space.select_root();
//! root.add_categorical_param("optimizer", ["sgd", "adam"]).unwrap();
//! root.add_float_param("learning_rate", 1e-5, 1e-1).unwrap();
//!
//! let mut sgd = root
//!     .select("optimizer", &[ParameterValue::from("sgd")])
//!     .unwrap();
//! sgd.add_float_param("sgd_momentum", 0.0, 1.0).unwrap();
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::ParameterValue;

/// A flattened parameter assignment: parameter name to typed value.
pub type Assignment = BTreeMap<String, ParameterValue>;

/// The declared kind of a tunable parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// A continuous real-valued parameter with min/max bounds.
    Double,
    /// An integer parameter with min/max bounds.
    Integer,
    /// A finite ordered set of real feasible values.
    Discrete,
    /// A finite unordered set of string feasible values.
    Categorical,
}

/// Which transformed coordinate an algorithm should treat as
/// uniform-importance.
///
/// A pure declaration: it never changes the declared bounds or feasible
/// values, only how an algorithm is expected to internally reparametrize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleType {
    /// Uniform importance in the raw coordinate (the default).
    Linear,
    /// Uniform importance in log space.
    Log,
    /// Uniform importance in log space measured from the upper bound.
    ReverseLog,
    /// Uniform importance across the feasible values of a discrete
    /// parameter (the default for DISCRETE).
    UniformDiscrete,
}

impl ScaleType {
    /// The default scale for the given parameter kind.
    #[must_use]
    pub fn default_for(kind: ParameterKind) -> Self {
        match kind {
            ParameterKind::Discrete => ScaleType::UniformDiscrete,
            _ => ScaleType::Linear,
        }
    }
}

/// The bounds or feasible-value set of a parameter, depending on its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterDomain {
    /// Continuous bounds, inclusive on both ends.
    Double {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Integer bounds, inclusive on both ends.
    Integer {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// A finite ordered set of real values (kept sorted ascending).
    Discrete {
        /// The feasible values.
        values: Vec<f64>,
    },
    /// A finite set of strings with no ordering.
    Categorical {
        /// The feasible values.
        values: Vec<String>,
    },
}

impl ParameterDomain {
    /// Returns the kind of parameter this domain describes.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterDomain::Double { .. } => ParameterKind::Double,
            ParameterDomain::Integer { .. } => ParameterKind::Integer,
            ParameterDomain::Discrete { .. } => ParameterKind::Discrete,
            ParameterDomain::Categorical { .. } => ParameterKind::Categorical,
        }
    }

    /// Returns `true` if `value` has the right type for this domain and
    /// lies within its bounds or feasible set. Discrete values require an
    /// exact match, no interpolation.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (ParameterDomain::Double { min, max }, ParameterValue::Double(v)) => {
                (*min..=*max).contains(v)
            }
            (ParameterDomain::Integer { min, max }, ParameterValue::Int(v)) => {
                (*min..=*max).contains(v)
            }
            (ParameterDomain::Discrete { values }, ParameterValue::Discrete(v)) => {
                values.iter().any(|fv| fv == v)
            }
            (ParameterDomain::Categorical { values }, ParameterValue::Str(s)) => {
                values.iter().any(|fv| fv == s)
            }
            _ => false,
        }
    }

    /// Checks `value` against this domain, distinguishing a type mismatch
    /// from an out-of-domain value.
    pub(crate) fn check(&self, name: &str, value: &ParameterValue) -> Result<()> {
        let type_matches = matches!(
            (self, value),
            (ParameterDomain::Double { .. }, ParameterValue::Double(_))
                | (ParameterDomain::Integer { .. }, ParameterValue::Int(_))
                | (ParameterDomain::Discrete { .. }, ParameterValue::Discrete(_))
                | (ParameterDomain::Categorical { .. }, ParameterValue::Str(_))
        );
        if !type_matches {
            return Err(Error::WrongValueType {
                name: name.to_string(),
                expected: match self.kind() {
                    ParameterKind::Double => "DOUBLE",
                    ParameterKind::Integer => "INTEGER",
                    ParameterKind::Discrete => "DISCRETE",
                    ParameterKind::Categorical => "CATEGORICAL",
                },
            });
        }
        if !self.contains(value) {
            return Err(Error::ValueOutOfDomain {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

/// A set of conditional children gated on the parent's realized value.
///
/// The children are reachable only when the parent's value is one of
/// `matches`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildGroup {
    /// Parent values that activate this group.
    pub matches: Vec<ParameterValue>,
    /// The conditional child configurations.
    pub params: Vec<ParameterConfig>,
}

/// Describes one tunable dimension of a search space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    name: String,
    domain: ParameterDomain,
    scale: ScaleType,
    default: Option<ParameterValue>,
    children: Vec<ChildGroup>,
}

impl ParameterConfig {
    fn new(name: impl Into<String>, domain: ParameterDomain) -> Self {
        let scale = ScaleType::default_for(domain.kind());
        Self {
            name: name.into(),
            domain,
            scale,
            default: None,
            children: Vec::new(),
        }
    }

    /// Creates a DOUBLE parameter with the given inclusive bounds.
    #[must_use]
    pub fn double(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(name, ParameterDomain::Double { min, max })
    }

    /// Creates an INTEGER parameter with the given inclusive bounds.
    #[must_use]
    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(name, ParameterDomain::Integer { min, max })
    }

    /// Creates a DISCRETE parameter. The feasible values are sorted
    /// ascending; ordering is part of the discrete contract.
    #[must_use]
    pub fn discrete(name: impl Into<String>, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        values.dedup();
        Self::new(name, ParameterDomain::Discrete { values })
    }

    /// Creates a CATEGORICAL parameter over the given string values.
    #[must_use]
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::new(name, ParameterDomain::Categorical { values })
    }

    /// Creates a BOOLEAN parameter: a categorical over `"True"`/`"False"`.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::categorical(name, ["True", "False"])
    }

    /// Declares the scale type.
    #[must_use]
    pub fn scale(mut self, scale: ScaleType) -> Self {
        self.scale = scale;
        self
    }

    /// Declares a default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bounds or feasible-value set.
    #[must_use]
    pub fn domain(&self) -> &ParameterDomain {
        &self.domain
    }

    /// Returns the declared scale type.
    #[must_use]
    pub fn scale_type(&self) -> ScaleType {
        self.scale
    }

    /// Returns the declared default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&ParameterValue> {
        self.default.as_ref()
    }

    /// Returns the conditional child groups.
    #[must_use]
    pub fn children(&self) -> &[ChildGroup] {
        &self.children
    }

    /// Validates this configuration and, recursively, its children.
    ///
    /// # Errors
    ///
    /// Returns an error on inverted bounds, empty feasible sets, log scales
    /// over non-positive bounds, defaults outside the domain, guard values
    /// outside the parent domain, or duplicate child names within a group.
    pub fn validate(&self) -> Result<()> {
        match &self.domain {
            ParameterDomain::Double { min, max } => {
                if min > max {
                    return Err(Error::InvalidBounds {
                        name: self.name.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                if matches!(self.scale, ScaleType::Log | ScaleType::ReverseLog) && *min <= 0.0 {
                    return Err(Error::InvalidLogScale {
                        name: self.name.clone(),
                    });
                }
            }
            #[allow(clippy::cast_precision_loss)]
            ParameterDomain::Integer { min, max } => {
                if min > max {
                    return Err(Error::InvalidBounds {
                        name: self.name.clone(),
                        min: *min as f64,
                        max: *max as f64,
                    });
                }
                if matches!(self.scale, ScaleType::Log | ScaleType::ReverseLog) && *min < 1 {
                    return Err(Error::InvalidLogScale {
                        name: self.name.clone(),
                    });
                }
            }
            ParameterDomain::Discrete { values } => {
                if values.is_empty() {
                    return Err(Error::EmptyFeasibleSet {
                        name: self.name.clone(),
                    });
                }
            }
            ParameterDomain::Categorical { values } => {
                if values.is_empty() {
                    return Err(Error::EmptyFeasibleSet {
                        name: self.name.clone(),
                    });
                }
            }
        }

        if let Some(default) = &self.default {
            self.domain.check(&self.name, default)?;
        }

        for group in &self.children {
            for guard in &group.matches {
                self.domain.check(&self.name, guard)?;
            }
            validate_level(&group.params)?;
        }
        Ok(())
    }
}

/// Validates a list of sibling configurations: unique names, each valid.
fn validate_level(params: &[ParameterConfig]) -> Result<()> {
    for (i, cfg) in params.iter().enumerate() {
        if params[..i].iter().any(|other| other.name == cfg.name) {
            return Err(Error::DuplicateParameter {
                name: cfg.name.clone(),
            });
        }
        cfg.validate()?;
    }
    Ok(())
}

/// A tree of parameter configurations rooted at an implicit root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    params: Vec<ParameterConfig>,
}

impl SearchSpace {
    /// Creates an empty search space.
    #[must_use]
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Returns a selector handle positioned at the space's root.
    pub fn select_root(&mut self) -> SpaceSelector<'_> {
        SpaceSelector {
            space: self,
            path: Vec::new(),
        }
    }

    /// Returns the root-level parameter configurations.
    #[must_use]
    pub fn params(&self) -> &[ParameterConfig] {
        &self.params
    }

    /// Returns `true` if the space declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validates every configuration in the tree.
    ///
    /// # Errors
    ///
    /// See [`ParameterConfig::validate`].
    pub fn validate(&self) -> Result<()> {
        validate_level(&self.params)
    }

    /// Returns the active parameter set for the given assignment: the root
    /// parameters plus every conditional child whose guard matches its
    /// parent's realized value. Deterministic for a fixed space and
    /// assignment.
    #[must_use]
    pub fn active_params(&self, assignment: &Assignment) -> Vec<&ParameterConfig> {
        let mut out = Vec::new();
        collect_active(&self.params, assignment, &mut out);
        out
    }

    /// Validates a flattened assignment against this space.
    ///
    /// # Errors
    ///
    /// Returns an error if an active parameter has no value, a value has the
    /// wrong type or lies outside its domain, or the assignment names a
    /// parameter that is not active (including unreachable conditional
    /// children).
    pub fn validate_assignment(&self, assignment: &Assignment) -> Result<()> {
        let active = self.active_params(assignment);
        for cfg in &active {
            match assignment.get(cfg.name()) {
                Some(value) => cfg.domain.check(cfg.name(), value)?,
                None => {
                    return Err(Error::MissingParameter {
                        name: cfg.name().to_string(),
                    });
                }
            }
        }
        for name in assignment.keys() {
            if !active.iter().any(|cfg| cfg.name() == name) {
                return Err(Error::UnknownParameter { name: name.clone() });
            }
        }
        Ok(())
    }
}

fn collect_active<'s>(
    params: &'s [ParameterConfig],
    assignment: &Assignment,
    out: &mut Vec<&'s ParameterConfig>,
) {
    for cfg in params {
        out.push(cfg);
        // A value matching no guard contributes no children; not an error.
        if let Some(value) = assignment.get(&cfg.name) {
            for group in &cfg.children {
                if group.matches.contains(value) {
                    collect_active(&group.params, assignment, out);
                }
            }
        }
    }
}

/// A mutable handle positioned at one level of the search-space tree.
///
/// Obtained from [`SearchSpace::select_root`]; [`SpaceSelector::select`]
/// returns a handle scoped one level deeper, under a guard condition.
pub struct SpaceSelector<'a> {
    space: &'a mut SearchSpace,
    path: Vec<(String, Vec<ParameterValue>)>,
}

impl SpaceSelector<'_> {
    /// Walks the path from the root, creating guard groups on demand, and
    /// returns the parameter list at this selector's position.
    fn params_mut(&mut self) -> Result<&mut Vec<ParameterConfig>> {
        let mut current = &mut self.space.params;
        for (parent, matches) in &self.path {
            let idx = current
                .iter()
                .position(|cfg| cfg.name == *parent)
                .ok_or_else(|| Error::UnknownParameter {
                    name: parent.clone(),
                })?;
            let cfg = &mut current[idx];
            let gidx = match cfg.children.iter().position(|g| g.matches == *matches) {
                Some(i) => i,
                None => {
                    cfg.children.push(ChildGroup {
                        matches: matches.clone(),
                        params: Vec::new(),
                    });
                    cfg.children.len() - 1
                }
            };
            current = &mut cfg.children[gidx].params;
        }
        Ok(current)
    }

    /// Adds a fully-built configuration at this position.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or its name collides
    /// with an existing parameter at this position.
    pub fn add_param(&mut self, config: ParameterConfig) -> Result<()> {
        config.validate()?;
        let params = self.params_mut()?;
        if params.iter().any(|cfg| cfg.name == config.name) {
            return Err(Error::DuplicateParameter { name: config.name });
        }
        params.push(config);
        Ok(())
    }

    /// Adds a DOUBLE parameter with the given inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns an error on a name collision or inverted bounds.
    pub fn add_float_param(&mut self, name: impl Into<String>, min: f64, max: f64) -> Result<()> {
        self.add_param(ParameterConfig::double(name, min, max))
    }

    /// Adds an INTEGER parameter with the given inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns an error on a name collision or inverted bounds.
    pub fn add_int_param(&mut self, name: impl Into<String>, min: i64, max: i64) -> Result<()> {
        self.add_param(ParameterConfig::integer(name, min, max))
    }

    /// Adds a DISCRETE parameter over the given real values.
    ///
    /// # Errors
    ///
    /// Returns an error on a name collision or an empty value set.
    pub fn add_discrete_param(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.add_param(ParameterConfig::discrete(name, values))
    }

    /// Adds a CATEGORICAL parameter over the given string values.
    ///
    /// # Errors
    ///
    /// Returns an error on a name collision or an empty value set.
    pub fn add_categorical_param<I, S>(&mut self, name: impl Into<String>, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_param(ParameterConfig::categorical(name, values))
    }

    /// Adds a BOOLEAN parameter (categorical over `"True"`/`"False"`).
    ///
    /// # Errors
    ///
    /// Returns an error on a name collision.
    pub fn add_bool_param(&mut self, name: impl Into<String>) -> Result<()> {
        self.add_param(ParameterConfig::boolean(name))
    }

    /// Returns a child handle scoped to the condition "`parameter_name`'s
    /// value is one of `matching_values`". Subsequent `add_*` calls on the
    /// returned handle create conditional children.
    ///
    /// # Errors
    ///
    /// Returns an error if `parameter_name` does not exist at this position
    /// or a matching value lies outside its domain.
    pub fn select(
        &mut self,
        parameter_name: &str,
        matching_values: &[ParameterValue],
    ) -> Result<SpaceSelector<'_>> {
        let params = self.params_mut()?;
        let parent = params
            .iter()
            .find(|cfg| cfg.name == parameter_name)
            .ok_or_else(|| Error::UnknownParameter {
                name: parameter_name.to_string(),
            })?;
        for value in matching_values {
            parent.domain.check(parameter_name, value)?;
        }
        let mut path = self.path.clone();
        path.push((parameter_name.to_string(), matching_values.to_vec()));
        Ok(SpaceSelector {
            space: &mut *self.space,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditional_space() -> SearchSpace {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        root.add_categorical_param("optimizer", ["sgd", "adam"])
            .unwrap();
        let mut sgd = root
            .select("optimizer", &[ParameterValue::from("sgd")])
            .unwrap();
        sgd.add_float_param("sgd_momentum", 0.0, 1.0).unwrap();
        let mut adam = root
            .select("optimizer", &[ParameterValue::from("adam")])
            .unwrap();
        adam.add_float_param("adam_beta1", 0.8, 0.999).unwrap();
        adam.add_float_param("adam_beta2", 0.9, 0.9999).unwrap();
        space
    }

    #[test]
    fn add_params_at_root() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        root.add_float_param("x", 0.0, 1.0).unwrap();
        root.add_int_param("n", 1, 10).unwrap();
        root.add_discrete_param("d", vec![0.5, 0.1, 0.9]).unwrap();
        root.add_categorical_param("c", ["a", "b"]).unwrap();
        root.add_bool_param("flag").unwrap();
        assert_eq!(space.params().len(), 5);
        space.validate().unwrap();
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        root.add_float_param("x", 0.0, 1.0).unwrap();
        assert!(matches!(
            root.add_int_param("x", 1, 10),
            Err(Error::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        assert!(matches!(
            root.add_float_param("x", 1.0, 0.0),
            Err(Error::InvalidBounds { .. })
        ));
        assert!(matches!(
            root.add_int_param("n", 10, 1),
            Err(Error::InvalidBounds { .. })
        ));
    }

    #[test]
    fn empty_feasible_set_rejected() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        assert!(matches!(
            root.add_discrete_param("d", vec![]),
            Err(Error::EmptyFeasibleSet { .. })
        ));
        assert!(matches!(
            root.add_categorical_param("c", Vec::<String>::new()),
            Err(Error::EmptyFeasibleSet { .. })
        ));
    }

    #[test]
    fn log_scale_requires_positive_bounds() {
        let cfg = ParameterConfig::double("lr", 0.0, 1.0).scale(ScaleType::Log);
        assert!(matches!(cfg.validate(), Err(Error::InvalidLogScale { .. })));
        let cfg = ParameterConfig::double("lr", 1e-5, 1e-1).scale(ScaleType::Log);
        cfg.validate().unwrap();
    }

    #[test]
    fn discrete_values_sorted_and_deduped() {
        let cfg = ParameterConfig::discrete("d", vec![0.9, 0.1, 0.5, 0.1]);
        assert_eq!(
            cfg.domain(),
            &ParameterDomain::Discrete {
                values: vec![0.1, 0.5, 0.9]
            }
        );
    }

    #[test]
    fn default_scale_per_kind() {
        assert_eq!(
            ParameterConfig::discrete("d", vec![1.0]).scale_type(),
            ScaleType::UniformDiscrete
        );
        assert_eq!(
            ParameterConfig::double("x", 0.0, 1.0).scale_type(),
            ScaleType::Linear
        );
    }

    #[test]
    fn select_unknown_parent_rejected() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        assert!(matches!(
            root.select("nope", &[ParameterValue::from("a")]),
            Err(Error::UnknownParameter { .. })
        ));
    }

    #[test]
    fn select_guard_outside_domain_rejected() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        root.add_categorical_param("optimizer", ["sgd", "adam"])
            .unwrap();
        assert!(
            root.select("optimizer", &[ParameterValue::from("rmsprop")])
                .is_err()
        );
    }

    #[test]
    fn flattening_activates_matching_branch_only() {
        let space = conditional_space();

        let mut sgd = Assignment::new();
        sgd.insert("optimizer".to_string(), ParameterValue::from("sgd"));
        let active: Vec<&str> = space
            .active_params(&sgd)
            .iter()
            .map(|cfg| cfg.name())
            .collect();
        assert_eq!(active, vec!["optimizer", "sgd_momentum"]);
        assert!(!active.iter().any(|name| name.starts_with("adam")));

        let mut adam = Assignment::new();
        adam.insert("optimizer".to_string(), ParameterValue::from("adam"));
        let active: Vec<&str> = space
            .active_params(&adam)
            .iter()
            .map(|cfg| cfg.name())
            .collect();
        assert_eq!(active, vec!["optimizer", "adam_beta1", "adam_beta2"]);
    }

    #[test]
    fn unreachable_child_in_assignment_rejected() {
        let space = conditional_space();
        let mut assignment = Assignment::new();
        assignment.insert("optimizer".to_string(), ParameterValue::from("sgd"));
        assignment.insert("sgd_momentum".to_string(), ParameterValue::Double(0.5));
        // adam_beta1 is gated on optimizer == "adam"; unreachable here.
        assignment.insert("adam_beta1".to_string(), ParameterValue::Double(0.9));
        assert!(matches!(
            space.validate_assignment(&assignment),
            Err(Error::UnknownParameter { .. })
        ));
    }

    #[test]
    fn assignment_validation_checks_domain_and_presence() {
        let space = conditional_space();

        let mut ok = Assignment::new();
        ok.insert("optimizer".to_string(), ParameterValue::from("sgd"));
        ok.insert("sgd_momentum".to_string(), ParameterValue::Double(0.5));
        space.validate_assignment(&ok).unwrap();

        let mut missing = Assignment::new();
        missing.insert("optimizer".to_string(), ParameterValue::from("sgd"));
        assert!(matches!(
            space.validate_assignment(&missing),
            Err(Error::MissingParameter { .. })
        ));

        let mut out_of_range = ok.clone();
        out_of_range.insert("sgd_momentum".to_string(), ParameterValue::Double(2.0));
        assert!(matches!(
            space.validate_assignment(&out_of_range),
            Err(Error::ValueOutOfDomain { .. })
        ));

        let mut wrong_type = ok;
        wrong_type.insert("sgd_momentum".to_string(), ParameterValue::Int(1));
        assert!(matches!(
            space.validate_assignment(&wrong_type),
            Err(Error::WrongValueType { .. })
        ));
    }

    #[test]
    fn discrete_requires_exact_match() {
        let mut space = SearchSpace::new();
        space
            .select_root()
            .add_discrete_param("d", vec![0.1, 0.5, 0.9])
            .unwrap();
        let mut assignment = Assignment::new();
        assignment.insert("d".to_string(), ParameterValue::Discrete(0.3));
        assert!(matches!(
            space.validate_assignment(&assignment),
            Err(Error::ValueOutOfDomain { .. })
        ));
    }

    #[test]
    fn boolean_is_categorical_true_false() {
        let cfg = ParameterConfig::boolean("flag");
        assert!(cfg.domain().contains(&ParameterValue::from_bool(true)));
        assert!(cfg.domain().contains(&ParameterValue::from_bool(false)));
        assert!(!cfg.domain().contains(&ParameterValue::from("yes")));
    }

    #[test]
    fn nested_conditions_two_levels() {
        let mut space = SearchSpace::new();
        let mut root = space.select_root();
        root.add_categorical_param("model", ["linear", "dnn"])
            .unwrap();
        let mut dnn = root
            .select("model", &[ParameterValue::from("dnn")])
            .unwrap();
        dnn.add_int_param("layers", 1, 8).unwrap();
        dnn.add_bool_param("residual").unwrap();
        let mut residual = dnn
            .select("residual", &[ParameterValue::from_bool(true)])
            .unwrap();
        residual.add_float_param("residual_dropout", 0.0, 0.9).unwrap();

        let mut assignment = Assignment::new();
        assignment.insert("model".to_string(), ParameterValue::from("dnn"));
        assignment.insert("layers".to_string(), ParameterValue::Int(3));
        assignment.insert("residual".to_string(), ParameterValue::from_bool(true));
        let active: Vec<&str> = space
            .active_params(&assignment)
            .iter()
            .map(|cfg| cfg.name())
            .collect();
        assert_eq!(
            active,
            vec!["model", "layers", "residual", "residual_dropout"]
        );
    }
}
