//! Study specification: the immutable per-study configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::SearchSpace;
use crate::trial::Metadata;

/// The direction a metric is optimized in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    /// Larger metric values are better.
    Maximize,
    /// Smaller metric values are better.
    Minimize,
}

/// One objective metric: a name plus its optimization goal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInformation {
    /// The metric name, matching keys in trial measurements.
    pub name: String,
    /// The optimization goal.
    pub goal: Goal,
}

impl MetricInformation {
    /// Creates a metric definition.
    #[must_use]
    pub fn new(name: impl Into<String>, goal: Goal) -> Self {
        Self {
            name: name.into(),
            goal,
        }
    }
}

/// Immutable per-study configuration: a search space, the objective metric
/// definitions, and user-supplied metadata. Created once at study creation
/// and read-only to algorithms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    search_space: SearchSpace,
    metrics: Vec<MetricInformation>,
    metadata: Metadata,
}

impl StudyConfig {
    /// Creates a study configuration over the given search space, with no
    /// metrics declared yet.
    #[must_use]
    pub fn new(search_space: SearchSpace) -> Self {
        Self {
            search_space,
            metrics: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Declares an objective metric.
    #[must_use]
    pub fn with_metric(mut self, metric: MetricInformation) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Attaches user-supplied metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the search space.
    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.search_space
    }

    /// Returns the declared objective metrics.
    #[must_use]
    pub fn metrics(&self) -> &[MetricInformation] {
        &self.metrics
    }

    /// Returns the user-supplied metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Validates the specification. Called by adapters before any algorithm
    /// logic runs; failures are fatal and never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the search space is empty or invalid, or no
    /// metric is declared.
    pub fn validate(&self) -> Result<()> {
        if self.search_space.is_empty() {
            return Err(Error::InvalidStudyConfig("search space has no parameters"));
        }
        self.search_space.validate()?;
        if self.metrics.is_empty() {
            return Err(Error::InvalidStudyConfig("no objective metric declared"));
        }
        Ok(())
    }
}
