#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a numeric parameter's lower bound exceeds its upper bound.
    #[error("invalid bounds for '{name}': min ({min}) must be less than or equal to max ({max})")]
    InvalidBounds {
        /// The name of the offending parameter.
        name: String,
        /// The declared lower bound.
        min: f64,
        /// The declared upper bound.
        max: f64,
    },

    /// Returned when a log or reverse-log scale is declared over non-positive bounds.
    #[error("invalid scale for '{name}': log scales require strictly positive bounds")]
    InvalidLogScale {
        /// The name of the offending parameter.
        name: String,
    },

    /// Returned when a discrete or categorical parameter has no feasible values.
    #[error("empty feasible set for '{name}'")]
    EmptyFeasibleSet {
        /// The name of the offending parameter.
        name: String,
    },

    /// Returned when a parameter name collides with an existing parameter
    /// at the same position in the search space.
    #[error("duplicate parameter '{name}'")]
    DuplicateParameter {
        /// The colliding name.
        name: String,
    },

    /// Returned when selecting or assigning a parameter that does not exist
    /// at the referenced position in the search space.
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// The unresolved name.
        name: String,
    },

    /// Returned when an assigned value is outside its parameter's declared domain.
    #[error("value {value} is outside the domain of '{name}'")]
    ValueOutOfDomain {
        /// The name of the parameter.
        name: String,
        /// Display form of the rejected value.
        value: String,
    },

    /// Returned when an assigned value has the wrong type for its parameter.
    #[error("wrong value type for '{name}': expected {expected}")]
    WrongValueType {
        /// The name of the parameter.
        name: String,
        /// The expected parameter kind.
        expected: &'static str,
    },

    /// Returned when an active parameter is missing from an assignment.
    #[error("missing value for active parameter '{name}'")]
    MissingParameter {
        /// The name of the absent parameter.
        name: String,
    },

    /// Returned when a study specification is malformed or empty.
    /// Fatal: surfaced before any algorithm logic runs, never retried.
    #[error("invalid study config: {0}")]
    InvalidStudyConfig(&'static str),

    /// Returned when a datastore operation references an unknown study.
    #[error("unknown study '{study_id}'")]
    UnknownStudy {
        /// The unresolved study identifier.
        study_id: String,
    },

    /// Returned when a datastore operation references a trial that does not exist.
    #[error("unknown trial {trial_id} in study '{study_id}'")]
    UnknownTrial {
        /// The study the trial was looked up in.
        study_id: String,
        /// The unresolved trial identifier.
        trial_id: u64,
    },

    /// Returned when attempting a status transition on a COMPLETED or
    /// STOPPED trial. Terminal records are immutable.
    #[error("trial {trial_id} is already in a terminal state")]
    TrialAlreadyTerminal {
        /// The trial whose transition was rejected.
        trial_id: u64,
    },

    /// A transient datastore or network failure. Propagated unchanged to the
    /// hosting environment, which owns retry policy; the core never retries.
    #[error("retryable: {0}")]
    Retryable(String),

    /// A documented precondition was violated (e.g. a partially-serializable
    /// checkpoint restored against a differently-constructed optimizer).
    #[error("precondition violation: {0}")]
    Precondition(String),

    /// Returned when encoding or decoding persisted optimizer state fails.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the hosting environment may retry the failed call
    /// against a freshly constructed adapter.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Retryable(_))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
