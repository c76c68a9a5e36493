//! Typed parameter values.

use serde::{Deserialize, Serialize};

/// A single assigned parameter value, tagged with the owning parameter's
/// declared kind.
///
/// `Double` and `Discrete` both carry an `f64`; the distinction matters to
/// validation (discrete values must exactly match a declared feasible value,
/// no interpolation). Booleans are stored as the strings `"True"`/`"False"`,
/// mirroring how boolean parameters are declared as categoricals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// An IEEE-754 double for a DOUBLE parameter.
    Double(f64),
    /// A signed integer for an INTEGER parameter.
    Int(i64),
    /// One of the declared real values of a DISCRETE parameter.
    Discrete(f64),
    /// A string for a CATEGORICAL (or BOOLEAN) parameter.
    Str(String),
}

impl ParameterValue {
    /// Convenience constructor for boolean parameters, which are categoricals
    /// over `"True"` and `"False"`.
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        ParameterValue::Str(if value { "True" } else { "False" }.to_string())
    }

    /// Returns the value as a float, casting integers and discrete values.
    /// Boolean strings cast to `1.0`/`0.0`; other strings return `None`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(v) | ParameterValue::Discrete(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            ParameterValue::Str(s) => match s.as_str() {
                "True" => Some(1.0),
                "False" => Some(0.0),
                _ => None,
            },
        }
    }

    /// Returns the value as an integer. Floats are accepted only when they
    /// are exactly integral; boolean strings cast to `1`/`0`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Double(v) | ParameterValue::Discrete(v) => {
                let rounded = *v as i64;
                (rounded as f64 == *v).then_some(rounded)
            }
            ParameterValue::Str(s) => match s.as_str() {
                "True" => Some(1),
                "False" => Some(0),
                _ => None,
            },
        }
    }

    /// Returns the string value of a categorical parameter.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean reading of this value: `"True"`/`1` map to `true`,
    /// `"False"`/`0` to `false`, everything else to `None`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Str(s) => match s.as_str() {
                "True" => Some(true),
                "False" => Some(false),
                _ => None,
            },
            ParameterValue::Int(v) => match v {
                1 => Some(true),
                0 => Some(false),
                _ => None,
            },
            ParameterValue::Double(v) | ParameterValue::Discrete(v) => {
                if *v == 1.0 {
                    Some(true)
                } else if *v == 0.0 {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }
}

impl core::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterValue::Double(v) | ParameterValue::Discrete(v) => write!(f, "{v}"),
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Double(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Str(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        ParameterValue::Str(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::from_bool(v)
    }
}
