use serde::{Serialize, Deserialize};

use crate::{Error, Result, ClassifierType};

use std::fmt;
use std::str::FromStr;


/// Whether the empty label set may be predicted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AllowEmptyPolicy {
    /// Always allowed.
    Allow,
    /// Never allowed.
    Forbid,
    /// Allowed iff some training instance has the empty label set.
    #[default]
    Auto,
}


impl AllowEmptyPolicy {
    /// Resolve the policy against the training label sets.
    pub fn resolve(&self, training_has_empty: bool) -> bool {
        match self {
            Self::Allow => true,
            Self::Forbid => false,
            Self::Auto => training_has_empty,
        }
    }
}


impl FromStr for AllowEmptyPolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "true" => Ok(Self::Allow),
            "false" => Ok(Self::Forbid),
            "auto" => Ok(Self::Auto),
            other => Err(Error::UnknownAllowEmpty(other.to_string())),
        }
    }
}


impl fmt::Display for AllowEmptyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allow => "true",
            Self::Forbid => "false",
            Self::Auto => "auto",
        };
        write!(f, "{s}")
    }
}


/// How the responsibilities of a fresh model are initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Initialization {
    /// Posteriors of a label-only Bernoulli mixture
    /// seeded from the label marginals.
    #[default]
    Warm,
    /// Random responsibilities drawn from `Dirichlet(1, ..., 1)`.
    Random,
}


impl FromStr for Initialization {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "warm" | "true" => Ok(Self::Warm),
            "random" | "false" => Ok(Self::Random),
            other => Err(Error::UnknownInitialization(other.to_string())),
        }
    }
}


impl fmt::Display for Initialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warm => "warm",
            Self::Random => "random",
        };
        write!(f, "{s}")
    }
}


/// Whether training resumes from the latest checkpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResumeMode {
    /// Resume; it is an error if no checkpoint exists.
    Resume,
    /// Start from a fresh model.
    #[default]
    Fresh,
    /// Resume if a checkpoint exists, otherwise start fresh.
    Auto,
}


impl FromStr for ResumeMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "true" => Ok(Self::Resume),
            "false" => Ok(Self::Fresh),
            "auto" => Ok(Self::Auto),
            other => Err(Error::UnknownResumeMode(other.to_string())),
        }
    }
}


impl fmt::Display for ResumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resume => "true",
            Self::Fresh => "false",
            Self::Auto => "auto",
        };
        write!(f, "{s}")
    }
}


macro_rules! impl_string_conversion {
    ($($t:ty),*) => {$(
        impl TryFrom<String> for $t {
            type Error = Error;
            fn try_from(s: String) -> Result<Self> {
                s.parse()
            }
        }


        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.to_string()
            }
        }
    )*};
}

impl_string_conversion!(AllowEmptyPolicy, Initialization, ResumeMode);


/// The structure of a [`CBM`](crate::CBM),
/// fixed at construction and never mutated afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CBMConfig {
    /// Number of clusters `K`.
    pub n_clusters: usize,
    /// Size of the label universe `L`.
    pub n_labels: usize,
    /// Number of features.
    pub n_features: usize,
    /// Family of the gate.
    pub multi_class_classifier_type: ClassifierType,
    /// Family of the per-label scorers.
    pub binary_classifier_type: ClassifierType,
    /// Whether the empty label set may be predicted.
    pub allow_empty: bool,
}
