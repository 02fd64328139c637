use serde::{Serialize, Deserialize};

use crate::{Error, Result};

use std::fmt;
use std::str::FromStr;


/// The classifier family of a sub-model.
///
/// Parses from `"lr"` or `"boost"`;
/// any other string is rejected before training starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClassifierType {
    /// [`LogisticRegression`](crate::LogisticRegression).
    LogisticRegression,
    /// [`BoostedClassifier`](crate::BoostedClassifier).
    Boosting,
}


impl FromStr for ClassifierType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "lr" => Ok(Self::LogisticRegression),
            "boost" => Ok(Self::Boosting),
            other => Err(Error::UnknownClassifierType(other.to_string())),
        }
    }
}


impl TryFrom<String> for ClassifierType {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}


impl From<ClassifierType> for String {
    fn from(kind: ClassifierType) -> Self {
        kind.to_string()
    }
}


impl fmt::Display for ClassifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LogisticRegression => "lr",
            Self::Boosting => "boost",
        };
        write!(f, "{name}")
    }
}
