//! Defines the error type shared by every module of this crate.
use thiserror::Error;

use std::path::PathBuf;


/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;


/// The error type of `minicbm`.
///
/// Configuration errors are reported before any training work starts.
/// Numeric degeneracies (zero-count buckets, zero-likelihood rows)
/// are handled locally and never surface as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// The classifier family string is not recognized.
    #[error("unknown classifier type `{0}`, expected `lr` or `boost`")]
    UnknownClassifierType(String),


    /// The allow-empty policy string is not recognized.
    #[error("unknown value `{0}` for allow empty, expected `true`, `false` or `auto`")]
    UnknownAllowEmpty(String),


    /// The warm-start (resume) mode string is not recognized.
    #[error("unknown value `{0}` for warm start, expected `true`, `false` or `auto`")]
    UnknownResumeMode(String),


    /// The initialization string is not recognized.
    #[error("unknown initialization `{0}`, expected `warm` or `random`")]
    UnknownInitialization(String),


    /// A numeric hyperparameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },


    /// Inputs disagree on their dimensions.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),


    /// Resuming was requested but no checkpoint exists.
    #[error("no checkpoint `iter.<n>.model` found in {}", .0.display())]
    MissingCheckpoint(PathBuf),


    /// I/O failure while reading or writing an artifact.
    #[error(transparent)]
    Io(#[from] std::io::Error),


    /// (De)serialization failure of an artifact.
    #[error(transparent)]
    Json(#[from] serde_json::Error),


    /// Failure while converting a `polars::DataFrame`.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),


    /// Failure while drawing a reliability diagram.
    #[error("failed to draw the diagram: {0}")]
    Plot(String),
}


impl Error {
    pub(crate) fn invalid<S: ToString>(name: &'static str, reason: S) -> Self {
        Self::InvalidParameter { name, reason: reason.to_string() }
    }
}
