//! Tools for monitoring training runs.
//! Measures the followings per EM iteration:
//! - Running time
//! - Negative log-likelihood
//! - Training / test subset accuracy

/// Defines the console/CSV training logger.
pub mod logger;

pub use logger::{IterationRecord, TrainingLogger};
