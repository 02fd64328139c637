//! Plugin predictors turn the probability surface of a [`CBM`](crate::CBM)
//! into one label set per instance.
//!
//! Each predictor searches a per-instance candidate set
//! (see [`Candidates`]) for the set that maximizes
//! the expected value of its decision metric.

/// Defines `PluginPredictor` and `Candidates`.
pub mod core;
/// Defines the subset-accuracy predictor.
pub mod subset_accuracy;
/// Defines the instance-F1 predictor.
pub mod instance_f1;


pub use self::core::{Candidates, PluginPredictor};
pub use subset_accuracy::SubsetAccuracyPredictor;
pub use instance_f1::InstanceF1Predictor;
