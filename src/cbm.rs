//! The Conditional Bernoulli Mixture (CBM) and its EM training.
//!
//! A CBM models the label set `y` of an instance `x` as
//! ```text
//! P(y | x) = Σ_k π_k(x) Π_l b_kl(x)^{y_l} (1 - b_kl(x))^{1 - y_l},
//! ```
//! where the gate `π(x)` is a multiclass scorer over `K` clusters
//! and `b_kl(x)` is the probability of label `l` in cluster `k`,
//! given by an independent binary scorer.

/// Configuration values of a mixture.
pub mod config;
/// Defines `CBM`.
pub mod model;
/// Defines `CBMBuilder`.
pub mod builder;
/// Defines the EM optimizer.
pub mod optimizer;
/// Initialization strategies of the EM optimizer.
pub mod initializer;
/// Per-iteration model files.
pub mod checkpoint;
/// The EM driver loop.
pub mod trainer;


pub use config::{
    AllowEmptyPolicy,
    CBMConfig,
    Initialization,
    ResumeMode,
};
pub use model::{CBM, InstanceProbabilities};
pub use builder::CBMBuilder;
pub use optimizer::{CBMOptimizer, OptimizerParams};
pub use initializer::initialize;
pub use checkpoint::Checkpoints;
pub use trainer::{Trainer, TrainConfig};
