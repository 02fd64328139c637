//! The weighted KL objective of a log-linear multiclass scorer.

/// Defines the penalty terms.
pub mod penalty;
/// Defines the probability/value/gradient cache.
pub mod cache;
/// Defines `WeightedLogLoss`.
pub mod weighted_log_loss;


pub use penalty::Penalty;
pub use cache::CacheState;
pub use weighted_log_loss::{
    WeightedLogLoss,
    one_hot,
    uniform_weights,
};
