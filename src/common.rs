//! Defines some common functions used in this library.

/// Defines the sequential/parallel reduction strategy.
pub mod reduction;

/// Defines some useful numeric functions such as `log_sum_exp`.
pub mod utils;

/// Defines multi-label evaluation measures.
pub mod measures;

/// Defines some checker functions.
pub(crate) mod checker;

pub use reduction::ReductionStrategy;
pub use measures::MLMeasures;
