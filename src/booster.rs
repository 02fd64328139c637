//! Provides the `Booster` trait and functional gradient boosting.

/// Provides `Booster` trait.
pub mod core;

/// Functional gradient boosting of a multiclass scorer.
pub mod functional_boost;

pub use self::core::Booster;
pub use functional_boost::FunctionalBoost;
