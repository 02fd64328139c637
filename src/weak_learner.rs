//! The files in `weak_learner/` directory defines
//! `WeakLearner` trait and the regression tree weak learner.

/// Provides WeakLearner trait.
pub mod core;

pub(crate) mod common;

/// Defines Regression Tree.
pub mod regression_tree;

pub use self::core::WeakLearner;

pub use self::common::type_and_struct::GradientHessian;

pub use self::regression_tree::{
    RegressionTree,
    RegressionTreeBuilder,
    RegressionTreeRegressor,
};
