/// These file defines the regression tree producer.
pub mod regression_tree_algorithm;
/// This file defines the regression tree regressor.
pub mod rtree_regressor;

/// Regression Tree builder.
pub mod builder;


pub(crate) mod bin;

mod node;
mod train_node;


pub use regression_tree_algorithm::RegressionTree;
pub use rtree_regressor::RegressionTreeRegressor;
pub use builder::RegressionTreeBuilder;
