//! Smooth optimization routines.

/// Defines gradient descent with backtracking line search.
pub mod gradient_descent;

pub use gradient_descent::{GradientDescent, Optimizable};
