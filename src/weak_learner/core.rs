//! Provides `WeakLearner` trait.
use crate::Sample;
use super::common::type_and_struct::GradientHessian;


/// An interface for the weak learners used by the boosting routines.
///
/// A weak learner receives the first and second order derivatives
/// of the loss with respect to the current score of each instance
/// and returns a hypothesis that approximates the Newton step.
pub trait WeakLearner {
    /// The hypothesis type produced by `self`.
    type Hypothesis;


    /// Returns the name of the weak learner.
    fn name(&self) -> &str;


    /// Returns the information of the weak learner as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Produce a hypothesis for the given gradient/hessian pairs.
    /// The `i`-th entry of `gh` corresponds to the `i`-th instance.
    /// Instances whose gradient and hessian are both zero
    /// are ignored.
    fn produce(&self, sample: &Sample, gh: &[GradientHessian])
        -> Self::Hypothesis;
}
