//! The single switch between sequential and fork-join execution.
//!
//! Every heavy loop in this crate (sufficient statistics,
//! KL summation, probability refresh, split search,
//! batch prediction, bucket accumulation)
//! is a reduction over an index range.
//! The loops are written once against [`ReductionStrategy`]
//! and the strategy is chosen once, when a loss, an optimizer,
//! a tree or a predictor is built.
//! `Sequential` never touches the `rayon` pool.
use rayon::prelude::*;
use serde::{Serialize, Deserialize};


/// Sequential or parallel execution of index-range reductions.
///
/// Both variants compute the same sums up to floating-point
/// summation order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionStrategy {
    /// Plain iterator loops.
    #[default]
    Sequential,
    /// Work-sharing loops on the global `rayon` pool.
    Parallel,
}


impl ReductionStrategy {
    /// Returns `true` if `self` is `ReductionStrategy::Parallel`.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel)
    }


    /// Computes `f(0) + f(1) + ... + f(n-1)`.
    #[inline]
    pub fn sum<F>(self, n: usize, f: F) -> f64
        where F: Fn(usize) -> f64 + Sync + Send,
    {
        match self {
            Self::Sequential => (0..n).map(f).sum::<f64>(),
            Self::Parallel => (0..n).into_par_iter().map(f).sum::<f64>(),
        }
    }


    /// Collects `[f(0), f(1), ..., f(n-1)]` in index order.
    #[inline]
    pub fn map<T, F>(self, n: usize, f: F) -> Vec<T>
        where T: Send,
              F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Self::Sequential => (0..n).map(f).collect(),
            Self::Parallel => (0..n).into_par_iter().map(f).collect(),
        }
    }


    /// Folds every index into thread-local accumulators
    /// created by `identity` and merges them with `merge`.
    ///
    /// `merge` must be associative and `identity()` must be its unit.
    #[inline]
    pub fn fold<A, I, F, M>(self, n: usize, identity: I, fold: F, merge: M)
        -> A
        where A: Send,
              I: Fn() -> A + Sync + Send,
              F: Fn(A, usize) -> A + Sync + Send,
              M: Fn(A, A) -> A + Sync + Send,
    {
        match self {
            Self::Sequential => (0..n).fold(identity(), fold),
            Self::Parallel => {
                (0..n).into_par_iter()
                    .fold(&identity, &fold)
                    .reduce(&identity, &merge)
            },
        }
    }
}
