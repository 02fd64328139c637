use crate::Sample;
use crate::common::ReductionStrategy;
use super::bin::*;
use super::regression_tree_algorithm::RegressionTree;


/// The number of bins set as default.
pub const DEFAULT_NBIN: usize = 255;
/// The maximal number of leaves set as default.
pub const DEFAULT_MAX_LEAVES: usize = 2;
/// Default L2-regularization parameter
pub const DEFAULT_LAMBDA_L2: f64 = 0.01;


/// A struct that builds `RegressionTree`.
/// `RegressionTreeBuilder` keeps parameters for constructing `RegressionTree`.
///
/// The bins are computed once in [`RegressionTreeBuilder::build`]
/// and shared by every tree the resulting weak learner produces.
///
/// # Example
///
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// let weak_learner = RegressionTreeBuilder::new(&sample)
///     .max_leaves(4)
///     .lambda_l2(0.1)
///     .build();
/// ```
#[derive(Clone)]
pub struct RegressionTreeBuilder<'a> {
    sample: &'a Sample,
    /// Number of bins per feature.
    n_bins: Vec<usize>,


    max_leaves: usize,


    /// L2 regularization for the leaf values.
    lambda_l2: f64,


    reduction: ReductionStrategy,
}


impl<'a> RegressionTreeBuilder<'a> {
    /// Construct a new instance of `RegressionTreeBuilder`.
    /// By default,
    /// `RegressionTreeBuilder` sets the parameters as follows;
    /// ```text
    /// n_bins: min(# of distinct values, DEFAULT_NBIN == 255),
    /// max_leaves: DEFAULT_MAX_LEAVES == 2,
    /// lambda_l2: DEFAULT_LAMBDA_L2 == 0.01,
    /// reduction: ReductionStrategy::Sequential,
    /// ```
    pub fn new(sample: &'a Sample) -> Self {
        let n_bins = sample.features()
            .iter()
            .map(|feat| {
                feat.distinct_value_count()
                    .min(DEFAULT_NBIN)
                    .max(1)
            })
            .collect();

        Self {
            sample,
            n_bins,
            max_leaves: DEFAULT_MAX_LEAVES,
            lambda_l2: DEFAULT_LAMBDA_L2,
            reduction: ReductionStrategy::default(),
        }
    }


    /// Set the L2-regularization parameter.
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        self.lambda_l2 = lambda_l2;
        self
    }


    /// Set how the split search scans the features.
    pub fn reduction(mut self, reduction: ReductionStrategy) -> Self {
        self.reduction = reduction;
        self
    }


    /// Specify the maximal number of leaves of the tree.
    /// Values smaller than `1` are treated as `1`.
    pub fn max_leaves(mut self, max_leaves: usize) -> Self {
        self.max_leaves = max_leaves.max(1);
        self
    }


    /// Set the number of bins of the `j`-th feature.
    /// Out-of-range indices are ignored.
    pub fn set_nbins(&mut self, j: usize, n_bins: usize) {
        if let Some(val) = self.n_bins.get_mut(j) {
            *val = n_bins.max(1);
        }
    }


    /// Build a `RegressionTree`.
    /// This method consumes `self`.
    pub fn build(self) -> RegressionTree {
        let bins = self.sample.features()
            .iter()
            .zip(self.n_bins)
            .map(|(feature, n_bins)| Bins::cut(feature, n_bins))
            .collect::<Vec<_>>();

        RegressionTree::from_components(
            bins, self.max_leaves, self.lambda_l2, self.reduction,
        )
    }
}
