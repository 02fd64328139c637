use crate::{Sample, WeakLearner};
use crate::common::ReductionStrategy;
use crate::weak_learner::common::{
    split_rule::*,
    type_and_struct::*,
};
use super::{
    bin::*,
    train_node::*,
    rtree_regressor::RegressionTreeRegressor,
};

use std::fmt;


/// Splits whose gain does not exceed this value are ignored.
const GAIN_TOLERANCE: f64 = 1e-12;


/// `RegressionTree` is the factory that generates
/// a `RegressionTreeRegressor` for given gradient/hessian pairs.
///
/// The tree grows leaf-wise (best-first):
/// the leaf whose best split has the largest gain is split
/// until the tree has `max_leaves` leaves or no split has a positive gain.
/// Leaf values are the regularized Newton steps `-G / (H + lambda_l2)`.
///
/// # Example
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// let tree = RegressionTreeBuilder::new(&sample)
///     .max_leaves(4)
///     .lambda_l2(1.0)
///     .build();
///
/// let n_sample = sample.shape().0;
/// let gh = vec![GradientHessian::new(-1.0, 1.0); n_sample];
/// let f = tree.produce(&sample, &gh);
/// let predictions = f.predict_all(&sample);
/// ```
#[derive(Clone)]
pub struct RegressionTree {
    bins: Vec<Bins>,

    // The maximal number of leaves of the output trees
    max_leaves: usize,

    // Regularization parameter
    lambda_l2: f64,

    // Split search over the features
    reduction: ReductionStrategy,
}


impl RegressionTree {
    #[inline]
    pub(super) fn from_components(
        bins: Vec<Bins>,
        max_leaves: usize,
        lambda_l2: f64,
        reduction: ReductionStrategy,
    ) -> Self
    {
        Self { bins, max_leaves, lambda_l2, reduction, }
    }


    /// Set the maximal number of leaves.
    #[inline]
    pub fn max_leaves(mut self, max_leaves: usize) -> Self {
        self.max_leaves = max_leaves.max(1);
        self
    }


    /// Set the L2-regularization parameter on the leaf values.
    #[inline]
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        self.lambda_l2 = lambda_l2;
        self
    }


    /// Set the strategy of the split search over the features.
    #[inline]
    pub fn reduction(mut self, reduction: ReductionStrategy) -> Self {
        self.reduction = reduction;
        self
    }


    /// Finds the best split of `node` over all features.
    fn best_split(
        &self,
        sample: &Sample,
        gh: &[GradientHessian],
        node: &TrainNode,
    ) -> Option<SplitCandidate>
    {
        if node.indices.len() < 2 { return None; }

        let n_sample = sample.shape().0;
        let mut in_node = vec![false; n_sample];
        node.indices.iter()
            .for_each(|&i| { in_node[i] = true; });

        let features = sample.features();
        let in_node = &in_node[..];
        self.reduction
            .map(features.len(), |j| {
                let bins = &self.bins[j];
                let pack = bins.pack(
                    &features[j], &node.indices, in_node, gh, node.sum,
                );
                best_split_at(bins, pack, node.sum, self.lambda_l2)
                    .map(|(gain, threshold)| (j, gain, threshold))
            })
            .into_iter()
            .flatten()
            .reduce(|a, b| {
                // Ties go to the smaller feature index.
                if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a }
            })
            .filter(|(_, gain, _)| *gain > GAIN_TOLERANCE)
            .map(|(j, gain, threshold)| {
                SplitCandidate {
                    splitter: Splitter::new(j, threshold),
                    gain: gain.into(),
                }
            })
    }
}


impl WeakLearner for RegressionTree {
    type Hypothesis = RegressionTreeRegressor;


    fn name(&self) -> &str {
        "Regression Tree"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let n_bins = self.bins.iter()
            .map(|bin| bin.len())
            .max()
            .unwrap_or(0);
        let info = Vec::from([
            ("# of bins (max)", format!("{n_bins}")),
            ("Max leaves", format!("{}", self.max_leaves)),
            ("Regularization param.", format!("{}", self.lambda_l2)),
        ]);
        Some(info)
    }


    fn produce(&self, sample: &Sample, gh: &[GradientHessian])
        -> Self::Hypothesis
    {
        debug_assert_eq!(sample.shape().1, self.bins.len());
        debug_assert_eq!(sample.shape().0, gh.len());

        let indices = (0..gh.len())
            .filter(|&i| !gh[i].is_zero())
            .collect::<Vec<usize>>();

        let mut root = TrainNode::new(indices, gh);
        root.candidate = self.best_split(sample, gh, &root);
        let mut tree = TrainTree::new(root);


        while tree.n_leaves < self.max_leaves {
            let Some(k) = tree.best_leaf() else { break; };
            let candidate = tree.nodes[k].candidate.take();
            let Some(candidate) = candidate else { break; };

            let splitter = candidate.splitter;

            let mut lindices = Vec::new();
            let mut rindices = Vec::new();
            for &i in tree.nodes[k].indices.iter() {
                match splitter.split(sample, i) {
                    LeftRight::Left  => { lindices.push(i); },
                    LeftRight::Right => { rindices.push(i); },
                }
            }


            // If the split has no meaning, keep the leaf as it is.
            if lindices.is_empty() || rindices.is_empty() {
                continue;
            }


            let mut left = TrainNode::new(lindices, gh);
            left.candidate = self.best_split(sample, gh, &left);
            let mut right = TrainNode::new(rindices, gh);
            right.candidate = self.best_split(sample, gh, &right);

            let l = tree.nodes.len();
            tree.nodes.push(left);
            tree.nodes.push(right);
            tree.nodes[k].children = Some((splitter, l, l + 1));
            tree.n_leaves += 1;
        }


        let root = tree.into_node(self.lambda_l2);
        RegressionTreeRegressor::from(root)
    }
}


impl fmt::Display for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\
            ----------\n\
            # Regression Tree Weak Learner\n\n\
            - Max leaves: {}\n\
            - Regularization: {}\n\
            - Bins:\
            ",
            self.max_leaves,
            self.lambda_l2,
        )?;

        for (j, feat_bins) in self.bins.iter().enumerate() {
            let n_bins = feat_bins.len();
            writeln!(f, "\t* [x[{j}] | {n_bins: >3} bins]  {feat_bins}")?;
        }

        write!(f, "----------")
    }
}


/// Returns the gain and the threshold of the best split
/// among the bin boundaries.
/// This code is implemented based on Algorithm 3 of the following paper:
/// Tianqi Chen and Carlos Guestrin.
/// XGBoost: A scalable tree boosting system [KDD '16]
fn best_split_at(
    bins: &Bins,
    pack: Vec<BinStat>,
    total: GradientHessian,
    lambda_l2: f64,
) -> Option<(f64, f64)>
{
    let n_total = pack.iter().map(|stat| stat.count).sum::<usize>();
    let score = |g: f64, h: f64| {
        let denom = h + lambda_l2;
        if denom <= 0.0 { 0.0 } else { g.powi(2) / denom }
    };
    let parent = score(total.grad, total.hess);

    let mut left = GradientHessian::default();
    let mut left_count = 0;

    let mut best: Option<(f64, f64)> = None;

    for (k, stat) in pack.iter().enumerate().take(bins.len() - 1) {
        left += stat.gh;
        left_count += stat.count;

        if left_count == 0 || left_count == n_total { continue; }
        // Same partition as the previous boundary.
        if stat.count == 0 { continue; }

        let right = total - left;
        let gain = score(left.grad, left.hess)
            + score(right.grad, right.hess)
            - parent;

        if best.map_or(true, |(g, _)| gain > g) {
            best = Some((gain, bins.threshold(k)));
        }
    }

    best
}
