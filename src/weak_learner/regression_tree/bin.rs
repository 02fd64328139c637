use std::fmt;


use crate::sample::Feature;
use crate::weak_learner::common::type_and_struct::GradientHessian;


/// Binning: A feature processing.
///
/// `Bins` cuts the range `[min, max]` of a feature into
/// bins of the same width.
/// Only the interior boundaries are stored;
/// the left-most bin extends to `-inf` and the right-most one to `+inf`,
/// so that every value (including unseen test values) has a bin.
#[derive(Debug, Clone)]
pub struct Bins {
    edges: Vec<f64>,
}


/// Sum of the derivatives and the number of instances in a bin.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BinStat {
    pub(crate) gh: GradientHessian,
    pub(crate) count: usize,
}


impl Bins {
    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.edges.len() + 1
    }


    /// Always `false` since a feature has at least one bin.
    pub fn is_empty(&self) -> bool {
        false
    }


    /// Cut the given `Feature` into `n_bin` bins.
    /// This method naively cut the given feature with same width.
    /// A constant feature gets a single bin.
    #[inline(always)]
    pub fn cut(feature: &Feature, n_bin: usize) -> Self {
        let (min, max) = feature.min_max();

        if n_bin <= 1 || min >= max {
            return Self { edges: Vec::new() };
        }

        let width = (max - min) / n_bin as f64;
        let edges = (1..n_bin)
            .map(|k| min + k as f64 * width)
            .collect::<Vec<_>>();

        Self { edges }
    }


    /// Returns the index of the bin that contains `x`.
    #[inline(always)]
    pub fn index(&self, x: f64) -> usize {
        self.edges.partition_point(|edge| *edge <= x)
    }


    /// Returns the boundary between the `k`-th and `k+1`-th bins.
    /// A value goes to the bins `0..=k` iff it is less than this boundary.
    #[inline(always)]
    pub fn threshold(&self, k: usize) -> f64 {
        self.edges[k]
    }


    /// Accumulates the gradient/hessian pairs of the instances
    /// in `indices` into bins.
    ///
    /// `in_node[i]` must be `true` iff `i` is in `indices`
    /// and `total` must be the sum of `gh` over `indices`.
    /// For a sparse feature, only the non-zero entries are visited
    /// and the bin containing `0` receives the remainder.
    pub(crate) fn pack(
        &self,
        feature: &Feature,
        indices: &[usize],
        in_node: &[bool],
        gh: &[GradientHessian],
        total: GradientHessian,
    ) -> Vec<BinStat>
    {
        let mut packed = vec![BinStat::default(); self.len()];

        match feature {
            Feature::Dense(feat) => {
                for &i in indices {
                    let pos = self.index(feat[i]);
                    packed[pos].gh += gh[i];
                    packed[pos].count += 1;
                }
            },
            Feature::Sparse(feat) => {
                let mut nonzero = BinStat::default();
                for &(i, x) in feat.iter() {
                    if !in_node[i] { continue; }
                    let pos = self.index(x);
                    packed[pos].gh += gh[i];
                    packed[pos].count += 1;
                    nonzero.gh += gh[i];
                    nonzero.count += 1;
                }

                let zero = self.index(0.0);
                packed[zero].gh += total - nonzero.gh;
                packed[zero].count += indices.len() - nonzero.count;
            },
        }

        packed
    }
}


const PRINT_BIN_SIZE: usize = 3;

impl fmt::Display for Bins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_edges = self.edges.len();
        if n_edges == 0 {
            return write!(f, "(-Inf, +Inf)");
        }
        let line = if n_edges > PRINT_BIN_SIZE {
            let head = self.edges[..2].iter()
                .map(|edge| format!("{edge:.2}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{head},      ...     , {:.2}", self.edges[n_edges - 1])
        } else {
            self.edges.iter()
                .map(|edge| format!("{edge:.2}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "(-Inf | {line} | +Inf)")
    }
}
