use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::{
    Error,
    Result,
    Sample,
    RegressionTree,
    RegressionTreeBuilder,
    SubProblemParams,
};
use crate::common::{
    checker,
    utils,
    ReductionStrategy,
};
use super::model::CBM;

use std::time::Instant;


/// Hyperparameters of the EM optimizer.
///
/// The gate fit and the per-label binary fits are configured
/// separately since they see supervision signals of different scales:
/// one gate fit per instance against one binary fit
/// per instance and label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerParams {
    /// Parameters of the gate fit.
    pub multi_class: SubProblemParams,
    /// Parameters of every binary fit.
    pub binary: SubProblemParams,
    /// Sequential or parallel reductions.
    pub reduction: ReductionStrategy,
    /// Seed of the random initialization.
    pub seed: u64,
    /// EM iterations of the label-only mixture of the warm start.
    pub warm_start_iterations: usize,
}


impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            multi_class: SubProblemParams::default(),
            binary: SubProblemParams::default(),
            reduction: ReductionStrategy::Parallel,
            seed: 0,
            warm_start_iterations: 10,
        }
    }
}


impl OptimizerParams {
    /// Check the parameters of `self`.
    pub fn validate(&self) -> Result<()> {
        self.multi_class.validate()?;
        self.binary.validate()
    }
}


/// The EM optimizer of a [`CBM`].
///
/// The optimizer owns the `N × K` responsibility matrix
/// for the duration of training.
/// Each [`CBMOptimizer::iterate`] call runs exactly one E-step
/// and one M-step; the caller decides how many iterations to run.
///
/// # Example
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// let mut cbm = CBMBuilder::new(&sample)
///     .n_clusters(4)
///     .build()
///     .unwrap();
///
/// let params = OptimizerParams::default();
/// let mut optimizer = CBMOptimizer::new(&mut cbm, &sample, params)
///     .unwrap();
/// initialize(&mut optimizer, Initialization::Warm).unwrap();
/// for _ in 0..10 {
///     let nll = optimizer.iterate().unwrap();
///     println!("negative log-likelihood: {nll}");
/// }
/// ```
pub struct CBMOptimizer<'a> {
    cbm: &'a mut CBM,
    sample: &'a Sample,
    params: OptimizerParams,

    responsibilities: Vec<Vec<f64>>,
    // label_targets[l][i] = [1 - y_il, y_il]
    label_targets: Vec<Vec<Vec<f64>>>,
    gate_weights: Vec<f64>,

    multi_class_tree: RegressionTree,
    binary_tree: RegressionTree,

    history: Vec<f64>,
}


impl<'a> CBMOptimizer<'a> {
    /// Construct a new optimizer of `cbm` on the training `sample`.
    /// Responsibilities start uniform.
    pub fn new(
        cbm: &'a mut CBM,
        sample: &'a Sample,
        params: OptimizerParams,
    ) -> Result<Self>
    {
        checker::check_labeled(sample)?;
        params.validate()?;

        let (n_sample, n_feature) = sample.shape();
        if sample.n_label() != cbm.n_labels() {
            return Err(Error::ShapeMismatch(format!(
                "the sample has {} labels, the model has {}",
                sample.n_label(), cbm.n_labels(),
            )));
        }
        if n_feature != cbm.config().n_features {
            return Err(Error::ShapeMismatch(format!(
                "the sample has {n_feature} features, the model has {}",
                cbm.config().n_features,
            )));
        }

        let n_clusters = cbm.n_clusters();
        let responsibilities = vec![
            vec![1.0 / n_clusters as f64; n_clusters]; n_sample
        ];

        let label_targets = (0..sample.n_label())
            .map(|l| {
                sample.labels()
                    .iter()
                    .map(|y| {
                        if y.matches(l) { vec![0.0, 1.0] } else { vec![1.0, 0.0] }
                    })
                    .collect()
            })
            .collect();

        let multi_class_tree = RegressionTreeBuilder::new(sample)
            .max_leaves(params.multi_class.n_leaves)
            .lambda_l2(params.multi_class.penalty.leaf_regularization())
            .reduction(params.reduction)
            .build();
        let binary_tree = RegressionTreeBuilder::new(sample)
            .max_leaves(params.binary.n_leaves)
            .lambda_l2(params.binary.penalty.leaf_regularization())
            .reduction(params.reduction)
            .build();

        Ok(Self {
            cbm,
            sample,
            params,
            responsibilities,
            label_targets,
            gate_weights: vec![1.0; n_sample],
            multi_class_tree,
            binary_tree,
            history: Vec::new(),
        })
    }


    /// Returns the model under training.
    #[inline]
    pub fn model(&self) -> &CBM {
        self.cbm
    }


    /// Returns the training sample.
    #[inline]
    pub fn sample(&self) -> &Sample {
        self.sample
    }


    /// Returns the hyperparameters.
    #[inline]
    pub fn params(&self) -> &OptimizerParams {
        &self.params
    }


    /// Returns the current responsibility matrix (`N × K`).
    #[inline]
    pub fn responsibilities(&self) -> &[Vec<f64>] {
        &self.responsibilities[..]
    }


    /// Replace the responsibility matrix.
    /// Each row is normalized to sum to `1`;
    /// a row without positive mass becomes uniform.
    pub fn set_responsibilities(&mut self, mut responsibilities: Vec<Vec<f64>>)
        -> Result<()>
    {
        let n_sample = self.sample.shape().0;
        let n_clusters = self.cbm.n_clusters();
        if responsibilities.len() != n_sample {
            return Err(Error::ShapeMismatch(format!(
                "{} responsibility rows for {n_sample} instances",
                responsibilities.len(),
            )));
        }
        if let Some(i) = responsibilities.iter()
            .position(|row| row.len() != n_clusters)
        {
            return Err(Error::ShapeMismatch(format!(
                "responsibility row {i} has {} entries, expected {n_clusters}",
                responsibilities[i].len(),
            )));
        }
        if responsibilities.iter().flatten().any(|r| *r < 0.0) {
            return Err(Error::invalid(
                "responsibilities", "negative responsibility"
            ));
        }

        responsibilities.iter_mut()
            .for_each(|row| { utils::normalize_or_uniform(&mut row[..]); });
        self.responsibilities = responsibilities;
        Ok(())
    }


    /// Returns the negative log-likelihood after each iteration.
    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history[..]
    }


    /// Returns the negative log-likelihood after the last iteration.
    #[inline]
    pub fn last_value(&self) -> Option<f64> {
        self.history.last().copied()
    }


    /// Recomputes the responsibilities from the current model.
    /// Returns the number of instances whose every cluster has
    /// zero likelihood; those rows become uniform.
    pub fn e_step(&mut self) -> usize {
        let cbm = &*self.cbm;
        let sample = self.sample;
        let n_sample = sample.shape().0;

        let rows = self.params.reduction.map(n_sample, |i| {
            let log_joint = cbm.instance_probabilities(sample, i)
                .log_joint(sample.label(i));
            responsibilities_from_log_joint(&log_joint[..])
        });

        let mut n_degenerate = 0;
        self.responsibilities = rows.into_iter()
            .map(|(row, ok)| {
                if !ok { n_degenerate += 1; }
                checker::debug_check_distribution(&row[..]);
                row
            })
            .collect();

        if n_degenerate > 0 {
            warn!(
                "{n_degenerate} instances have zero likelihood \
                 under every cluster; their responsibilities are uniform"
            );
        }
        n_degenerate
    }


    /// Refits the gate against the responsibilities
    /// and every binary scorer against responsibility-weighted targets.
    pub fn m_step(&mut self) -> Result<()> {
        let sample = self.sample;
        let params = &self.params;
        let reduction = params.reduction;
        let responsibilities = &self.responsibilities[..];
        let label_targets = &self.label_targets[..];
        let binary_tree = &self.binary_tree;

        let (gate, binary) = self.cbm.parts_mut();

        let now = Instant::now();
        let value = gate.fit(
            sample,
            &self.gate_weights[..],
            responsibilities,
            &params.multi_class,
            &self.multi_class_tree,
            reduction,
        )?;
        debug!(
            "gate refit: objective = {value}, {} ms",
            now.elapsed().as_millis()
        );


        let n_clusters = binary.len();
        let cluster_weights = (0..n_clusters)
            .map(|k| {
                responsibilities.iter()
                    .map(|row| row[k])
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let now = Instant::now();
        let fit = |k: usize, l: usize, scorer: &mut crate::ClassifierModel| {
            scorer.fit(
                sample,
                &cluster_weights[k][..],
                &label_targets[l][..],
                &params.binary,
                binary_tree,
                reduction,
            )
            .map(|_| ())
        };

        if reduction.is_parallel() {
            binary.par_iter_mut()
                .enumerate()
                .try_for_each(|(k, scorers)| {
                    scorers.par_iter_mut()
                        .enumerate()
                        .try_for_each(|(l, scorer)| fit(k, l, scorer))
                })?;
        } else {
            for (k, scorers) in binary.iter_mut().enumerate() {
                for (l, scorer) in scorers.iter_mut().enumerate() {
                    fit(k, l, scorer)?;
                }
            }
        }
        debug!("binary refit: {} ms", now.elapsed().as_millis());

        Ok(())
    }


    /// Runs one E-step followed by one M-step,
    /// records the negative log-likelihood of the training label sets
    /// under the refitted model, and returns it.
    pub fn iterate(&mut self) -> Result<f64> {
        self.e_step();
        self.m_step()?;

        let nll = self.negative_log_likelihood();
        self.history.push(nll);
        info!(
            "EM iteration {}: negative log-likelihood = {nll}",
            self.history.len()
        );
        Ok(nll)
    }


    /// Returns `-Σ_i ln P(y_i | x_i)` under the current model.
    pub fn negative_log_likelihood(&self) -> f64 {
        let cbm = &*self.cbm;
        let sample = self.sample;
        self.params.reduction.sum(sample.shape().0, |i| {
            - cbm.instance_probabilities(sample, i)
                .log_probability(sample.label(i))
        })
    }
}


/// Normalizes `exp(log_joint)` into a distribution over clusters.
/// Returns the uniform distribution and `false`
/// if the total mass is zero or not finite.
pub(crate) fn responsibilities_from_log_joint(log_joint: &[f64])
    -> (Vec<f64>, bool)
{
    let n_clusters = log_joint.len();
    let z = utils::log_sum_exp(log_joint);
    if !z.is_finite() {
        return (vec![1.0 / n_clusters as f64; n_clusters], false);
    }

    let mut row = log_joint.iter()
        .map(|lj| (lj - z).exp())
        .collect::<Vec<_>>();
    let ok = utils::normalize_or_uniform(&mut row[..]);
    (row, ok)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_likelihood_rows_fall_back_to_uniform() {
        let log_joint = [f64::NEG_INFINITY; 4];
        let (row, ok) = responsibilities_from_log_joint(&log_joint);
        assert!(!ok);
        assert_eq!(row, vec![0.25; 4]);
    }


    #[test]
    fn responsibilities_sum_to_one() {
        let log_joint = [-1000.0, -1001.0, f64::NEG_INFINITY];
        let (row, ok) = responsibilities_from_log_joint(&log_joint);
        assert!(ok);
        let sum = row.iter().sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(row[2], 0.0);
        assert!(row[0] > row[1]);
    }
}
