use serde::{Serialize, Deserialize};

use crate::{
    Result,
    Sample,
    MultiLabel,
    ProbabilisticClassifier,
    ClassifierModel,
};
use crate::common::utils;
use super::config::CBMConfig;

use std::path::Path;


/// A trained (or initialized) Conditional Bernoulli Mixture.
///
/// Holds one gate scorer over the `K` clusters
/// and `K × L` independent binary scorers.
/// No parameter is shared between clusters.
///
/// Construct a `CBM` with [`CBMBuilder`](crate::CBMBuilder)
/// and train it with [`CBMOptimizer`](crate::CBMOptimizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CBM {
    config: CBMConfig,
    gate: ClassifierModel,
    // binary[k][l] scores label `l` in cluster `k`.
    binary: Vec<Vec<ClassifierModel>>,
}


impl CBM {
    pub(crate) fn from_components(
        config: CBMConfig,
        gate: ClassifierModel,
        binary: Vec<Vec<ClassifierModel>>,
    ) -> Self
    {
        debug_assert_eq!(binary.len(), config.n_clusters);
        Self { config, gate, binary, }
    }


    /// Returns the structure of `self`.
    #[inline]
    pub fn config(&self) -> &CBMConfig {
        &self.config
    }


    /// Returns the number of clusters `K`.
    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }


    /// Returns the size of the label universe `L`.
    #[inline]
    pub fn n_labels(&self) -> usize {
        self.config.n_labels
    }


    /// Returns `true` if the empty label set may be predicted.
    #[inline]
    pub fn allow_empty(&self) -> bool {
        self.config.allow_empty
    }


    /// Returns the gate scorer.
    #[inline]
    pub fn gate(&self) -> &ClassifierModel {
        &self.gate
    }


    /// Returns the binary scorer of label `label` in cluster `cluster`.
    #[inline]
    pub fn binary_classifier(&self, cluster: usize, label: usize)
        -> &ClassifierModel
    {
        &self.binary[cluster][label]
    }


    pub(crate) fn parts_mut(&mut self)
        -> (&mut ClassifierModel, &mut Vec<Vec<ClassifierModel>>)
    {
        (&mut self.gate, &mut self.binary)
    }


    /// Returns the gate distribution `π(x_i)` over clusters.
    pub fn predict_cluster_probs(&self, sample: &Sample, i: usize)
        -> Vec<f64>
    {
        self.gate.predict_class_probs(sample, i)
    }


    /// Computes every cluster and label probability of instance `i`
    /// so that many candidate sets can be evaluated cheaply.
    pub fn instance_probabilities(&self, sample: &Sample, i: usize)
        -> InstanceProbabilities
    {
        let log_gate = self.gate.predict_log_class_probs(sample, i);

        let (log_match, log_miss) = self.binary.iter()
            .map(|scorers| {
                scorers.iter()
                    .map(|scorer| {
                        let lp = scorer.predict_log_class_probs(sample, i);
                        (lp[1], lp[0])
                    })
                    .unzip::<_, _, Vec<_>, Vec<_>>()
            })
            .unzip();

        InstanceProbabilities {
            log_gate,
            log_match,
            log_miss,
            allow_empty: self.config.allow_empty,
        }
    }


    /// Returns `P(y | x_i)` over the full label universe.
    pub fn probability_of_label_set(
        &self,
        sample: &Sample,
        i: usize,
        y: &MultiLabel,
    ) -> f64
    {
        self.instance_probabilities(sample, i).probability(y)
    }


    /// Returns `P(y | x_i)` restricted to the labels in `labels`.
    /// Labels outside `labels` are marginalized out.
    pub fn probability_of_label_set_on(
        &self,
        sample: &Sample,
        i: usize,
        y: &MultiLabel,
        labels: &[usize],
    ) -> f64
    {
        self.instance_probabilities(sample, i).probability_on(y, labels)
    }


    /// Returns `P(y | x_i)` under the allow-empty constraint.
    /// If the empty set is not allowed,
    /// it gets probability `0` and every other set is renormalized
    /// by `1 - P(∅ | x_i)`.
    pub fn probability_of_label_set_with_constraint(
        &self,
        sample: &Sample,
        i: usize,
        y: &MultiLabel,
    ) -> f64
    {
        self.instance_probabilities(sample, i).probability_with_constraint(y)
    }


    /// Returns the marginal probability of every label,
    /// `Σ_k π_k(x_i) b_kl(x_i)`.
    pub fn predict_class_probs(&self, sample: &Sample, i: usize) -> Vec<f64> {
        self.instance_probabilities(sample, i).marginals()
    }


    /// Write `self` to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        utils::save_json(self, path)
    }


    /// Read a model written by [`CBM::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        utils::load_json(path)
    }
}


/// Cluster and label probabilities of a single instance.
#[derive(Clone, Debug)]
pub struct InstanceProbabilities {
    log_gate: Vec<f64>,
    log_match: Vec<Vec<f64>>,
    log_miss: Vec<Vec<f64>>,
    allow_empty: bool,
}


impl InstanceProbabilities {
    /// Returns the number of clusters.
    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.log_gate.len()
    }


    /// Returns the size of the label universe.
    #[inline]
    pub fn n_labels(&self) -> usize {
        self.log_match.first().map(|row| row.len()).unwrap_or(0)
    }


    /// Returns `true` if the empty label set may be predicted.
    #[inline]
    pub fn allow_empty(&self) -> bool {
        self.allow_empty
    }


    /// Returns the gate distribution.
    pub fn cluster_probs(&self) -> Vec<f64> {
        self.log_gate.iter().map(|lp| lp.exp()).collect()
    }


    /// Returns `b_kl`, the probability of label `l` in cluster `k`.
    #[inline]
    pub fn label_prob(&self, k: usize, l: usize) -> f64 {
        self.log_match[k][l].exp()
    }


    /// Returns `ln π_k + ln P(y | x, k)` for every cluster `k`
    /// over the labels in `labels`.
    pub fn log_joint_on<I>(&self, y: &MultiLabel, labels: I) -> Vec<f64>
        where I: IntoIterator<Item = usize> + Clone,
    {
        self.log_gate.iter()
            .enumerate()
            .map(|(k, lg)| {
                lg + labels.clone().into_iter()
                    .map(|l| {
                        if y.matches(l) {
                            self.log_match[k][l]
                        } else {
                            self.log_miss[k][l]
                        }
                    })
                    .sum::<f64>()
            })
            .collect()
    }


    /// Returns `ln π_k + ln P(y | x, k)` for every cluster `k`.
    pub fn log_joint(&self, y: &MultiLabel) -> Vec<f64> {
        self.log_joint_on(y, 0..self.n_labels())
    }


    /// Returns `ln P(y | x)`.
    pub fn log_probability(&self, y: &MultiLabel) -> f64 {
        utils::log_sum_exp(&self.log_joint(y)[..])
    }


    /// Returns `P(y | x)`.
    pub fn probability(&self, y: &MultiLabel) -> f64 {
        self.log_probability(y).exp()
    }


    /// Returns `P(y | x)` restricted to `labels`.
    pub fn probability_on(&self, y: &MultiLabel, labels: &[usize]) -> f64 {
        let n_labels = self.n_labels();
        let labels = labels.iter()
            .copied()
            .filter(|&l| l < n_labels);
        utils::log_sum_exp(&self.log_joint_on(y, labels)[..]).exp()
    }


    /// Returns `P(∅ | x)`.
    pub fn probability_of_empty(&self) -> f64 {
        self.probability(&MultiLabel::new(self.n_labels()))
    }


    /// Returns `P(y | x)` under the allow-empty constraint.
    pub fn probability_with_constraint(&self, y: &MultiLabel) -> f64 {
        if self.allow_empty {
            return self.probability(y);
        }
        if y.is_empty() {
            return 0.0;
        }

        let rest = 1.0 - self.probability_of_empty();
        if rest <= 0.0 {
            0.0
        } else {
            (self.probability(y) / rest).min(1.0)
        }
    }


    /// Returns the marginal probability of every label.
    pub fn marginals(&self) -> Vec<f64> {
        let gate = self.cluster_probs();
        (0..self.n_labels())
            .map(|l| {
                gate.iter()
                    .enumerate()
                    .map(|(k, g)| g * self.label_prob(k, l))
                    .sum::<f64>()
            })
            .collect()
    }


    /// Returns the most probable label set of each cluster,
    /// i.e., `{l : b_kl > 1/2}`.
    pub fn cluster_modes(&self) -> Vec<MultiLabel> {
        let n_labels = self.n_labels();
        (0..self.n_clusters())
            .map(|k| {
                let labels = (0..n_labels)
                    .filter(|&l| self.log_match[k][l] > self.log_miss[k][l]);
                MultiLabel::from_labels(n_labels, labels)
            })
            .collect()
    }


    /// Returns `{l : P(l | x) > 1/2}`.
    pub fn marginal_mode(&self) -> MultiLabel {
        let n_labels = self.n_labels();
        let labels = self.marginals()
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p > 0.5)
            .map(|(l, _)| l);
        MultiLabel::from_labels(n_labels, labels)
    }
}
