use serde::{Serialize, Deserialize};

use crate::{Sample, MultiLabel, InstanceProbabilities};
use crate::common::ReductionStrategy;

use std::collections::HashSet;


/// The base pool of candidate label sets.
///
/// The candidates of an instance are the base pool,
/// the modal set of every cluster
/// and the modal set of the label marginals.
/// The empty set is dropped when the model forbids it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidates {
    sets: Vec<MultiLabel>,
}


impl Candidates {
    /// The distinct label sets observed in `sample`.
    pub fn support(sample: &Sample) -> Self {
        Self { sets: sample.label_sets() }
    }


    /// Every label set over `n_labels` labels
    /// with at most `max_cardinality` labels.
    pub fn up_to_cardinality(n_labels: usize, max_cardinality: usize) -> Self {
        let mut sets = vec![MultiLabel::new(n_labels)];
        let mut stack = vec![(MultiLabel::new(n_labels), 0_usize)];
        while let Some((set, next)) = stack.pop() {
            if set.cardinality() == max_cardinality { continue; }
            for l in next..n_labels {
                let mut child = set.clone();
                child.add(l);
                sets.push(child.clone());
                stack.push((child, l + 1));
            }
        }
        Self { sets }
    }


    /// Use `sets` as the base pool.
    pub fn from_sets(sets: Vec<MultiLabel>) -> Self {
        Self { sets }
    }


    /// Returns the base pool.
    #[inline]
    pub fn sets(&self) -> &[MultiLabel] {
        &self.sets[..]
    }


    /// Returns the number of sets in the base pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.sets.len()
    }


    /// Returns `true` if the base pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }


    /// Returns the distinct candidates of one instance.
    ///
    /// The result is never empty:
    /// if every candidate is the forbidden empty set,
    /// the singleton of the most probable label is returned.
    pub fn for_instance(&self, probs: &InstanceProbabilities)
        -> Vec<MultiLabel>
    {
        let allow_empty = probs.allow_empty();
        let mut seen = HashSet::new();

        let mut candidates = self.sets.iter()
            .cloned()
            .chain(probs.cluster_modes())
            .chain(std::iter::once(probs.marginal_mode()))
            .filter(|set| allow_empty || !set.is_empty())
            .filter(|set| seen.insert(set.clone()))
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            let n_labels = probs.n_labels();
            let marginals = probs.marginals();
            let best = (0..n_labels)
                .max_by(|&a, &b| marginals[a].total_cmp(&marginals[b]));
            if let Some(l) = best {
                candidates.push(MultiLabel::from_labels(n_labels, [l]));
            } else {
                candidates.push(MultiLabel::new(n_labels));
            }
        }
        candidates
    }
}


/// A decision rule from model probabilities to one label set.
///
/// Implementors only need
/// [`PluginPredictor::name`] and
/// [`PluginPredictor::predict_with_probability`].
pub trait PluginPredictor: Sync {
    /// Returns the name of the decision rule.
    fn name(&self) -> &str;


    /// Returns the predicted label set of instance `i`
    /// and its probability under the model.
    fn predict_with_probability(&self, sample: &Sample, i: usize)
        -> (MultiLabel, f64);


    /// Returns the predicted label set of instance `i`.
    fn predict(&self, sample: &Sample, i: usize) -> MultiLabel {
        self.predict_with_probability(sample, i).0
    }


    /// Returns the strategy used by the batch predictions
    /// and by the calibrators fitted on this predictor.
    fn reduction_strategy(&self) -> ReductionStrategy {
        ReductionStrategy::Sequential
    }


    /// Predicts every instance of `sample`.
    fn predict_all(&self, sample: &Sample) -> Vec<MultiLabel> {
        let n_sample = sample.shape().0;
        self.reduction_strategy()
            .map(n_sample, |i| self.predict(sample, i))
    }


    /// Predicts every instance of `sample`,
    /// with the probability of each prediction.
    fn predict_all_with_probability(&self, sample: &Sample)
        -> Vec<(MultiLabel, f64)>
    {
        let n_sample = sample.shape().0;
        self.reduction_strategy()
            .map(n_sample, |i| self.predict_with_probability(sample, i))
    }
}
