use crate::{Sample, MultiLabel, CBM};
use crate::common::ReductionStrategy;
use super::core::{Candidates, PluginPredictor};


/// Predicts the candidate with maximal probability,
/// which maximizes the expected subset accuracy.
///
/// # Example
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let cbm: CBM = unimplemented!();
/// # let train: Sample = unimplemented!();
/// # let test: Sample = unimplemented!();
/// let predictor = SubsetAccuracyPredictor::new(
///     &cbm, Candidates::support(&train),
/// );
/// let (set, prob) = predictor.predict_with_probability(&test, 0);
/// println!("{set} with probability {prob}");
/// ```
pub struct SubsetAccuracyPredictor<'a> {
    cbm: &'a CBM,
    candidates: Candidates,
    reduction: ReductionStrategy,
}


impl<'a> SubsetAccuracyPredictor<'a> {
    /// Construct a new predictor over the base pool `candidates`.
    pub fn new(cbm: &'a CBM, candidates: Candidates) -> Self {
        Self {
            cbm,
            candidates,
            reduction: ReductionStrategy::default(),
        }
    }


    /// Set the strategy of the batch predictions.
    pub fn reduction(mut self, reduction: ReductionStrategy) -> Self {
        self.reduction = reduction;
        self
    }


    /// Returns the model.
    pub fn model(&self) -> &CBM {
        self.cbm
    }
}


impl PluginPredictor for SubsetAccuracyPredictor<'_> {
    fn name(&self) -> &str {
        "Subset Accuracy"
    }


    fn reduction_strategy(&self) -> ReductionStrategy {
        self.reduction
    }


    fn predict_with_probability(&self, sample: &Sample, i: usize)
        -> (MultiLabel, f64)
    {
        let probs = self.cbm.instance_probabilities(sample, i);
        let mut best: Option<(MultiLabel, f64)> = None;
        for set in self.candidates.for_instance(&probs) {
            let p = probs.probability_with_constraint(&set);
            // Ties keep the earlier candidate.
            if best.as_ref().map_or(true, |(_, q)| p > *q) {
                best = Some((set, p));
            }
        }

        best.unwrap_or_else(|| (MultiLabel::new(self.cbm.n_labels()), 0.0))
    }
}
