use serde::{Serialize, Deserialize};

use crate::{Result, Sample, MultiLabel};
use crate::common::checker;
use crate::predictor::PluginPredictor;

use std::fmt;


/// Multi-label evaluation measures of a predictor on a labeled sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MLMeasures {
    /// Fraction of instances whose label set is predicted exactly.
    pub subset_accuracy: f64,
    /// Mean per-instance F1.
    pub instance_f1: f64,
    /// Fraction of mispredicted (instance, label) pairs.
    pub hamming_loss: f64,
    /// Number of evaluated instances.
    pub n_sample: usize,
}


impl MLMeasures {
    /// Evaluates `predictor` on `sample`.
    pub fn evaluate<P>(predictor: &P, sample: &Sample) -> Result<Self>
        where P: PluginPredictor + ?Sized,
    {
        checker::check_labeled(sample)?;
        let predictions = predictor.predict_all(sample);
        Ok(Self::from_predictions(sample.labels(), &predictions[..]))
    }


    /// Computes the measures from paired truths and predictions.
    pub fn from_predictions(truths: &[MultiLabel], predictions: &[MultiLabel])
        -> Self
    {
        let n_sample = truths.len().min(predictions.len());
        if n_sample == 0 {
            return Self::default();
        }
        let n_labels = truths[0].n_label().max(1);

        let mut exact = 0_usize;
        let mut f1 = 0.0;
        let mut mistakes = 0_usize;
        for (y, y_hat) in truths.iter().zip(predictions) {
            if y == y_hat { exact += 1; }
            f1 += instance_f1(y, y_hat);

            let common = y.intersection_count(y_hat);
            mistakes += y.cardinality() + y_hat.cardinality() - 2 * common;
        }

        let n = n_sample as f64;
        Self {
            subset_accuracy: exact as f64 / n,
            instance_f1: f1 / n,
            hamming_loss: mistakes as f64 / (n * n_labels as f64),
            n_sample,
        }
    }
}


/// Returns `2 |y ∩ ŷ| / (|y| + |ŷ|)`, which is `1` if both are empty.
pub fn instance_f1(y: &MultiLabel, y_hat: &MultiLabel) -> f64 {
    let denom = y.cardinality() + y_hat.cardinality();
    if denom == 0 {
        return 1.0;
    }
    2.0 * y.intersection_count(y_hat) as f64 / denom as f64
}


impl fmt::Display for MLMeasures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subset accuracy = {:.5}, instance F1 = {:.5}, \
             hamming loss = {:.5} ({} instances)",
            self.subset_accuracy,
            self.instance_f1,
            self.hamming_loss,
            self.n_sample,
        )
    }
}
