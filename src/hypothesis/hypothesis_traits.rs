use crate::Sample;
use crate::common::utils;


/// A trait that defines the behavor of regressor.
/// You only need to implement `predict` method.
pub trait Regressor {
    /// Predicts the target value of the i'th row of the `sample`.
    fn predict(&self, sample: &Sample, row: usize) -> f64;


    /// Predicts the target values of `sample`.
    fn predict_all(&self, sample: &Sample) -> Vec<f64>
    {
        let n_sample = sample.shape().0;
        (0..n_sample).map(|row| self.predict(sample, row))
            .collect::<Vec<_>>()
    }
}


/// A trait that defines the behavor of a multiclass scorer
/// whose class distribution is the softmax of its scores.
/// You only need to implement `n_classes` and `predict_class_scores`.
pub trait ProbabilisticClassifier {
    /// Returns the number of classes.
    fn n_classes(&self) -> usize;


    /// Computes the unnormalized class scores of the i'th row.
    fn predict_class_scores(&self, sample: &Sample, row: usize) -> Vec<f64>;


    /// Computes `ln P(k | x)` for every class `k`.
    fn predict_log_class_probs(&self, sample: &Sample, row: usize)
        -> Vec<f64>
    {
        let scores = self.predict_class_scores(sample, row);
        utils::log_softmax(&scores[..])
    }


    /// Computes `P(k | x)` for every class `k`.
    fn predict_class_probs(&self, sample: &Sample, row: usize) -> Vec<f64> {
        self.predict_log_class_probs(sample, row)
            .into_iter()
            .map(f64::exp)
            .collect()
    }


    /// Predicts the most probable class of the i'th row.
    fn predict(&self, sample: &Sample, row: usize) -> usize {
        let scores = self.predict_class_scores(sample, row);
        utils::argmax(&scores[..])
    }
}
