use serde::{Serialize, Deserialize};

use crate::{ProbabilisticClassifier, Sample};
use crate::common::utils;
use super::weights::Weights;


/// A log-linear multiclass scorer:
/// `score_k(x) = <w_k, x> + b_k` and `P(k | x) = softmax(score(x))_k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Weights,
}


impl LogisticRegression {
    /// Construct a scorer with all-zero weights,
    /// i.e., the uniform distribution over classes.
    pub fn new(n_classes: usize, n_features: usize) -> Self {
        Self { weights: Weights::new(n_classes, n_features) }
    }


    /// Returns the weights.
    #[inline]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }


    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut Weights {
        &mut self.weights
    }
}


impl ProbabilisticClassifier for LogisticRegression {
    fn n_classes(&self) -> usize {
        self.weights.n_classes()
    }


    fn predict_class_scores(&self, sample: &Sample, row: usize) -> Vec<f64> {
        let x = sample.row(row);
        (0..self.weights.n_classes())
            .map(|k| {
                utils::sparse_dot(x, self.weights.weights_for_class(k))
                    + self.weights.bias(k)
            })
            .collect()
    }
}
