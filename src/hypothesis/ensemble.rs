use serde::{Serialize, Deserialize};
use crate::{
    Regressor,
    Sample,
};


/// An additive combination `Σ_t w_t h_t(x)` of hypotheses.
/// Unlike a majority vote, the weights are not normalized;
/// the boosting routines store their shrinkage factor here.
/// You can read/write this struct by `Serde` trait.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ensemble<H> {
    /// Weights on each hypothesis in `self.hypotheses`.
    pub weights: Vec<f64>,
    /// Set of hypotheses.
    pub hypotheses: Vec<H>,
}


impl<H> Default for Ensemble<H> {
    fn default() -> Self {
        Self { weights: Vec::new(), hypotheses: Vec::new(), }
    }
}


impl<H> Ensemble<H> {
    /// Construct an empty ensemble.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }


    /// Append a pair `(weight, F)` to the current combined hypothesis.
    #[inline]
    pub fn push(&mut self, weight: f64, hypothesis: H) {
        self.weights.push(weight);
        self.hypotheses.push(hypothesis);
    }


    /// Returns the number of hypotheses.
    #[inline]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }


    /// Returns `true` if no hypothesis has been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }


    /// Decompose the combined hypothesis
    /// into the two vectors `Vec<f64>` and `Vec<F>`
    #[inline]
    pub fn decompose(self) -> (Vec<f64>, Vec<H>) {
        (self.weights, self.hypotheses)
    }
}


impl<F> Regressor for Ensemble<F>
    where F: Regressor,
{
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.weights.iter()
            .zip(&self.hypotheses[..])
            .map(|(w, h)| *w * h.predict(sample, row))
            .sum::<f64>()
    }
}
