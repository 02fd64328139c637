use serde::{Serialize, Deserialize};

use crate::{
    ProbabilisticClassifier,
    Regressor,
    Sample,
    Ensemble,
    RegressionTreeRegressor,
};


/// A multiclass scorer whose class scores are additive tree ensembles:
/// `score_k(x) = b_k + Σ_t η h_{k,t}(x)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostedClassifier {
    intercepts: Vec<f64>,
    ensembles: Vec<Ensemble<RegressionTreeRegressor>>,
    // `true` once the intercepts hold the target priors.
    #[serde(default)]
    has_prior: bool,
}


impl BoostedClassifier {
    /// Construct a scorer with no tree and zero intercepts.
    pub fn new(n_classes: usize) -> Self {
        Self {
            intercepts: vec![0.0; n_classes],
            ensembles: (0..n_classes).map(|_| Ensemble::new()).collect(),
            has_prior: false,
        }
    }


    /// Returns `true` if at least one tree has been added.
    pub fn has_trees(&self) -> bool {
        self.ensembles.iter().any(|ens| !ens.is_empty())
    }


    /// Returns the number of trees of each class.
    pub fn n_trees(&self) -> usize {
        self.ensembles.first().map(|ens| ens.len()).unwrap_or(0)
    }


    /// Returns `true` if the intercepts were set from
    /// the weighted target priors of some fit.
    /// A fit without positive weight leaves them unset.
    pub fn has_prior(&self) -> bool {
        self.has_prior
    }


    /// Returns the intercepts.
    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts[..]
    }


    pub(crate) fn set_intercepts(&mut self, intercepts: Vec<f64>) {
        debug_assert_eq!(intercepts.len(), self.intercepts.len());
        self.intercepts = intercepts;
        self.has_prior = true;
    }


    /// Append `weight * tree` to the score of `class`.
    pub(crate) fn push(
        &mut self,
        class: usize,
        weight: f64,
        tree: RegressionTreeRegressor,
    )
    {
        self.ensembles[class].push(weight, tree);
    }
}


impl ProbabilisticClassifier for BoostedClassifier {
    fn n_classes(&self) -> usize {
        self.intercepts.len()
    }


    fn predict_class_scores(&self, sample: &Sample, row: usize) -> Vec<f64> {
        self.intercepts.iter()
            .zip(&self.ensembles[..])
            .map(|(b, ens)| b + ens.predict(sample, row))
            .collect()
    }
}
