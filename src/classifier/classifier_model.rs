use serde::{Serialize, Deserialize};

use crate::{
    Result,
    Sample,
    Booster,
    ProbabilisticClassifier,
    RegressionTree,
};
use crate::common::{checker, ReductionStrategy};
use crate::loss::{Penalty, WeightedLogLoss};
use crate::optimization::GradientDescent;
use crate::booster::FunctionalBoost;
use super::{
    BoostedClassifier,
    ClassifierType,
    LogisticRegression,
};


/// Hyperparameters of one kind of sub-problem
/// (the gate fit, or the per-label binary fits) of an M-step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubProblemParams {
    /// Boosting rounds, or gradient descent iterations for `lr`.
    pub n_iterations: usize,
    /// Shrinkage of each boosting round.
    pub shrinkage: f64,
    /// Maximal number of leaves of each tree.
    pub n_leaves: usize,
    /// Penalty on the weights.
    /// For boosting, it sets the L2 regularization on leaf values.
    pub penalty: Penalty,
}


impl Default for SubProblemParams {
    fn default() -> Self {
        Self {
            n_iterations: 10,
            shrinkage: 0.1,
            n_leaves: 2,
            penalty: Penalty::default(),
        }
    }
}


impl SubProblemParams {
    /// Check the parameters of `self`.
    pub fn validate(&self) -> Result<()> {
        checker::check_shrinkage(self.shrinkage)?;
        if self.n_leaves == 0 {
            return Err(crate::Error::invalid("n_leaves", "must be positive"));
        }
        self.penalty.validate()
    }
}


/// A multiclass scorer of either family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "model")]
pub enum ClassifierModel {
    /// Log-linear scorer.
    LogisticRegression(LogisticRegression),
    /// Boosted-tree scorer.
    Boosting(BoostedClassifier),
}


impl ClassifierModel {
    /// Construct an untrained scorer of the given family.
    pub fn new(kind: ClassifierType, n_classes: usize, n_features: usize)
        -> Self
    {
        match kind {
            ClassifierType::LogisticRegression => {
                Self::LogisticRegression(
                    LogisticRegression::new(n_classes, n_features)
                )
            },
            ClassifierType::Boosting => {
                Self::Boosting(BoostedClassifier::new(n_classes))
            },
        }
    }


    /// Returns the family of `self`.
    pub fn kind(&self) -> ClassifierType {
        match self {
            Self::LogisticRegression(_) => ClassifierType::LogisticRegression,
            Self::Boosting(_) => ClassifierType::Boosting,
        }
    }


    /// Refits `self` to the weighted targets
    /// and returns the final objective value.
    ///
    /// The boosted family grows trees with `weak_learner`
    /// and returns the weighted KL;
    /// the log-linear family runs gradient descent on
    /// [`WeightedLogLoss`] and returns its penalized value.
    pub fn fit(
        &mut self,
        sample: &Sample,
        weights: &[f64],
        targets: &[Vec<f64>],
        params: &SubProblemParams,
        weak_learner: &RegressionTree,
        reduction: ReductionStrategy,
    ) -> Result<f64>
    {
        match self {
            Self::LogisticRegression(model) => {
                let mut loss = WeightedLogLoss::new(
                    model, sample, weights, targets, params.penalty, reduction,
                )?;
                GradientDescent::new(params.n_iterations)
                    .minimize(&mut loss)
            },
            Self::Boosting(model) => {
                let value = FunctionalBoost::new(
                        model, sample, weights, targets, reduction,
                    )?
                    .n_iterations(params.n_iterations)
                    .shrinkage(params.shrinkage)?
                    .run(weak_learner);
                Ok(value)
            },
        }
    }
}


impl ProbabilisticClassifier for ClassifierModel {
    fn n_classes(&self) -> usize {
        match self {
            Self::LogisticRegression(model) => model.n_classes(),
            Self::Boosting(model) => model.n_classes(),
        }
    }


    fn predict_class_scores(&self, sample: &Sample, row: usize) -> Vec<f64> {
        match self {
            Self::LogisticRegression(model) => {
                model.predict_class_scores(sample, row)
            },
            Self::Boosting(model) => model.predict_class_scores(sample, row),
        }
    }
}
