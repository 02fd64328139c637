use serde::{Serialize, Deserialize};

use crate::{Error, Result};
use crate::classifier::Weights;


/// The penalty on the feature weights of a log-linear scorer.
/// Biases are never penalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Penalty {
    /// Gaussian prior, `Σ_c ‖w_c‖² / (2 variance)`.
    Gaussian {
        /// Prior variance.
        variance: f64,
    },
    /// Elastic net,
    /// `regularization · Σ_c [(1 - l1_ratio) ‖w_c‖² / 2 + l1_ratio ‖w_c‖₁]`.
    ///
    /// In this mode the KL term is averaged over the instances.
    ElasticNet {
        /// Overall strength.
        regularization: f64,
        /// Share of the L1 part, in `[0, 1]`.
        l1_ratio: f64,
    },
}


impl Default for Penalty {
    fn default() -> Self {
        Self::Gaussian { variance: 1.0 }
    }
}


impl Penalty {
    /// Check the parameters of `self`.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Gaussian { variance } => {
                if !(variance > 0.0 && variance.is_finite()) {
                    return Err(Error::invalid(
                        "variance", format!("{variance} is not positive")
                    ));
                }
            },
            Self::ElasticNet { regularization, l1_ratio } => {
                if !(regularization >= 0.0 && regularization.is_finite()) {
                    return Err(Error::invalid(
                        "regularization",
                        format!("{regularization} is negative"),
                    ));
                }
                if !(0.0..=1.0).contains(&l1_ratio) {
                    return Err(Error::invalid(
                        "l1_ratio", format!("{l1_ratio} is not in [0, 1]")
                    ));
                }
            },
        }
        Ok(())
    }


    /// Returns `true` if the KL term is averaged over instances.
    #[inline]
    pub fn is_averaged(&self) -> bool {
        matches!(self, Self::ElasticNet { .. })
    }


    /// The penalty value on the feature weights of `weights`.
    pub fn value(&self, weights: &Weights) -> f64 {
        (0..weights.n_classes())
            .map(|k| {
                let w = weights.weights_for_class(k);
                let l2 = w.iter().map(|v| v * v).sum::<f64>();
                match *self {
                    Self::Gaussian { variance } => l2 / (2.0 * variance),
                    Self::ElasticNet { regularization, l1_ratio } => {
                        let l1 = w.iter().map(|v| v.abs()).sum::<f64>();
                        regularization
                            * ((1.0 - l1_ratio) * 0.5 * l2 + l1_ratio * l1)
                    },
                }
            })
            .sum::<f64>()
    }


    /// The (sub-)derivative of the penalty at a feature weight `w`.
    /// The sub-gradient of `|w|` at `0` is taken as `0`.
    #[inline]
    pub fn derivative(&self, w: f64) -> f64 {
        match *self {
            Self::Gaussian { variance } => w / variance,
            Self::ElasticNet { regularization, l1_ratio } => {
                let sign = if w > 0.0 {
                    1.0
                } else if w < 0.0 {
                    -1.0
                } else {
                    0.0
                };
                regularization * ((1.0 - l1_ratio) * w + l1_ratio * sign)
            },
        }
    }


    /// The L2 regularization on leaf values when this penalty
    /// is used for a boosted scorer.
    #[inline]
    pub fn leaf_regularization(&self) -> f64 {
        match *self {
            Self::Gaussian { variance } => 1.0 / variance,
            Self::ElasticNet { regularization, l1_ratio } => {
                regularization * (1.0 - l1_ratio)
            },
        }
    }
}
