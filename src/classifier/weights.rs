use serde::{Serialize, Deserialize};

use crate::{Error, Result};


/// The feature part of a parameter index.
/// The bias of each class occupies a reserved slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterFeature {
    /// The weight on the `j`-th feature.
    Feature(usize),
    /// The bias (intercept).
    Bias,
}


/// Flattened per-class weights of a log-linear scorer.
///
/// The vector consists of `n_classes` blocks of `n_features + 1` entries.
/// In each block, the first `n_features` entries are the feature weights
/// and the last one is the bias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    n_classes: usize,
    n_features: usize,
    values: Vec<f64>,
}


impl Weights {
    /// Construct all-zero weights.
    pub fn new(n_classes: usize, n_features: usize) -> Self {
        let values = vec![0.0; n_classes * (n_features + 1)];
        Self { n_classes, n_features, values, }
    }


    /// Returns the number of classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }


    /// Returns the number of features (bias excluded).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }


    /// Returns the total number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }


    /// Returns `true` if there is no parameter.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }


    /// Returns the position of the parameter `(class, feature)`
    /// in the flattened vector.
    #[inline]
    pub fn index(&self, class: usize, feature: ParameterFeature) -> usize {
        let offset = match feature {
            ParameterFeature::Feature(j) => j,
            ParameterFeature::Bias => self.n_features,
        };
        class * (self.n_features + 1) + offset
    }


    /// Inverse of [`Weights::index`].
    #[inline]
    pub fn decode(&self, index: usize) -> (usize, ParameterFeature) {
        let class = index / (self.n_features + 1);
        let offset = index % (self.n_features + 1);
        let feature = if offset == self.n_features {
            ParameterFeature::Bias
        } else {
            ParameterFeature::Feature(offset)
        };
        (class, feature)
    }


    /// Returns the feature weights of `class` (bias excluded).
    #[inline]
    pub fn weights_for_class(&self, class: usize) -> &[f64] {
        let start = class * (self.n_features + 1);
        &self.values[start..start + self.n_features]
    }


    /// Returns the bias of `class`.
    #[inline]
    pub fn bias(&self, class: usize) -> f64 {
        self.values[self.index(class, ParameterFeature::Bias)]
    }


    /// Returns the flattened vector.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..]
    }


    /// Replace every parameter.
    pub fn set_values(&mut self, values: Vec<f64>) -> Result<()> {
        if values.len() != self.values.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} parameters given, expected {}",
                values.len(), self.values.len(),
            )));
        }
        self.values = values;
        Ok(())
    }
}
