use crate::{
    Result,
    Error,
    Sample,
    ProbabilisticClassifier,
    LogisticRegression,
};
use crate::common::{
    checker,
    utils,
    ReductionStrategy,
};
use crate::classifier::ParameterFeature;
use crate::optimization::Optimizable;
use super::penalty::Penalty;
use super::cache::{LossCache, CacheState};


/// The weighted KL objective of a [`LogisticRegression`] scorer.
///
/// For instance weights `w_i`, target distributions `t_i`
/// and predicted distributions `p_i`,
/// ```text
/// KL = Σ_i w_i KL(t_i || p_i)
/// ```
/// and the value is `KL + penalty` (Gaussian prior)
/// or `KL / N + penalty` (elastic net).
///
/// Instances with `w_i == 0` are skipped everywhere:
/// they contribute nothing to the value, the gradient,
/// and the sufficient statistics.
///
/// The empirical counts `Σ_i w_i t_ik x_ij` are computed once,
/// in [`WeightedLogLoss::new`].
/// Probabilities, value and gradient are cached
/// and dropped together by [`WeightedLogLoss::set_parameters`].
pub struct WeightedLogLoss<'a> {
    model: &'a mut LogisticRegression,
    sample: &'a Sample,
    weights: &'a [f64],
    targets: &'a [Vec<f64>],
    penalty: Penalty,
    reduction: ReductionStrategy,

    empirical_counts: Vec<f64>,
    cache: LossCache,
}


impl<'a> WeightedLogLoss<'a> {
    /// Construct a new loss over `sample`.
    ///
    /// `weights[i]` is the weight and `targets[i]` the target distribution
    /// of the `i`-th instance.
    pub fn new(
        model: &'a mut LogisticRegression,
        sample: &'a Sample,
        weights: &'a [f64],
        targets: &'a [Vec<f64>],
        penalty: Penalty,
        reduction: ReductionStrategy,
    ) -> Result<Self>
    {
        checker::check_sample(sample)?;
        penalty.validate()?;

        let (n_sample, n_feature) = sample.shape();
        let n_classes = model.n_classes();
        checker::check_weights_and_targets(
            n_sample, n_classes, weights, targets,
        )?;

        if model.weights().n_features() != n_feature {
            return Err(Error::ShapeMismatch(format!(
                "the scorer has {} features, the sample has {n_feature}",
                model.weights().n_features(),
            )));
        }

        let empirical_counts = sufficient_counts(
            sample, weights, targets, n_classes, reduction,
        );

        Ok(Self {
            model,
            sample,
            weights,
            targets,
            penalty,
            reduction,
            empirical_counts,
            cache: LossCache::new(),
        })
    }


    /// Returns the state of the probability cache.
    #[inline]
    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }


    /// Returns the current parameters.
    #[inline]
    pub fn parameters(&self) -> &[f64] {
        self.model.weights().as_slice()
    }


    /// Replace the parameters of the scorer.
    /// Probabilities, value and gradient are invalidated together.
    pub fn set_parameters(&mut self, parameters: Vec<f64>) -> Result<()> {
        self.model.weights_mut().set_values(parameters)?;
        self.cache.invalidate();
        Ok(())
    }


    /// Returns `Σ_i w_i t_ik x_ij` for every parameter `(k, j)`.
    /// The bias parameters use `x_ij = 1`.
    #[inline]
    pub fn empirical_counts(&self) -> &[f64] {
        &self.empirical_counts[..]
    }


    /// Returns `Σ_i w_i p_ik x_ij` for every parameter `(k, j)`
    /// under the current parameters.
    pub fn predicted_counts(&mut self) -> Vec<f64> {
        self.refresh();
        sufficient_counts(
            self.sample,
            self.weights,
            self.cache.probs(),
            self.model.n_classes(),
            self.reduction,
        )
    }


    /// Returns `Σ_i w_i KL(t_i || p_i)`.
    pub fn kl_divergence(&mut self) -> f64 {
        self.refresh();
        let log_probs = self.cache.log_probs();
        let weights = self.weights;
        let targets = self.targets;

        self.reduction.sum(weights.len(), |i| {
            let w = weights[i];
            if w == 0.0 { return 0.0; }
            w * utils::kl_given_p_log_q(&targets[i][..], &log_probs[i][..])
        })
    }


    /// Returns the penalty on the current feature weights.
    #[inline]
    pub fn penalty_value(&self) -> f64 {
        self.penalty.value(self.model.weights())
    }


    /// Returns the objective value.
    pub fn value(&mut self) -> f64 {
        if let Some(value) = self.cache.value() {
            return value;
        }

        let mut kl = self.kl_divergence();
        if self.penalty.is_averaged() {
            kl /= self.weights.len() as f64;
        }
        let value = kl + self.penalty_value();

        self.cache.set_value(value);
        value
    }


    /// Returns the gradient of [`WeightedLogLoss::value`]
    /// with respect to every parameter.
    pub fn gradient(&mut self) -> &[f64] {
        if self.cache.gradient().is_none() {
            let gradient = self.compute_gradient();
            self.cache.set_gradient(gradient);
        }
        self.cache.gradient().unwrap_or(&[])
    }


    fn compute_gradient(&mut self) -> Vec<f64> {
        let predicted = self.predicted_counts();
        let n_sample = self.weights.len() as f64;
        let averaged = self.penalty.is_averaged();
        let penalty = self.penalty;
        let layout = self.model.weights();
        let values = layout.as_slice();

        predicted.into_iter()
            .zip(&self.empirical_counts[..])
            .enumerate()
            .map(|(idx, (pred, emp))| {
                let mut g = pred - emp;
                if averaged { g /= n_sample; }
                match layout.decode(idx).1 {
                    ParameterFeature::Bias => g,
                    ParameterFeature::Feature(_) => {
                        g + penalty.derivative(values[idx])
                    },
                }
            })
            .collect()
    }


    /// Recompute the probabilities if the parameters have changed.
    fn refresh(&mut self) {
        if self.cache.state() == CacheState::Valid {
            return;
        }
        self.cache.begin_refresh();

        let model = &*self.model;
        let sample = self.sample;
        let weights = self.weights;
        let log_probs = self.reduction.map(weights.len(), |i| {
            if weights[i] == 0.0 {
                Vec::new()
            } else {
                model.predict_log_class_probs(sample, i)
            }
        });
        let probs = log_probs.iter()
            .map(|row| row.iter().map(|lp| lp.exp()).collect())
            .collect();

        self.cache.finish_refresh(log_probs, probs);
    }
}


impl Optimizable for WeightedLogLoss<'_> {
    fn value(&mut self) -> f64 {
        WeightedLogLoss::value(self)
    }


    fn gradient(&mut self) -> Vec<f64> {
        WeightedLogLoss::gradient(self).to_vec()
    }


    fn parameters(&self) -> Vec<f64> {
        WeightedLogLoss::parameters(self).to_vec()
    }


    fn set_parameters(&mut self, parameters: Vec<f64>) -> Result<()> {
        WeightedLogLoss::set_parameters(self, parameters)
    }
}


/// Computes `Σ_i w_i dist_ik x_ij` for every parameter `(k, j)`
/// by scanning the non-zero entries of each feature column.
/// Bias parameters scan every instance.
fn sufficient_counts(
    sample: &Sample,
    weights: &[f64],
    dist: &[Vec<f64>],
    n_classes: usize,
    reduction: ReductionStrategy,
) -> Vec<f64>
{
    let n_feature = sample.shape().1;
    let block = n_feature + 1;

    reduction.map(n_classes * block, |idx| {
        let k = idx / block;
        let j = idx % block;

        if j == n_feature {
            weights.iter()
                .zip(dist)
                .filter(|(w, _)| **w != 0.0)
                .map(|(w, d)| w * d[k])
                .sum::<f64>()
        } else {
            sample.feature(j)
                .nonzeroes()
                .filter(|(i, _)| weights[*i] != 0.0)
                .map(|(i, x)| weights[i] * dist[i][k] * x)
                .sum::<f64>()
        }
    })
}


/// Point-mass target distributions for single-label data.
pub fn one_hot(labels: &[usize], n_classes: usize) -> Vec<Vec<f64>> {
    labels.iter()
        .map(|&y| {
            let mut t = vec![0.0; n_classes];
            if let Some(tk) = t.get_mut(y) { *tk = 1.0; }
            t
        })
        .collect()
}


/// Unit weight on every instance.
pub fn uniform_weights(n_sample: usize) -> Vec<f64> {
    vec![1.0; n_sample]
}
