//! Provides functional gradient boosting
//! of the weighted KL objective of a multiclass scorer.
use tracing::debug;

use crate::{
    Result,
    Sample,
    Booster,
    WeakLearner,
    Regressor,
    ProbabilisticClassifier,
    BoostedClassifier,
    GradientHessian,
    RegressionTreeRegressor,
};
use crate::common::{
    checker,
    utils,
    ReductionStrategy,
};

use std::ops::ControlFlow;


/// Lower bound of `p (1 - p)` in the hessian.
const HESSIAN_FLOOR: f64 = 1e-16;
/// Lower bound of a class prior before taking the logarithm.
const PRIOR_FLOOR: f64 = 1e-16;
/// Default number of boosting rounds.
const DEFAULT_N_ITERATIONS: usize = 10;
/// Default shrinkage.
const DEFAULT_SHRINKAGE: f64 = 0.1;


/// Functional gradient boosting of
/// `Σ_i w_i KL(t_i || softmax(F(x_i)))`
/// with respect to the per-instance class scores `F`.
///
/// In each round, with `p_ik = softmax(F(x_i))_k`,
/// one regression tree per class is fitted to
/// ```text
/// grad_ik = w_i (p_ik - t_ik),
/// hess_ik = w_i max(p_ik (1 - p_ik), 1e-16),
/// ```
/// and `shrinkage * tree` is added to the score of that class.
/// Zero-weight instances have zero derivatives,
/// so the weak learner ignores them.
///
/// The intercepts start at the log of the weighted target priors
/// in the first fit with positive total weight,
/// even if earlier fits without weight already added trees.
///
/// # Example
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// # let targets: Vec<Vec<f64>> = unimplemented!();
/// let n_sample = sample.shape().0;
/// let weights = vec![1.0; n_sample];
/// let mut model = BoostedClassifier::new(3);
///
/// let tree = RegressionTreeBuilder::new(&sample)
///     .max_leaves(4)
///     .build();
///
/// let kl = FunctionalBoost::new(
///         &mut model, &sample, &weights, &targets,
///         ReductionStrategy::Parallel,
///     )
///     .unwrap()
///     .n_iterations(20)
///     .shrinkage(0.1)
///     .unwrap()
///     .run(&tree);
/// println!("weighted KL after boosting: {kl}");
/// ```
pub struct FunctionalBoost<'a> {
    model: &'a mut BoostedClassifier,
    sample: &'a Sample,
    weights: &'a [f64],
    targets: &'a [Vec<f64>],
    reduction: ReductionStrategy,

    n_iterations: usize,
    shrinkage: f64,

    // Current class scores of every instance.
    scores: Vec<Vec<f64>>,
}


impl<'a> FunctionalBoost<'a> {
    /// Construct a new instance that refines `model` on `sample`.
    pub fn new(
        model: &'a mut BoostedClassifier,
        sample: &'a Sample,
        weights: &'a [f64],
        targets: &'a [Vec<f64>],
        reduction: ReductionStrategy,
    ) -> Result<Self>
    {
        checker::check_sample(sample)?;
        let n_sample = sample.shape().0;
        checker::check_weights_and_targets(
            n_sample, model.n_classes(), weights, targets,
        )?;

        Ok(Self {
            model,
            sample,
            weights,
            targets,
            reduction,
            n_iterations: DEFAULT_N_ITERATIONS,
            shrinkage: DEFAULT_SHRINKAGE,
            scores: Vec::new(),
        })
    }


    /// Set the number of boosting rounds.
    pub fn n_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }


    /// Set the shrinkage (learning rate), in `(0, 1]`.
    pub fn shrinkage(mut self, shrinkage: f64) -> Result<Self> {
        checker::check_shrinkage(shrinkage)?;
        self.shrinkage = shrinkage;
        Ok(self)
    }


    /// Returns `Σ_i w_i KL(t_i || softmax(F(x_i)))` at the current scores.
    pub fn kl_divergence(&self) -> f64 {
        let scores = &self.scores[..];
        let weights = self.weights;
        let targets = self.targets;
        self.reduction.sum(weights.len(), |i| {
            let w = weights[i];
            if w == 0.0 { return 0.0; }
            let log_q = utils::log_softmax(&scores[i][..]);
            w * utils::kl_given_p_log_q(&targets[i][..], &log_q[..])
        })
    }


    /// Sets the intercepts to the log of the weighted target priors.
    fn init_intercepts(&mut self) {
        let n_classes = self.model.n_classes();
        let total = self.weights.iter().sum::<f64>();
        if total <= 0.0 { return; }

        let intercepts = (0..n_classes)
            .map(|k| {
                let mass = self.weights.iter()
                    .zip(self.targets)
                    .map(|(w, t)| w * t[k])
                    .sum::<f64>();
                (mass / total).max(PRIOR_FLOOR).ln()
            })
            .collect::<Vec<_>>();
        self.model.set_intercepts(intercepts);
    }
}


impl Booster<RegressionTreeRegressor> for FunctionalBoost<'_> {
    type Output = f64;


    fn name(&self) -> &str {
        "Functional Gradient Boosting"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let (n_sample, n_feature) = self.sample.shape();
        let info = Vec::from([
            ("# of examples", format!("{n_sample}")),
            ("# of features", format!("{n_feature}")),
            ("# of classes", format!("{}", self.model.n_classes())),
            ("Shrinkage", format!("{}", self.shrinkage)),
            ("Max iteration", format!("{}", self.n_iterations)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) {
        if !self.model.has_prior() {
            self.init_intercepts();
        }

        let model = &*self.model;
        let sample = self.sample;
        self.scores = self.reduction.map(sample.shape().0, |i| {
            model.predict_class_scores(sample, i)
        });
    }


    fn boost<W>(
        &mut self,
        weak_learner: &W,
        iteration: usize,
    ) -> ControlFlow<usize>
        where W: WeakLearner<Hypothesis = RegressionTreeRegressor>,
    {
        if self.n_iterations < iteration {
            return ControlFlow::Break(self.n_iterations);
        }

        let n_sample = self.sample.shape().0;
        let n_classes = self.model.n_classes();
        let weights = self.weights;
        let targets = self.targets;
        let sample = self.sample;

        let probs = {
            let scores = &self.scores[..];
            self.reduction.map(n_sample, |i| {
                if weights[i] == 0.0 { return Vec::new(); }
                utils::log_softmax(&scores[i][..])
                    .into_iter()
                    .map(f64::exp)
                    .collect::<Vec<_>>()
            })
        };

        let mut updates = Vec::with_capacity(n_classes);
        for k in 0..n_classes {
            let gh = self.reduction.map(n_sample, |i| {
                let w = weights[i];
                if w == 0.0 { return GradientHessian::default(); }
                let p = probs[i][k];
                let grad = w * (p - targets[i][k]);
                let hess = w * (p * (1.0 - p)).max(HESSIAN_FLOOR);
                GradientHessian::new(grad, hess)
            });

            let tree = weak_learner.produce(sample, &gh[..]);
            let predictions = self.reduction.map(n_sample, |i| {
                tree.predict(sample, i)
            });
            updates.push((tree, predictions));
        }


        for (k, (tree, predictions)) in updates.into_iter().enumerate() {
            self.scores.iter_mut()
                .zip(predictions)
                .for_each(|(score, p)| { score[k] += self.shrinkage * p; });
            self.model.push(k, self.shrinkage, tree);
        }

        debug!(
            "boosting round {iteration}: weighted KL = {}",
            self.kl_divergence()
        );

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.kl_divergence()
    }
}
