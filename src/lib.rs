#![warn(missing_docs)]

//!
//! A crate that provides Conditional Bernoulli Mixtures (CBM)
//! for probabilistic multi-label classification.
//!
//! A CBM models the label set of an instance as a mixture
//! over `K` latent clusters:
//! a gate scorer gives the cluster distribution,
//! and within each cluster every label is an independent Bernoulli
//! given by its own binary scorer.
//!
//! - Training
//!     [`CBMOptimizer`] runs EM. Each M-step refits the gate and every
//!     (cluster, label) scorer on a weighted KL objective, either by
//!     functional gradient boosting of regression trees
//!     ([`FunctionalBoost`]) or by gradient descent on a log-linear
//!     scorer ([`WeightedLogLoss`]).
//!     [`Trainer`] drives the whole run with logging and checkpoints.
//!
//! - Prediction
//!     Plugin predictors ([`SubsetAccuracyPredictor`],
//!     [`InstanceF1Predictor`]) pick the label set that maximizes the
//!     expected value of their decision metric.
//!
//! - Calibration
//!     [`CardinalityCalibrator`] and [`LabelCalibrator`] fit isotonic
//!     maps on a validation sample;
//!     [`CalibrationReport`] summarizes reliability per probability bucket.
//!
//! # Example
//! ```no_run
//! use minicbm::prelude::*;
//!
//! let rows = vec![
//!     vec![(0, 1.0)],
//!     vec![(1, 1.0)],
//!     vec![(0, 1.0), (1, 1.0)],
//! ];
//! let train = Sample::from_sparse_rows(rows, 2)
//!     .unwrap()
//!     .with_labels(vec![vec![0], vec![1], vec![0, 1]], 2)
//!     .unwrap();
//!
//! let config = TrainConfig {
//!     n_clusters: 2,
//!     n_iterations: 5,
//!     ..TrainConfig::default()
//! };
//! let cbm = Trainer::new(config).unwrap().run(&train, None).unwrap();
//!
//! let predictor = SubsetAccuracyPredictor::new(
//!     &cbm, Candidates::support(&train),
//! );
//! let (set, prob) = predictor.predict_with_probability(&train, 0);
//! println!("predicted {set} with probability {prob}");
//! ```

pub mod error;
pub mod common;
pub mod sample;
pub mod hypothesis;
pub mod weak_learner;
pub mod classifier;
pub mod loss;
pub mod optimization;
pub mod booster;
pub mod cbm;
pub mod predictor;
pub mod calibration;
pub mod research;

pub mod prelude;


pub use error::{Error, Result};

pub use common::{MLMeasures, ReductionStrategy};

pub use sample::{
    Sample,
    Feature,
    DenseFeature,
    SparseFeature,
    MultiLabel,
};

pub use hypothesis::{
    Regressor,
    ProbabilisticClassifier,
    Ensemble,
};

pub use weak_learner::{
    WeakLearner,
    GradientHessian,
    RegressionTree,
    RegressionTreeBuilder,
    RegressionTreeRegressor,
};

pub use classifier::{
    Weights,
    ParameterFeature,
    LogisticRegression,
    BoostedClassifier,
    ClassifierType,
    ClassifierModel,
    SubProblemParams,
};

pub use loss::{
    Penalty,
    CacheState,
    WeightedLogLoss,
};

pub use optimization::{GradientDescent, Optimizable};

pub use booster::{Booster, FunctionalBoost};

pub use cbm::{
    AllowEmptyPolicy,
    CBMConfig,
    Initialization,
    ResumeMode,
    CBM,
    InstanceProbabilities,
    CBMBuilder,
    CBMOptimizer,
    OptimizerParams,
    initialize,
    Checkpoints,
    Trainer,
    TrainConfig,
};

pub use predictor::{
    Candidates,
    PluginPredictor,
    SubsetAccuracyPredictor,
    InstanceF1Predictor,
};

pub use calibration::{
    IsotonicRegression,
    BucketInfo,
    CardinalityCalibrator,
    LabelCalibrationMode,
    LabelCalibrator,
    CalibrationReport,
};
