//! Exports the types needed to train, predict and calibrate.
//!
pub use crate::{
    // Data -------------------------------------
    Sample,
    MultiLabel,
    ReductionStrategy,


    // Mixture ----------------------------------
    CBM,
    CBMBuilder,
    CBMOptimizer,
    OptimizerParams,
    SubProblemParams,
    Penalty,
    ClassifierType,
    AllowEmptyPolicy,
    Initialization,
    ResumeMode,
    initialize,
    Checkpoints,
    Trainer,
    TrainConfig,


    // Scorers ----------------------------------
    Booster,
    FunctionalBoost,
    BoostedClassifier,
    LogisticRegression,
    WeightedLogLoss,
    GradientDescent,
    WeakLearner,
    GradientHessian,
    RegressionTreeBuilder,
    ProbabilisticClassifier,
    Regressor,


    // Prediction -------------------------------
    Candidates,
    PluginPredictor,
    SubsetAccuracyPredictor,
    InstanceF1Predictor,
    MLMeasures,


    // Calibration ------------------------------
    IsotonicRegression,
    BucketInfo,
    CardinalityCalibrator,
    LabelCalibrationMode,
    LabelCalibrator,
    CalibrationReport,
};
