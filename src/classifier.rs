//! Multiclass scorers used as the gate and the per-label models
//! of a mixture.

/// Defines the flattened parameter vector of a log-linear scorer.
pub mod weights;
/// Defines the log-linear (logistic regression) scorer.
pub mod logistic_regression;
/// Defines the boosted-tree scorer.
pub mod boosted_classifier;
/// Defines the classifier family selector.
pub mod classifier_type;
/// Defines the serializable union of the scorers.
pub mod classifier_model;


pub use weights::{Weights, ParameterFeature};
pub use logistic_regression::LogisticRegression;
pub use boosted_classifier::BoostedClassifier;
pub use classifier_type::ClassifierType;
pub use classifier_model::{ClassifierModel, SubProblemParams};
