use tracing::info;

use crate::{
    Error,
    Result,
    Sample,
    ClassifierModel,
    ClassifierType,
};
use crate::common::checker;
use super::config::{AllowEmptyPolicy, CBMConfig};
use super::model::CBM;


/// A struct that builds [`CBM`].
/// The structure of the mixture is fixed by [`CBMBuilder::build`].
///
/// # Example
///
/// ```no_run
/// use minicbm::prelude::*;
///
/// # let sample: Sample = unimplemented!();
/// let cbm = CBMBuilder::new(&sample)
///     .n_clusters(4)
///     .multi_class_classifier_type(ClassifierType::Boosting)
///     .binary_classifier_type(ClassifierType::Boosting)
///     .allow_empty(AllowEmptyPolicy::Auto)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CBMBuilder<'a> {
    sample: &'a Sample,
    n_clusters: usize,
    multi_class_classifier_type: ClassifierType,
    binary_classifier_type: ClassifierType,
    allow_empty: AllowEmptyPolicy,
}


impl<'a> CBMBuilder<'a> {
    /// Construct a new instance of `CBMBuilder` for the training `sample`.
    /// By default,
    /// ```text
    /// n_clusters: 1,
    /// multi_class_classifier_type: ClassifierType::Boosting,
    /// binary_classifier_type: ClassifierType::Boosting,
    /// allow_empty: AllowEmptyPolicy::Auto,
    /// ```
    pub fn new(sample: &'a Sample) -> Self {
        Self {
            sample,
            n_clusters: 1,
            multi_class_classifier_type: ClassifierType::Boosting,
            binary_classifier_type: ClassifierType::Boosting,
            allow_empty: AllowEmptyPolicy::Auto,
        }
    }


    /// Set the number of clusters.
    pub fn n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }


    /// Set the family of the gate.
    pub fn multi_class_classifier_type(mut self, kind: ClassifierType)
        -> Self
    {
        self.multi_class_classifier_type = kind;
        self
    }


    /// Set the family of the per-label scorers.
    pub fn binary_classifier_type(mut self, kind: ClassifierType) -> Self {
        self.binary_classifier_type = kind;
        self
    }


    /// Set the allow-empty policy.
    pub fn allow_empty(mut self, policy: AllowEmptyPolicy) -> Self {
        self.allow_empty = policy;
        self
    }


    /// Build an untrained [`CBM`].
    /// The `auto` allow-empty policy is resolved against the label sets
    /// of the training sample.
    pub fn build(self) -> Result<CBM> {
        checker::check_labeled(self.sample)?;
        if self.n_clusters == 0 {
            return Err(Error::invalid("n_clusters", "must be positive"));
        }

        let n_features = self.sample.shape().1;
        let n_labels = self.sample.n_label();
        let allow_empty = self.allow_empty
            .resolve(self.sample.contains_empty_label_set());

        let config = CBMConfig {
            n_clusters: self.n_clusters,
            n_labels,
            n_features,
            multi_class_classifier_type: self.multi_class_classifier_type,
            binary_classifier_type: self.binary_classifier_type,
            allow_empty,
        };
        info!(
            "built a mixture with {} clusters over {n_labels} labels \
             (gate: {}, binary: {}, allow empty: {allow_empty})",
            self.n_clusters,
            self.multi_class_classifier_type,
            self.binary_classifier_type,
        );

        let gate = ClassifierModel::new(
            self.multi_class_classifier_type, self.n_clusters, n_features,
        );
        let binary = (0..self.n_clusters)
            .map(|_| {
                (0..n_labels)
                    .map(|_| {
                        ClassifierModel::new(
                            self.binary_classifier_type, 2, n_features,
                        )
                    })
                    .collect()
            })
            .collect();

        Ok(CBM::from_components(config, gate, binary))
    }
}
