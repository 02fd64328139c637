use serde::{Serialize, Deserialize};

use crate::{Result, Sample, CBM};
use crate::common::{checker, ReductionStrategy};
use crate::predictor::PluginPredictor;
use super::{
    bucket::BucketInfo,
    cardinality::CardinalityCalibrator,
    label_isotonic::LabelCalibrator,
};

use std::fmt;


/// The four reliability tables of one evaluation pass:
/// raw and calibrated probabilities
/// of whole predicted sets and of single labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Raw probabilities of predicted sets.
    pub raw_set: BucketInfo,
    /// Calibrated probabilities of predicted sets.
    pub calibrated_set: BucketInfo,
    /// Raw label marginals.
    pub raw_label: BucketInfo,
    /// Calibrated label marginals.
    pub calibrated_label: BucketInfo,
}


impl CalibrationReport {
    /// Evaluates both calibrators on `sample`.
    ///
    /// A set counts as correct if it equals the true set;
    /// a label counts as correct if it is in the true set.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate<P>(
        cbm: &CBM,
        predictor: &P,
        set_calibrator: &CardinalityCalibrator,
        label_calibrator: &LabelCalibrator,
        sample: &Sample,
        n_buckets: usize,
        reduction: ReductionStrategy,
    ) -> Result<Self>
        where P: PluginPredictor + ?Sized,
    {
        checker::check_labeled(sample)?;
        let n_sample = sample.shape().0;

        let (raw_set, calibrated_set) = reduction.fold(
            n_sample,
            || (BucketInfo::new(n_buckets), BucketInfo::new(n_buckets)),
            |(mut raw, mut calibrated), i| {
                let set = predictor.predict(sample, i);
                let p = cbm
                    .probability_of_label_set_with_constraint(sample, i, &set);
                let correct = &set == sample.label(i);
                raw.add(p, correct);
                calibrated.add(
                    set_calibrator.calibrate(p, set.cardinality()), correct,
                );
                (raw, calibrated)
            },
            |(r1, c1), (r2, c2)| (r1.absorb(r2), c1.absorb(c2)),
        );

        let (raw_label, calibrated_label) = reduction.fold(
            n_sample,
            || (BucketInfo::new(n_buckets), BucketInfo::new(n_buckets)),
            |(mut raw, mut calibrated), i| {
                let y = sample.label(i);
                let marginals = cbm.predict_class_probs(sample, i);
                for (l, p) in marginals.into_iter().enumerate() {
                    let matched = y.matches(l);
                    raw.add(p, matched);
                    calibrated.add(label_calibrator.calibrate(l, p), matched);
                }
                (raw, calibrated)
            },
            |(r1, c1), (r2, c2)| (r1.absorb(r2), c1.absorb(c2)),
        );

        Ok(Self { raw_set, calibrated_set, raw_label, calibrated_label })
    }
}


impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", self.raw_set.table("uncalibrated set probability"))?;
        writeln!(f, "{}\n", self.calibrated_set.table("calibrated set probability"))?;
        writeln!(f, "{}\n", self.raw_label.table("uncalibrated label probabilities"))?;
        write!(f, "{}", self.calibrated_label.table("calibrated label probabilities"))
    }
}
