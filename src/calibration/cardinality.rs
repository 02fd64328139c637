use serde::{Serialize, Deserialize};
use tracing::info;

use crate::{Result, Sample, CBM};
use crate::common::{checker, utils};
use crate::predictor::PluginPredictor;
use super::isotonic::IsotonicRegression;

use std::collections::BTreeMap;
use std::path::Path;


/// A predicted set with its raw probability and correctness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// Raw (constrained) probability of the predicted set.
    pub probability: f64,
    /// Number of labels in the predicted set.
    pub cardinality: usize,
    /// `true` if the predicted set equals the true set.
    pub correct: bool,
}


/// Calibrates whole-set probabilities with one isotonic map
/// per predicted-set cardinality.
///
/// Cardinalities unseen at fitting time use a map
/// fitted on every record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardinalityCalibrator {
    calibrators: BTreeMap<usize, IsotonicRegression>,
    fallback: IsotonicRegression,
}


impl CardinalityCalibrator {
    /// Fits the calibrator on the predictions of `predictor`
    /// over the validation sample `valid`.
    pub fn fit<P>(cbm: &CBM, predictor: &P, valid: &Sample) -> Result<Self>
        where P: PluginPredictor + ?Sized,
    {
        checker::check_labeled(valid)?;
        let records = set_records(cbm, predictor, valid);
        let calibrator = Self::fit_from_records(&records[..])?;
        info!(
            "fitted set calibration on {} instances, {} cardinalities",
            records.len(),
            calibrator.calibrators.len(),
        );
        Ok(calibrator)
    }


    /// Fits the calibrator on precomputed records.
    pub fn fit_from_records(records: &[SetRecord]) -> Result<Self> {
        let mut groups: BTreeMap<usize, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let (xs, ys) = groups.entry(record.cardinality).or_default();
            xs.push(record.probability);
            ys.push(if record.correct { 1.0 } else { 0.0 });
        }

        let calibrators = groups.iter()
            .map(|(&cardinality, (xs, ys))| {
                IsotonicRegression::fit(&xs[..], &ys[..])
                    .map(|iso| (cardinality, iso))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let (xs, ys): (Vec<f64>, Vec<f64>) = records.iter()
            .map(|r| (r.probability, if r.correct { 1.0 } else { 0.0 }))
            .unzip();
        let fallback = IsotonicRegression::fit(&xs[..], &ys[..])?;

        Ok(Self { calibrators, fallback })
    }


    /// Returns the cardinalities with a dedicated map.
    pub fn cardinalities(&self) -> impl Iterator<Item = usize> + '_ {
        self.calibrators.keys().copied()
    }


    /// Returns the calibrated probability of a predicted set
    /// of `cardinality` labels with raw probability `probability`.
    pub fn calibrate(&self, probability: f64, cardinality: usize) -> f64 {
        self.calibrators.get(&cardinality)
            .unwrap_or(&self.fallback)
            .predict(probability)
    }


    /// Write `self` to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        utils::save_json(self, path)
    }


    /// Read a calibrator written by [`CardinalityCalibrator::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        utils::load_json(path)
    }
}


/// The predicted set of every instance with its raw probability
/// and correctness, computed under the predictor's
/// [`PluginPredictor::reduction_strategy`].
pub fn set_records<P>(cbm: &CBM, predictor: &P, sample: &Sample)
    -> Vec<SetRecord>
    where P: PluginPredictor + ?Sized,
{
    let n_sample = sample.shape().0;
    predictor.reduction_strategy()
        .map(n_sample, |i| {
            let set = predictor.predict(sample, i);
            let probability = cbm
                .probability_of_label_set_with_constraint(sample, i, &set);
            SetRecord {
                probability,
                cardinality: set.cardinality(),
                correct: &set == sample.label(i),
            }
        })
}
