use serde::{Serialize, Deserialize};
use tracing::info;

use crate::{Error, Result, Sample, CBM};
use crate::common::{checker, utils, ReductionStrategy};
use super::isotonic::IsotonicRegression;

use std::fmt;
use std::path::Path;
use std::str::FromStr;


/// How the label marginals share isotonic maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCalibrationMode {
    /// One map for every label.
    #[default]
    Pooled,
    /// One map per label.
    PerLabel,
}


impl FromStr for LabelCalibrationMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "pooled" => Ok(Self::Pooled),
            "per_label" => Ok(Self::PerLabel),
            other => Err(Error::invalid(
                "label calibration mode",
                format!("`{other}`, expected `pooled` or `per_label`"),
            )),
        }
    }
}


impl fmt::Display for LabelCalibrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pooled => "pooled",
            Self::PerLabel => "per_label",
        };
        write!(f, "{s}")
    }
}


/// Calibrates per-label marginal probabilities with isotonic maps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelCalibrator {
    mode: LabelCalibrationMode,
    maps: Vec<IsotonicRegression>,
}


impl LabelCalibrator {
    /// Fits the maps on the marginals of `cbm` over `valid`.
    pub fn fit(
        cbm: &CBM,
        valid: &Sample,
        mode: LabelCalibrationMode,
        reduction: ReductionStrategy,
    ) -> Result<Self>
    {
        checker::check_labeled(valid)?;
        let n_sample = valid.shape().0;
        let marginals = reduction
            .map(n_sample, |i| cbm.predict_class_probs(valid, i));

        let calibrator = Self::fit_from_marginals(
            &marginals[..], valid, mode,
        )?;
        info!("fitted {mode} label calibration on {n_sample} instances");
        Ok(calibrator)
    }


    /// Fits the maps on precomputed marginals, one row per instance.
    pub fn fit_from_marginals(
        marginals: &[Vec<f64>],
        sample: &Sample,
        mode: LabelCalibrationMode,
    ) -> Result<Self>
    {
        let n_labels = sample.n_label();
        if marginals.len() != sample.shape().0 {
            return Err(Error::ShapeMismatch(format!(
                "{} marginal rows for {} instances",
                marginals.len(), sample.shape().0,
            )));
        }
        if let Some(row) = marginals.iter().find(|row| row.len() != n_labels) {
            return Err(Error::ShapeMismatch(format!(
                "{} marginals for {n_labels} labels", row.len(),
            )));
        }

        let pairs_of = |l: usize| {
            marginals.iter()
                .zip(sample.labels())
                .map(|(row, y)| (row[l], if y.matches(l) { 1.0 } else { 0.0 }))
                .collect::<Vec<(f64, f64)>>()
        };

        let maps = match mode {
            LabelCalibrationMode::Pooled => {
                let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n_labels)
                    .flat_map(pairs_of)
                    .unzip();
                vec![IsotonicRegression::fit(&xs[..], &ys[..])?]
            },
            LabelCalibrationMode::PerLabel => {
                (0..n_labels)
                    .map(|l| {
                        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs_of(l)
                            .into_iter()
                            .unzip();
                        IsotonicRegression::fit(&xs[..], &ys[..])
                    })
                    .collect::<Result<Vec<_>>>()?
            },
        };
        Ok(Self { mode, maps })
    }


    /// Returns the sharing mode.
    #[inline]
    pub fn mode(&self) -> LabelCalibrationMode {
        self.mode
    }


    /// Returns the calibrated probability of label `label`.
    pub fn calibrate(&self, label: usize, probability: f64) -> f64 {
        let map = match self.mode {
            LabelCalibrationMode::Pooled => self.maps.first(),
            LabelCalibrationMode::PerLabel => self.maps.get(label),
        };
        match map {
            Some(map) => map.predict(probability),
            None => probability.clamp(0.0, 1.0),
        }
    }


    /// Calibrates every marginal of one instance.
    pub fn calibrate_all(&self, marginals: &[f64]) -> Vec<f64> {
        marginals.iter()
            .enumerate()
            .map(|(l, &p)| self.calibrate(l, p))
            .collect()
    }


    /// Write `self` to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        utils::save_json(self, path)
    }


    /// Read a calibrator written by [`LabelCalibrator::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        utils::load_json(path)
    }
}
