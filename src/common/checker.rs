//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of data, range of hyperparameters.

use crate::{Error, Result, Sample};


const SIMPLEX_TOLERANCE: f64 = 1e-5;


/// Check whether the training sample is valid or not.
#[inline(always)]
pub(crate) fn check_sample(sample: &Sample) -> Result<()> {
    let (n_sample, n_feature) = sample.shape();

    if n_sample == 0 {
        return Err(Error::ShapeMismatch(
            "the sample has no instance".into()
        ));
    }
    if n_feature == 0 {
        return Err(Error::ShapeMismatch(
            "the sample has no feature".into()
        ));
    }
    Ok(())
}


/// Check whether the sample carries multi-label ground truth.
#[inline(always)]
pub(crate) fn check_labeled(sample: &Sample) -> Result<()> {
    check_sample(sample)?;
    if sample.labels().len() != sample.shape().0 || sample.n_label() == 0 {
        return Err(Error::ShapeMismatch(
            "the sample has no label set, use `Sample::with_labels`".into()
        ));
    }
    Ok(())
}


/// Check the shrinkage (learning rate) parameter.
#[inline(always)]
pub(crate) fn check_shrinkage(shrinkage: f64) -> Result<()> {
    if shrinkage > 0.0 && shrinkage <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid("shrinkage", format!("{shrinkage} is not in (0, 1]")))
    }
}


/// Check that weights and targets describe `n_sample` instances
/// over `n_classes` classes.
#[inline(always)]
pub(crate) fn check_weights_and_targets(
    n_sample: usize,
    n_classes: usize,
    weights: &[f64],
    targets: &[Vec<f64>],
) -> Result<()>
{
    if weights.len() != n_sample {
        return Err(Error::ShapeMismatch(format!(
            "{} instance weights for {n_sample} instances", weights.len()
        )));
    }
    if targets.len() != n_sample {
        return Err(Error::ShapeMismatch(format!(
            "{} target distributions for {n_sample} instances", targets.len()
        )));
    }
    if let Some(row) = targets.iter().position(|t| t.len() != n_classes) {
        return Err(Error::ShapeMismatch(format!(
            "target distribution of instance {row} has {} entries, \
             expected {n_classes}",
            targets[row].len(),
        )));
    }
    if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
        return Err(Error::invalid("weights", "negative or non-finite weight"));
    }
    Ok(())
}


/// Debug-time check that `slice` is a probability distribution.
#[inline(always)]
pub(crate) fn debug_check_distribution(slice: &[f64]) {
    let sum = slice.iter().sum::<f64>();
    debug_assert!(
        (sum - 1f64).abs() < SIMPLEX_TOLERANCE,
        "sum(dist[..]) = {sum}"
    );
}
