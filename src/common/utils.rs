//! This file provides some common numeric functions
//! such as `log_sum_exp` and the KL-divergence,
//! plus the JSON artifact helpers.
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;


/// Computes `ln(Σ exp(x_i))` without overflow.
/// Returns `f64::NEG_INFINITY` for an empty slice
/// or a slice of `-inf` values.
#[inline(always)]
pub fn log_sum_exp(items: &[f64]) -> f64 {
    let max = items.iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    if max == f64::NEG_INFINITY || max.is_nan() {
        return max;
    }
    if max == f64::INFINITY {
        return max;
    }

    let sum = items.iter()
        .map(|x| (x - max).exp())
        .sum::<f64>();
    max + sum.ln()
}


/// Converts scores into log-probabilities, `x_i - log_sum_exp(x)`.
#[inline(always)]
pub fn log_softmax(scores: &[f64]) -> Vec<f64> {
    let z = log_sum_exp(scores);
    scores.iter()
        .map(|s| s - z)
        .collect()
}


/// Computes `KL(p || q)` given `p` and `ln q`.
/// Terms with `p_k == 0` contribute nothing.
#[inline(always)]
pub fn kl_given_p_log_q(p: &[f64], log_q: &[f64]) -> f64 {
    debug_assert_eq!(p.len(), log_q.len());
    p.iter()
        .zip(log_q)
        .filter(|(pk, _)| **pk != 0.0)
        .map(|(&pk, &lq)| pk * (pk.ln() - lq))
        .sum::<f64>()
}


/// Returns `x / y`, or `default` if `y == 0`.
#[inline(always)]
pub fn safe_divide(x: f64, y: f64, default: f64) -> f64 {
    if y == 0.0 { default } else { x / y }
}


/// Computes `Σ_j w[j] * x_j` over the non-zero entries of a sparse row.
/// Entries beyond `weights.len()` are ignored.
#[inline(always)]
pub(crate) fn sparse_dot(row: &[(usize, f64)], weights: &[f64]) -> f64 {
    row.iter()
        .filter_map(|&(j, x)| weights.get(j).map(|w| w * x))
        .sum::<f64>()
}


/// Normalizes `items` to sum to `1`.
/// If the total mass is zero or not finite,
/// `items` becomes the uniform distribution and this function returns `false`.
#[inline(always)]
pub(crate) fn normalize_or_uniform(items: &mut [f64]) -> bool {
    let z = items.iter().sum::<f64>();
    let n_items = items.len() as f64;

    if z > 0.0 && z.is_finite() {
        items.iter_mut()
            .for_each(|item| { *item /= z; });
        true
    } else {
        items.iter_mut()
            .for_each(|item| { *item = 1.0 / n_items; });
        false
    }
}


/// Index of the largest element. Ties go to the smallest index.
#[inline(always)]
pub(crate) fn argmax(items: &[f64]) -> usize {
    let mut best = 0;
    for (k, &v) in items.iter().enumerate() {
        if v > items[best] {
            best = k;
        }
    }
    best
}


/// Writes `value` to `path` as JSON.
pub(crate) fn save_json<T, P>(value: &T, path: P) -> Result<()>
    where T: Serialize,
          P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}


/// Reads a value written by `save_json`.
pub(crate) fn load_json<T, P>(path: P) -> Result<T>
    where T: DeserializeOwned,
          P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    let value = serde_json::from_reader(reader)?;
    Ok(value)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sum_exp_is_stable() {
        let v = log_sum_exp(&[1000.0, 1000.0]);
        assert!((v - (1000.0 + 2f64.ln())).abs() < 1e-9);

        let v = log_sum_exp(&[f64::NEG_INFINITY, f64::NEG_INFINITY]);
        assert_eq!(v, f64::NEG_INFINITY);
    }


    #[test]
    fn kl_of_identical_distributions_is_zero() {
        let p = [0.2, 0.0, 0.8];
        let log_q = p.iter()
            .map(|x: &f64| x.ln())
            .collect::<Vec<_>>();
        assert!(kl_given_p_log_q(&p, &log_q).abs() < 1e-12);
    }


    #[test]
    fn degenerate_mass_becomes_uniform() {
        let mut items = [0.0, 0.0, 0.0, 0.0];
        assert!(!normalize_or_uniform(&mut items));
        assert_eq!(items, [0.25; 4]);
    }
}
