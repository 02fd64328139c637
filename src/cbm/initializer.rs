//! Initial responsibilities of the EM optimizer.
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Dirichlet;
use tracing::info;

use crate::{Error, Result, MultiLabel};
use crate::common::ReductionStrategy;
use super::config::Initialization;
use super::optimizer::{CBMOptimizer, responsibilities_from_log_joint};


/// Bounds of a Bernoulli parameter of the label-only mixture.
const MIN_BERNOULLI: f64 = 0.01;
const MAX_BERNOULLI: f64 = 0.99;
/// Half width of the jitter added to the label marginals.
const JITTER: f64 = 0.25;


/// Sets the initial responsibilities of `optimizer`
/// and runs one M-step on them.
///
/// - [`Initialization::Warm`] fits a mixture of independent Bernoullis
///   to the label sets alone (no features)
///   and uses its posteriors.
/// - [`Initialization::Random`] draws every row from `Dirichlet(1, ..., 1)`.
///
/// Both are seeded by [`OptimizerParams::seed`](super::OptimizerParams).
pub fn initialize(optimizer: &mut CBMOptimizer, init: Initialization)
    -> Result<()>
{
    let sample = optimizer.sample();
    let params = optimizer.params();
    let n_clusters = optimizer.model().n_clusters();
    let n_labels = sample.n_label();

    let responsibilities = match init {
        Initialization::Warm => warm_responsibilities(
            sample.labels(),
            n_labels,
            n_clusters,
            params.warm_start_iterations,
            params.seed,
            params.reduction,
        ),
        Initialization::Random => random_responsibilities(
            sample.shape().0, n_clusters, params.seed,
        )?,
    };
    info!("initialized the responsibilities ({init})");

    optimizer.set_responsibilities(responsibilities)?;
    optimizer.m_step()
}


/// Posteriors of a label-only Bernoulli mixture after `n_iterations`
/// EM steps started from jittered label marginals.
fn warm_responsibilities(
    labels: &[MultiLabel],
    n_labels: usize,
    n_clusters: usize,
    n_iterations: usize,
    seed: u64,
    reduction: ReductionStrategy,
) -> Vec<Vec<f64>>
{
    let n_sample = labels.len();
    if n_clusters == 1 {
        return vec![vec![1.0]; n_sample];
    }

    let marginals = (0..n_labels)
        .map(|l| {
            let count = labels.iter().filter(|y| y.matches(l)).count();
            count as f64 / n_sample.max(1) as f64
        })
        .collect::<Vec<_>>();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut log_prior = vec![-(n_clusters as f64).ln(); n_clusters];
    let mut bernoulli = (0..n_clusters)
        .map(|_| {
            marginals.iter()
                .map(|m| {
                    let jitter = rng.gen_range(-JITTER..JITTER);
                    (m + jitter).clamp(MIN_BERNOULLI, MAX_BERNOULLI)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let posterior = |log_prior: &[f64], bernoulli: &[Vec<f64>]| {
        reduction.map(n_sample, |i| {
            let log_joint = log_prior.iter()
                .zip(bernoulli)
                .map(|(lp, mu)| {
                    lp + mu.iter()
                        .enumerate()
                        .map(|(l, m)| {
                            if labels[i].matches(l) { m.ln() } else { (1.0 - m).ln() }
                        })
                        .sum::<f64>()
                })
                .collect::<Vec<_>>();
            responsibilities_from_log_joint(&log_joint[..]).0
        })
    };

    for _ in 0..n_iterations {
        let gamma = posterior(&log_prior[..], &bernoulli[..]);

        for k in 0..n_clusters {
            let mass = gamma.iter().map(|row| row[k]).sum::<f64>();
            log_prior[k] = (mass / n_sample as f64).max(f64::MIN_POSITIVE).ln();
            if mass <= 0.0 { continue; }

            for (l, mu) in bernoulli[k].iter_mut().enumerate() {
                let matched = gamma.iter()
                    .zip(labels)
                    .filter(|(_, y)| y.matches(l))
                    .map(|(row, _)| row[k])
                    .sum::<f64>();
                *mu = (matched / mass).clamp(MIN_BERNOULLI, MAX_BERNOULLI);
            }
        }
    }

    posterior(&log_prior[..], &bernoulli[..])
}


/// Rows drawn from the flat Dirichlet distribution.
fn random_responsibilities(n_sample: usize, n_clusters: usize, seed: u64)
    -> Result<Vec<Vec<f64>>>
{
    if n_clusters == 1 {
        return Ok(vec![vec![1.0]; n_sample]);
    }

    let alpha = vec![1.0_f64; n_clusters];
    let dirichlet = Dirichlet::new(&alpha[..])
        .map_err(|e| Error::invalid("n_clusters", e))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let rows = (0..n_sample)
        .map(|_| dirichlet.sample(&mut rng))
        .collect();
    Ok(rows)
}
