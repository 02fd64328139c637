use crate::{Sample, MultiLabel, CBM};
use crate::common::ReductionStrategy;
use super::core::{Candidates, PluginPredictor};


/// Predicts the set that maximizes the expected instance F1
/// with the General F-measure Maximizer (GFM).
///
/// The candidate probabilities, renormalized over the candidates,
/// form the distribution the expectation is taken over.
/// With `P[l][s]` the probability that label `l` is matched
/// and the true set has cardinality `s`,
/// the best set of size `k > 0` is the top-`k` labels of
/// ```text
/// Δ_k(l) = Σ_s P[l][s] · 2 / (s + k),
/// ```
/// and the expected F1 of the empty prediction is `P(∅)`.
pub struct InstanceF1Predictor<'a> {
    cbm: &'a CBM,
    candidates: Candidates,
    reduction: ReductionStrategy,
}


impl<'a> InstanceF1Predictor<'a> {
    /// Construct a new predictor over the base pool `candidates`.
    pub fn new(cbm: &'a CBM, candidates: Candidates) -> Self {
        Self {
            cbm,
            candidates,
            reduction: ReductionStrategy::default(),
        }
    }


    /// Set the strategy of the batch predictions.
    pub fn reduction(mut self, reduction: ReductionStrategy) -> Self {
        self.reduction = reduction;
        self
    }


    /// Returns the model.
    pub fn model(&self) -> &CBM {
        self.cbm
    }
}


impl PluginPredictor for InstanceF1Predictor<'_> {
    fn name(&self) -> &str {
        "Instance F1"
    }


    fn reduction_strategy(&self) -> ReductionStrategy {
        self.reduction
    }


    fn predict_with_probability(&self, sample: &Sample, i: usize)
        -> (MultiLabel, f64)
    {
        let probs = self.cbm.instance_probabilities(sample, i);
        let n_labels = probs.n_labels();
        let allow_empty = probs.allow_empty();

        let weighted = self.candidates.for_instance(&probs)
            .into_iter()
            .map(|set| {
                let p = probs.probability_with_constraint(&set);
                (set, p)
            })
            .collect::<Vec<_>>();

        let chosen = general_f_maximizer(&weighted[..], n_labels, allow_empty);
        let p = probs.probability_with_constraint(&chosen);
        (chosen, p)
    }
}


/// Returns the set maximizing the expected F1 under `weighted`.
pub(crate) fn general_f_maximizer(
    weighted: &[(MultiLabel, f64)],
    n_labels: usize,
    allow_empty: bool,
) -> MultiLabel
{
    let total = weighted.iter().map(|(_, p)| p).sum::<f64>();
    let norm = if total > 0.0 { total } else { 1.0 };

    let max_cardinality = weighted.iter()
        .map(|(set, _)| set.cardinality())
        .max()
        .unwrap_or(0);

    // matched[l][s - 1] = P(l ∈ y, |y| = s)
    let mut matched = vec![vec![0.0; max_cardinality]; n_labels];
    let mut p_empty = 0.0;
    for (set, p) in weighted {
        let p = p / norm;
        let s = set.cardinality();
        if s == 0 {
            p_empty += p;
            continue;
        }
        set.labels().for_each(|l| { matched[l][s - 1] += p; });
    }

    let active = (0..n_labels)
        .filter(|&l| matched[l].iter().any(|p| *p > 0.0))
        .count();

    let mut best = if allow_empty || active == 0 {
        (0, p_empty, Vec::new())
    } else {
        (0, f64::NEG_INFINITY, Vec::new())
    };
    for k in 1..=active {
        let delta = matched.iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(s, p)| p * 2.0 / ((s + 1 + k) as f64))
                    .sum::<f64>()
            })
            .collect::<Vec<_>>();

        let mut order = (0..n_labels).collect::<Vec<_>>();
        order.sort_by(|&a, &b| delta[b].total_cmp(&delta[a]));
        order.truncate(k);

        let value = order.iter().map(|&l| delta[l]).sum::<f64>();
        if value > best.1 {
            best = (k, value, order);
        }
    }

    MultiLabel::from_labels(n_labels, best.2)
}
