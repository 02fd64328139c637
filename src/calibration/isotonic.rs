use serde::{Serialize, Deserialize};

use crate::{Error, Result};


/// A non-decreasing map fitted by pool-adjacent-violators.
///
/// The map is stored as knots `(x, y)` with increasing `x`
/// and non-decreasing `y`.
/// Between knots it interpolates linearly,
/// outside it is constant.
/// An unfitted map is the identity clamped to `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IsotonicRegression {
    points: Vec<(f64, f64)>,
}


// One pooled block of the PAV pass.
#[derive(Clone, Copy)]
struct Block {
    x_lo: f64,
    x_hi: f64,
    sum_wy: f64,
    sum_w: f64,
}


impl Block {
    #[inline]
    fn mean(&self) -> f64 {
        self.sum_wy / self.sum_w
    }
}


impl IsotonicRegression {
    /// Fits the map to the pairs `(xs[i], ys[i])`, each with weight `1`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let weights = vec![1.0; xs.len()];
        Self::fit_weighted(xs, ys, &weights[..])
    }


    /// Fits the non-decreasing step function minimizing
    /// `Σ_i w_i (f(x_i) - y_i)²`.
    ///
    /// Pairs with a non-finite coordinate or a non-positive weight
    /// are ignored.
    pub fn fit_weighted(xs: &[f64], ys: &[f64], weights: &[f64])
        -> Result<Self>
    {
        if xs.len() != ys.len() || xs.len() != weights.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} inputs, {} targets and {} weights",
                xs.len(), ys.len(), weights.len(),
            )));
        }

        let mut triples = xs.iter()
            .zip(ys)
            .zip(weights)
            .filter(|((x, y), w)| x.is_finite() && y.is_finite() && **w > 0.0)
            .map(|((&x, &y), &w)| (x, y, w))
            .collect::<Vec<_>>();
        triples.sort_by(|a, b| a.0.total_cmp(&b.0));


        let mut blocks: Vec<Block> = Vec::with_capacity(triples.len());
        for (x, y, w) in triples {
            // Equal inputs share one value.
            if let Some(last) = blocks.last_mut() {
                if last.x_hi == x {
                    last.sum_wy += w * y;
                    last.sum_w += w;
                    Self::pool(&mut blocks);
                    continue;
                }
            }
            blocks.push(Block { x_lo: x, x_hi: x, sum_wy: w * y, sum_w: w });
            Self::pool(&mut blocks);
        }


        let mut points = Vec::with_capacity(2 * blocks.len());
        for block in blocks {
            let y = block.mean();
            points.push((block.x_lo, y));
            if block.x_hi > block.x_lo {
                points.push((block.x_hi, y));
            }
        }
        Ok(Self { points })
    }


    /// Merges the trailing blocks while they violate monotonicity.
    fn pool(blocks: &mut Vec<Block>) {
        while blocks.len() >= 2 {
            let n = blocks.len();
            if blocks[n - 2].mean() <= blocks[n - 1].mean() {
                break;
            }
            let last = blocks[n - 1];
            blocks.truncate(n - 1);
            let prev = &mut blocks[n - 2];
            prev.x_hi = last.x_hi;
            prev.sum_wy += last.sum_wy;
            prev.sum_w += last.sum_w;
        }
    }


    /// Returns the knots of the map.
    #[inline]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points[..]
    }


    /// Returns `true` if the map has no knot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }


    /// Returns the calibrated value of `x`.
    pub fn predict(&self, x: f64) -> f64 {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last())
        else {
            return if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        };

        if x.is_nan() || x <= first.0 { return first.1; }
        if x >= last.0 { return last.1; }

        let idx = self.points.partition_point(|p| p.0 <= x);
        let (x0, y0) = self.points[idx - 1];
        let (x1, y1) = self.points[idx];
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }
}
