use plotters::prelude::*;
use serde::{Serialize, Deserialize};

use crate::{Error, Result};
use crate::common::{utils, ReductionStrategy};

use std::fmt;
use std::path::Path;


/// Default number of probability buckets.
pub const DEFAULT_N_BUCKETS: usize = 10;


/// Reliability statistics over equal-width probability buckets.
///
/// Bucket `b` of `n` covers `[b/n, (b+1)/n)`;
/// the last bucket also contains `1`.
/// Out-of-range probabilities go to the nearest bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketInfo {
    counts: Vec<u64>,
    corrects: Vec<u64>,
    sum_probs: Vec<f64>,
}


impl Default for BucketInfo {
    fn default() -> Self {
        Self::new(DEFAULT_N_BUCKETS)
    }
}


impl BucketInfo {
    /// Construct empty statistics over `n_buckets` buckets.
    pub fn new(n_buckets: usize) -> Self {
        let n_buckets = n_buckets.max(1);
        Self {
            counts: vec![0; n_buckets],
            corrects: vec![0; n_buckets],
            sum_probs: vec![0.0; n_buckets],
        }
    }


    /// Accumulates the records that `f` adds for each of `n` items,
    /// in thread-local buckets merged afterward.
    pub fn accumulate<F>(
        n_buckets: usize,
        n: usize,
        reduction: ReductionStrategy,
        f: F,
    ) -> Self
        where F: Fn(usize, &mut BucketInfo) + Sync + Send,
    {
        reduction.fold(
            n,
            || Self::new(n_buckets),
            |mut acc, i| { f(i, &mut acc); acc },
            Self::absorb,
        )
    }


    /// Returns the number of buckets.
    #[inline]
    pub fn n_buckets(&self) -> usize {
        self.counts.len()
    }


    /// Returns the bucket of probability `p`.
    pub fn bucket_index(&self, p: f64) -> usize {
        let n = self.n_buckets();
        if p.is_nan() || p <= 0.0 { return 0; }
        ((p * n as f64).floor() as usize).min(n - 1)
    }


    /// Records one prediction with probability `p`.
    pub fn add(&mut self, p: f64, correct: bool) {
        let b = self.bucket_index(p);
        self.counts[b] += 1;
        if correct { self.corrects[b] += 1; }
        self.sum_probs[b] += p;
    }


    /// Adds the statistics of `other` into `self`.
    /// Both tables must have the same number of buckets.
    pub fn merge(self, other: Self) -> Result<Self> {
        if self.n_buckets() != other.n_buckets() {
            return Err(Error::ShapeMismatch(format!(
                "cannot merge {} buckets into {} buckets",
                other.n_buckets(), self.n_buckets(),
            )));
        }
        Ok(self.absorb(other))
    }


    // Callers guarantee equal bucket counts.
    pub(crate) fn absorb(mut self, other: Self) -> Self {
        self.counts.iter_mut()
            .zip(other.counts)
            .for_each(|(a, b)| { *a += b; });
        self.corrects.iter_mut()
            .zip(other.corrects)
            .for_each(|(a, b)| { *a += b; });
        self.sum_probs.iter_mut()
            .zip(other.sum_probs)
            .for_each(|(a, b)| { *a += b; });
        self
    }


    /// Returns the number of records per bucket.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts[..]
    }


    /// Returns the number of correct records per bucket.
    #[inline]
    pub fn corrects(&self) -> &[u64] {
        &self.corrects[..]
    }


    /// Returns the sum of probabilities per bucket.
    #[inline]
    pub fn sum_probs(&self) -> &[f64] {
        &self.sum_probs[..]
    }


    /// Returns the total number of records.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }


    /// Returns the accuracy per bucket; empty buckets give `0`.
    pub fn accuracies(&self) -> Vec<f64> {
        self.counts.iter()
            .zip(&self.corrects)
            .map(|(&n, &c)| utils::safe_divide(c as f64, n as f64, 0.0))
            .collect()
    }


    /// Returns the mean probability per bucket; empty buckets give `0`.
    pub fn average_confidences(&self) -> Vec<f64> {
        self.counts.iter()
            .zip(&self.sum_probs)
            .map(|(&n, &s)| utils::safe_divide(s, n as f64, 0.0))
            .collect()
    }


    /// Returns the bounds of bucket `b`.
    pub fn interval(&self, b: usize) -> (f64, f64) {
        let n = self.n_buckets() as f64;
        (b as f64 / n, (b + 1) as f64 / n)
    }


    /// Renders the table with a `title` line.
    pub fn table(&self, title: &str) -> String {
        let accuracies = self.accuracies();
        let confidences = self.average_confidences();
        let last = self.n_buckets() - 1;

        let mut lines = Vec::with_capacity(self.n_buckets() + 2);
        if !title.is_empty() {
            lines.push(title.to_string());
        }
        lines.push(format!(
            "{:<14}\t{:>8}\t{:>8}\t{:>9}\t{:>8}\t{:>18}",
            "interval", "total", "correct", "incorrect",
            "accuracy", "average confidence",
        ));
        for b in 0..self.n_buckets() {
            let (lo, hi) = self.interval(b);
            let close = if b == last { ']' } else { ')' };
            let interval = format!("[{lo:.2}, {hi:.2}{close}");
            lines.push(format!(
                "{:<14}\t{:>8}\t{:>8}\t{:>9}\t{:>8.4}\t{:>18.4}",
                interval,
                self.counts[b],
                self.corrects[b],
                self.counts[b] - self.corrects[b],
                accuracies[b],
                confidences[b],
            ));
        }
        lines.join("\n")
    }


    /// Draws the reliability diagram (accuracy against confidence)
    /// to the SVG file `path`.
    pub fn draw_reliability_diagram<P>(&self, path: P, title: &str)
        -> Result<()>
        where P: AsRef<Path>,
    {
        let root = SVGBackend::new(path.as_ref(), (640, 480))
            .into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0_f64..1.0_f64, 0.0_f64..1.0_f64)
            .map_err(plot_error)?;

        chart.configure_mesh()
            .x_desc("confidence")
            .y_desc("accuracy")
            .draw()
            .map_err(plot_error)?;

        let accuracies = self.accuracies();
        let bars = (0..self.n_buckets())
            .filter(|&b| self.counts[b] > 0)
            .map(|b| {
                let (lo, hi) = self.interval(b);
                Rectangle::new(
                    [(lo, 0.0), (hi, accuracies[b])],
                    BLUE.mix(0.4).filled(),
                )
            });
        chart.draw_series(bars)
            .map_err(plot_error)?;

        chart.draw_series(LineSeries::new([(0.0, 0.0), (1.0, 1.0)], &BLACK))
            .map_err(plot_error)?;

        let confidences = self.average_confidences();
        let points = (0..self.n_buckets())
            .filter(|&b| self.counts[b] > 0)
            .map(|b| Circle::new((confidences[b], accuracies[b]), 3, RED.filled()));
        chart.draw_series(points)
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        Ok(())
    }
}


fn plot_error<E: fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}


impl fmt::Display for BucketInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table(""))
    }
}
