use std::collections::HashSet;

use polars::prelude::*;
use rayon::prelude::*;

use crate::{Error, Result};
use super::feature_struct::*;
use super::multi_label::MultiLabel;


/// Struct `Sample` holds a batch sample with dense/sparse format
/// and, for supervised use, one [`MultiLabel`] per instance.
///
/// Features are stored column-wise ([`Feature`]),
/// so that sufficient statistics can scan the non-zero entries
/// of a single column.
/// A row-major copy of the non-zero entries is kept as well,
/// so that per-instance scores do not search every column.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) features: Vec<Feature>,
    pub(super) rows: Vec<Vec<(usize, f64)>>,
    pub(super) labels: Vec<MultiLabel>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
    pub(super) n_label: usize,
}


impl Sample {
    /// Construct a sample from sparse rows.
    /// Each row is a list of `(feature index, value)` pairs.
    /// Zero values are dropped and each row is sorted by feature index.
    pub fn from_sparse_rows(
        mut rows: Vec<Vec<(usize, f64)>>,
        n_feature: usize,
    ) -> Result<Self>
    {
        let n_sample = rows.len();
        let mut features = (1..=n_feature)
            .map(|k| Feature::new_sparse(format!("Feat. [{k}]")))
            .collect::<Vec<_>>();

        for (i, row) in rows.iter_mut().enumerate() {
            row.retain(|(_, x)| *x != 0.0);
            row.sort_by_key(|(j, _)| *j);

            if let Some(w) = row.windows(2).find(|w| w[0].0 == w[1].0) {
                return Err(Error::ShapeMismatch(format!(
                    "feature {} appears twice in row {i}", w[0].0
                )));
            }
            for &(j, x) in row.iter() {
                let feature = features.get_mut(j)
                    .ok_or_else(|| Error::ShapeMismatch(format!(
                        "feature index {j} in row {i} \
                         is out of range 0..{n_feature}"
                    )))?;
                feature.append(i, x);
            }
        }

        features.iter_mut()
            .for_each(|feat| feat.set_n_sample(n_sample));

        Ok(Self {
            features,
            rows,
            labels: Vec::new(),
            n_sample,
            n_feature,
            n_label: 0,
        })
    }


    /// Construct a sample from dense rows of equal length.
    pub fn from_dense_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_sample = rows.len();
        let n_feature = rows.first().map(|r| r.len()).unwrap_or(0);

        if let Some(i) = rows.iter().position(|r| r.len() != n_feature) {
            return Err(Error::ShapeMismatch(format!(
                "row {i} has {} features, expected {n_feature}",
                rows[i].len()
            )));
        }

        let mut features = (1..=n_feature)
            .map(|k| Feature::new_dense(format!("Feat. [{k}]")))
            .collect::<Vec<_>>();

        for (i, row) in rows.iter().enumerate() {
            for (feat, &x) in features.iter_mut().zip(row) {
                feat.append(i, x);
            }
        }

        let rows = rows.into_par_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .filter(|(_, x)| *x != 0.0)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Ok(Self {
            features,
            rows,
            labels: Vec::new(),
            n_sample,
            n_feature,
            n_label: 0,
        })
    }


    /// Convert `polars::DataFrame` into a dense `Sample`.
    /// Every column is cast to `f64`; missing values become `0`.
    pub fn from_dataframe(data: &DataFrame) -> Result<Self> {
        let (n_sample, n_feature) = data.shape();

        let features = data.get_columns()
            .iter()
            .map(|series| {
                let values = series.cast(&DataType::Float64)?;
                let sample = values.f64()?
                    .into_iter()
                    .map(|x| x.unwrap_or(0.0))
                    .collect::<Vec<_>>();
                let name = series.name().to_string();
                Ok(Feature::Dense(DenseFeature { name, sample }))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = vec![Vec::new(); n_sample];
        for (j, feature) in features.iter().enumerate() {
            for (i, x) in feature.nonzeroes() {
                rows[i].push((j, x));
            }
        }

        Ok(Self {
            features,
            rows,
            labels: Vec::new(),
            n_sample,
            n_feature,
            n_label: 0,
        })
    }


    /// Attach multi-label ground truth, one label list per instance.
    /// The old labels assigned to `self` will be dropped.
    pub fn with_labels(mut self, labels: Vec<Vec<usize>>, n_label: usize)
        -> Result<Self>
    {
        if labels.len() != self.n_sample {
            return Err(Error::ShapeMismatch(format!(
                "{} label sets for {} instances",
                labels.len(), self.n_sample
            )));
        }

        for (i, row) in labels.iter().enumerate() {
            if let Some(l) = row.iter().find(|&&l| l >= n_label) {
                return Err(Error::ShapeMismatch(format!(
                    "label {l} of instance {i} is out of range 0..{n_label}"
                )));
            }
        }

        self.labels = labels.into_iter()
            .map(|row| MultiLabel::from_labels(n_label, row))
            .collect();
        self.n_label = n_label;
        Ok(self)
    }


    /// Returns the pair of the number of examples and
    /// the number of features
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the size of the label universe
    /// (`0` for an unlabeled sample).
    pub fn n_label(&self) -> usize {
        self.n_label
    }


    /// Returns a slice of type `Feature`.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the `j`-th feature column.
    pub fn feature(&self, j: usize) -> &Feature {
        &self.features[j]
    }


    /// Returns the non-zero entries of the `i`-th instance,
    /// sorted by feature index.
    pub fn row(&self, i: usize) -> &[(usize, f64)] {
        &self.rows[i][..]
    }


    /// Returns the label sets of all instances.
    pub fn labels(&self) -> &[MultiLabel] {
        &self.labels[..]
    }


    /// Returns the label set of the `i`-th instance.
    pub fn label(&self, i: usize) -> &MultiLabel {
        &self.labels[i]
    }


    /// Returns the distinct label sets in order of first appearance.
    pub fn label_sets(&self) -> Vec<MultiLabel> {
        let mut seen = HashSet::new();
        self.labels.iter()
            .filter(|y| seen.insert(*y))
            .cloned()
            .collect()
    }


    /// Returns `true` if some instance has the empty label set.
    pub fn contains_empty_label_set(&self) -> bool {
        self.labels.iter().any(|y| y.is_empty())
    }


    /// Returns the value of feature `j` on instance `i`.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        let row = &self.rows[i];
        match row.binary_search_by_key(&j, |(k, _)| *k) {
            Ok(pos) => row[pos].1,
            Err(_) => 0.0,
        }
    }
}
