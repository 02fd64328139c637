use std::ops::Index;
use std::slice::Iter;

const BUF_SIZE: usize = 256;

/// Dense representation of a feature.
#[derive(Debug,Clone)]
pub struct DenseFeature {
    /// Feature name
    pub name: String,
    /// Feature values.
    pub sample: Vec<f64>,
}


/// Sparse representation of a feature.
#[derive(Debug,Clone)]
pub struct SparseFeature {
    /// Feature name
    pub name: String,
    /// Pairs of sample index and feature value,
    /// sorted by the sample index.
    pub sample: Vec<(usize, f64)>,
    /// Number of examples.
    /// Note that `self.n_sample >= self.sample.len()`.
    pub(crate) n_sample: usize,
}


/// An enumeration of sparse/dense feature.
#[derive(Debug,Clone)]
pub enum Feature {
    /// Dense representation of a feature
    Dense(DenseFeature),
    /// Sparse representation of a feature
    Sparse(SparseFeature),
}


/// Iterator over the non-zero entries `(row, value)` of a [`Feature`].
pub enum NonZeroes<'a> {
    /// Skips the zero entries of a dense column.
    Dense(std::iter::Enumerate<Iter<'a, f64>>),
    /// Walks the stored entries of a sparse column.
    Sparse(Iter<'a, (usize, f64)>),
}


impl Iterator for NonZeroes<'_> {
    type Item = (usize, f64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Dense(iter) => {
                iter.find(|(_, x)| **x != 0.0)
                    .map(|(i, x)| (i, *x))
            },
            Self::Sparse(iter) => iter.next().copied(),
        }
    }
}


impl Feature {
    /// Construct a dense feature
    pub fn new_dense<T: ToString>(name: T) -> Self {
        Self::Dense(DenseFeature::new(name))
    }


    /// Construct a sparse feature
    pub fn new_sparse<T: ToString>(name: T) -> Self {
        Self::Sparse(SparseFeature::new(name))
    }


    /// Returns `true` if this feature is stored sparsely.
    pub fn is_sparse(&self) -> bool {
        match self {
            Self::Dense(_) => false,
            Self::Sparse(_) => true,
        }
    }


    pub(crate) fn set_n_sample(&mut self, n_sample: usize) {
        match self {
            Self::Dense(_) => {},
            Self::Sparse(feat) => {
                feat.n_sample = n_sample;
            }
        }
    }


    pub(crate) fn append(&mut self, i: usize, f: f64) {
        match self {
            Self::Dense(feat) => { feat.append(f); },
            Self::Sparse(feat) => { feat.append((i, f)); }
        }
    }


    /// Get the feature name.
    pub fn name(&self) -> &str {
        match self {
            Self::Dense(feat) => &feat.name,
            Self::Sparse(feat) => &feat.name,
        }
    }


    /// Returns the number of stored items in this feature.
    pub fn len(&self) -> usize {
        match self {
            Self::Dense(feat) => feat.len(),
            Self::Sparse(feat) => feat.len(),
        }
    }


    /// Returns `true` if the number of stored items is equals to `0`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Dense(feat) => feat.is_empty(),
            Self::Sparse(feat) => feat.is_empty(),
        }
    }


    /// Returns an iterator over the non-zero entries `(row, value)`
    /// in ascending row order.
    pub fn nonzeroes(&self) -> NonZeroes<'_> {
        match self {
            Self::Dense(feat) => NonZeroes::Dense(feat.iter().enumerate()),
            Self::Sparse(feat) => NonZeroes::Sparse(feat.iter()),
        }
    }


    /// Returns `true` if some instance takes the value `0`.
    pub fn has_zero(&self) -> bool {
        match self {
            Self::Dense(feat) => feat.iter().any(|x| *x == 0.0),
            Self::Sparse(feat) => feat.has_zero(),
        }
    }


    /// Returns the minimum and maximum value of this feature,
    /// including the implicit zeros of a sparse feature.
    pub(crate) fn min_max(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        self.nonzeroes()
            .for_each(|(_, val)| {
                min = min.min(val);
                max = max.max(val);
            });

        if self.has_zero() {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        (min, max)
    }


    pub(crate) fn distinct_value_count(&self) -> usize {
        match self {
            Self::Dense(feat) => feat.distinct_value_count(),
            Self::Sparse(feat) => feat.distinct_value_count(),
        }
    }
}


impl DenseFeature {
    /// Construct an empty dense feature with `name`.
    pub fn new<T: ToString>(name: T) -> Self {
        Self {
            name: name.to_string(),
            sample: Vec::with_capacity(BUF_SIZE),
        }
    }


    /// Returns an iterator over feature values.
    pub fn iter(&self) -> Iter<'_, f64> {
        self.sample.iter()
    }


    /// Append an example to this feature.
    pub fn append(&mut self, x: f64) {
        self.sample.push(x);
    }


    /// Returns the number of items in `self.sample`.
    pub fn len(&self) -> usize {
        self.sample.len()
    }


    /// Returns `true` if `self.len()` is equals to `0`.
    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }


    fn distinct_value_count(&self) -> usize {
        let values = self.sample[..].to_vec();
        inner_distinct_value_count(values)
    }
}


impl SparseFeature {
    /// Construct an empty sparse feature with `name`.
    pub fn new<T: ToString>(name: T) -> Self {
        Self {
            name: name.to_string(),
            sample: Vec::with_capacity(BUF_SIZE),
            n_sample: 0_usize,
        }
    }


    /// Append an example to this feature.
    pub fn append(&mut self, (i, x): (usize, f64)) {
        self.sample.push((i, x));
    }


    /// Returns an iterator over non-zero feature values.
    pub fn iter(&self) -> Iter<'_, (usize, f64)> {
        self.sample.iter()
    }


    /// Return the number of examples that have non-zero value.
    pub fn len(&self) -> usize {
        self.sample.len()
    }


    /// Returns `true` if this feature has zero values.
    pub fn has_zero(&self) -> bool {
        self.len() < self.n_sample
    }


    /// Returns the number of indices that have zero-value.
    pub fn zero_counts(&self) -> usize {
        self.n_sample - self.len()
    }


    /// Returns `true` if `self.len()` is equals to `0`.
    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }


    fn distinct_value_count(&self) -> usize {
        let values = self.sample[..]
            .iter()
            .map(|(_, v)| *v)
            .collect::<Vec<_>>();
        let mut uniq_value_count = inner_distinct_value_count(values);
        if self.has_zero() {
            uniq_value_count += 1;
        }
        uniq_value_count
    }
}


impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        match self {
            Self::Dense(feat)  => &feat[idx],
            Self::Sparse(feat) => &feat[idx],
        }
    }
}


/// Count the number of distinct values in `src`.
fn inner_distinct_value_count(mut src: Vec<f64>) -> usize {
    src.sort_by(|a, b| a.total_cmp(b));
    src.dedup();
    src.len()
}


impl Index<usize> for DenseFeature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        &self.sample[idx]
    }
}


impl Index<usize> for SparseFeature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        match self.sample[..].binary_search_by(|(i, _)| i.cmp(&idx)) {
            Ok(pos) => &self.sample[pos].1,
            Err(_) => &0.0,
        }
    }
}
