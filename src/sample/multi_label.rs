use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use std::fmt;


/// A set of matched labels over a fixed label universe `0..n_label`.
///
/// Two label sets are equal iff they have the same universe size
/// and the same matched labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(from = "LabelList", into = "LabelList")]
pub struct MultiLabel {
    bits: FixedBitSet,
}


impl MultiLabel {
    /// Construct the empty label set over `n_label` labels.
    #[inline]
    pub fn new(n_label: usize) -> Self {
        Self { bits: FixedBitSet::with_capacity(n_label) }
    }


    /// Construct a label set from matched label indices.
    /// Indices out of `0..n_label` are ignored.
    #[inline]
    pub fn from_labels<I>(n_label: usize, labels: I) -> Self
        where I: IntoIterator<Item = usize>,
    {
        let mut multi_label = Self::new(n_label);
        labels.into_iter()
            .filter(|&l| l < n_label)
            .for_each(|l| { multi_label.add(l); });
        multi_label
    }


    /// Marks the label `label` as matched.
    #[inline]
    pub fn add(&mut self, label: usize) {
        self.bits.insert(label);
    }


    /// Returns `true` if `label` is matched.
    #[inline]
    pub fn matches(&self, label: usize) -> bool {
        self.bits.contains(label)
    }


    /// Returns the number of matched labels.
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.bits.count_ones(..)
    }


    /// Returns `true` if no label is matched.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }


    /// Returns the size of the label universe.
    #[inline]
    pub fn n_label(&self) -> usize {
        self.bits.len()
    }


    /// Returns the matched labels in ascending order.
    #[inline]
    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }


    /// Returns the number of labels matched by both `self` and `other`.
    #[inline]
    pub fn intersection_count(&self, other: &Self) -> usize {
        self.bits.intersection(&other.bits).count()
    }
}


impl fmt::Display for MultiLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.labels()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{line}}}")
    }
}


// Serialized form of `MultiLabel`.
#[derive(Serialize, Deserialize)]
struct LabelList {
    n_label: usize,
    labels: Vec<usize>,
}


impl From<MultiLabel> for LabelList {
    fn from(y: MultiLabel) -> Self {
        Self { n_label: y.n_label(), labels: y.labels().collect() }
    }
}


impl From<LabelList> for MultiLabel {
    fn from(list: LabelList) -> Self {
        Self::from_labels(list.n_label, list.labels)
    }
}
