//! Struct `Sample` represents a batch sample.

// Provides feature struct.
pub(crate) mod feature_struct;
// Provides sample struct.
pub(crate) mod sample_struct;
// Provides the label set struct.
pub(crate) mod multi_label;


pub use sample_struct::Sample;
pub use feature_struct::{Feature, DenseFeature, SparseFeature, NonZeroes};
pub use multi_label::MultiLabel;
