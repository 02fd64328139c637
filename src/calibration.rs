//! Post-hoc calibration of set and label probabilities.
//!
//! Both calibrators consume (raw probability, correctness) pairs
//! from a held-out validation sample
//! and fit non-decreasing maps with [`IsotonicRegression`].
//! Their artifacts are saved separately from the model.

/// Defines the pool-adjacent-violators regression.
pub mod isotonic;
/// Defines the reliability buckets.
pub mod bucket;
/// Defines the cardinality-bucketed set calibrator.
pub mod cardinality;
/// Defines the per-label calibrator.
pub mod label_isotonic;
/// Defines the four-table calibration report.
pub mod report;


pub use isotonic::IsotonicRegression;
pub use bucket::{BucketInfo, DEFAULT_N_BUCKETS};
pub use cardinality::{CardinalityCalibrator, SetRecord, set_records};
pub use label_isotonic::{LabelCalibrationMode, LabelCalibrator};
pub use report::CalibrationReport;

