//! Per-frame measurements and their run-level aggregation.

/// Per-frame partial measurement record.
pub mod record;
/// Tabular numeric summary.
pub mod report;
/// Merge-and-store container keyed by image name.
pub mod storage;
