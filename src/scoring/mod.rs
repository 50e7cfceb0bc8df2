//! Score and comparison engine
//!
//! This module turns per-release metric sets into comparison records
//! and weighted performance scores.

pub mod comparison;
pub mod curve;

// Re-export commonly used items
pub use comparison::{
    ComparisonRecord, PercentDelta, ReleaseComparison, compare_metric, compare_releases,
};
pub use curve::{LogNormalCurve, metric_score, performance_score};
