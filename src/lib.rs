//! vitalsup - run browser performance tests per release and compare Web Vitals
//!
//! The crate is organised the way the binary uses it: the runner invokes the
//! external testing tool and files its output per release, discovery finds
//! those release directories again, the metrics extractor reads the JSON
//! summaries, the scoring engine compares releases, and reporting renders
//! the HTML dashboard.

pub mod config;
pub mod core;
pub mod discovery;
pub mod metrics;
pub mod reporting;
pub mod runner;
pub mod scoring;
pub mod ui;

// Re-export commonly used items for convenience
pub use core::error::{Result, VitalsUpError};
pub use core::types::{Metric, MetricSample, MetricSet, ReleaseId, ReleaseMetrics, Unit};
pub use scoring::{ComparisonRecord, PercentDelta};
