//! Core types and foundational components
//!
//! This module contains the metric data model, error handling,
//! and constants used throughout the application.

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items for convenience
pub use error::{Result, VitalsUpError};
pub use types::{Metric, MetricSample, MetricSet, ReleaseId, ReleaseMetrics, Unit};
