//! Metric extraction
//!
//! This module reads the JSON summaries written by the testing tool
//! and resolves them into the canonical `MetricSet`.

pub mod extractor;

// Re-export commonly used items
pub use extractor::{extract, load_lenient, load_strict, parse_summary};
