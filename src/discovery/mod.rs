//! Release discovery
//!
//! This module finds the `release-<N>` directories under a base
//! directory and resolves where each page's summary file lives.

pub mod releases;

// Re-export commonly used items
pub use releases::{discover_releases, page_dir, summary_path};
