//! Reporting
//!
//! This module builds the per-page release report, renders it as an HTML
//! dashboard, and hosts the structured logging helpers.

pub mod dashboard;
pub mod logging;
pub mod report;

// Re-export commonly used items
pub use dashboard::{DashboardError, HtmlDashboard};
pub use report::{PageReport, Report, build_batch_report, build_pairwise_report};
