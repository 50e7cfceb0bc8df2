//! Tool runner
//!
//! This module drives the external performance testing tool for one
//! release: it measures each page into a staging folder, moves the output
//! into the release layout and prunes artifacts that reports never read.

pub mod artifacts;
pub mod tool;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, PageConfig, is_plain_name};
use crate::core::constants::layout;
use crate::core::error::{Result, VitalsUpError};
use crate::core::types::ReleaseId;
use crate::reporting::logging;
use crate::ui::ProgressReporter;

// Re-export commonly used items
pub use artifacts::{prune_artifacts, relocate_output, remove_if_exists};
pub use tool::{
    CancelHandle, CancelSignal, CommandTool, PerfTool, ToolInvocation, ToolOutcome, cancellation,
};

/// What one page measurement left behind
#[derive(Debug, Clone, PartialEq)]
pub struct PageRun {
    pub page: String,
    pub output_dir: PathBuf,
    pub pruned: Vec<String>,
    pub elapsed: Duration,
    /// Whether the summary file reports read was found after the move
    pub summary_found: bool,
}

/// Pick the pages named on the command line, in configuration order.
///
/// An empty selection means every configured page.
pub fn select_pages(pages: &[PageConfig], requested: &[String]) -> Result<Vec<PageConfig>> {
    if let Some(unknown) = requested
        .iter()
        .find(|name| !pages.iter().any(|page| &page.name == *name))
    {
        let known: Vec<&str> = pages.iter().map(|page| page.name.as_str()).collect();
        return Err(VitalsUpError::InvalidArgument(format!(
            "Unknown page '{unknown}'. Configured pages: {}",
            known.join(", ")
        )));
    }

    Ok(pages
        .iter()
        .filter(|page| requested.is_empty() || requested.contains(&page.name))
        .cloned()
        .collect())
}

/// Staging folder the tool writes into for one page
pub fn staging_dir(base_dir: &Path, page: &str) -> PathBuf {
    base_dir.join(layout::STAGING_DIR).join(page)
}

/// Measure `pages` for `release`, one page at a time.
///
/// The first failing page aborts the run. Pages measured before the
/// failure keep their relocated output.
pub async fn run_release<T: PerfTool + ?Sized>(
    tool: &T,
    config: &Config,
    base_dir: &Path,
    release: &str,
    pages: &[PageConfig],
    cancel: &CancelSignal,
    mut progress: Option<&mut ProgressReporter>,
) -> Result<Vec<PageRun>> {
    if !is_plain_name(release) || ReleaseId::parse(release, config.release_prefix()).is_none() {
        return Err(VitalsUpError::InvalidArgument(format!(
            "Release name '{release}' must look like '{}<N>'",
            config.release_prefix()
        )));
    }
    if let Some(page) = pages.iter().find(|page| page.url.is_none()) {
        return Err(VitalsUpError::InvalidArgument(format!(
            "Page '{}' has no URL configured",
            page.name
        )));
    }

    if let Some(ref mut reporter) = progress {
        reporter.start_pages(pages.len(), release);
    }

    let mut runs = Vec::with_capacity(pages.len());
    for page in pages {
        let result = run_page(tool, config, base_dir, release, page, cancel, progress.as_deref()).await;
        match result {
            Ok(run) => {
                if let Some(ref reporter) = progress {
                    reporter.page_done();
                }
                runs.push(run);
            }
            Err(e) => {
                if let Some(ref reporter) = progress {
                    reporter.finish_pages(runs.len(), pages.len());
                }
                logging::log_error(&format!("Measuring page '{}' failed", page.name), Some(&e));
                return Err(e);
            }
        }
    }

    if let Some(ref reporter) = progress {
        reporter.finish_pages(runs.len(), pages.len());
    }

    // Only removes the staging root once it is empty
    let _ = std::fs::remove_dir(base_dir.join(layout::STAGING_DIR));

    Ok(runs)
}

async fn run_page<T: PerfTool + ?Sized>(
    tool: &T,
    config: &Config,
    base_dir: &Path,
    release: &str,
    page: &PageConfig,
    cancel: &CancelSignal,
    progress: Option<&ProgressReporter>,
) -> Result<PageRun> {
    let url = page.url.as_deref().unwrap_or_default();
    let staging = staging_dir(base_dir, &page.name);
    remove_if_exists(&staging)?;

    let invocation =
        ToolInvocation::from_template(config.tool_command(), &config.tool_args(), url, &staging);
    logging::log_tool_start(&invocation.program, &invocation.args);

    let spinner = progress.and_then(|reporter| {
        reporter.create_spinner(&format!("Measuring {} ({url})", page.label))
    });
    let outcome = tool.run(&invocation, cancel).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = outcome?;
    logging::log_tool_finish(&invocation.program, outcome.elapsed);

    let output_dir = relocate_output(&staging, base_dir, release, &page.name)?;
    let pruned = prune_artifacts(&output_dir, &config.retained_artifacts())?;
    logging::log_pruned(&output_dir, &pruned);

    let summary = output_dir.join(config.summary_file());
    let summary_found = summary.is_file();
    if !summary_found {
        warn(
            progress,
            &format!(
                "Page '{}' left no summary at {}, reports will show it as missing",
                page.name,
                summary.display()
            ),
        );
    }

    Ok(PageRun {
        page: page.name.clone(),
        output_dir,
        pruned,
        elapsed: outcome.elapsed,
        summary_found,
    })
}

/// Print above the spinners while they are drawn, log otherwise
fn warn(progress: Option<&ProgressReporter>, message: &str) {
    match progress {
        Some(reporter) if reporter.is_enabled() => reporter.log_warning(message),
        _ => logging::log_warning(message),
    }
}
