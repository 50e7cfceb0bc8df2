//! Report model shared by the HTML dashboard and terminal output

use serde::Serialize;
use std::path::Path;

use crate::config::{Config, PageConfig};
use crate::core::error::Result;
use crate::core::types::{ReleaseId, ReleaseMetrics};
use crate::discovery::{discover_releases, summary_path};
use crate::metrics::{load_lenient, load_strict};
use crate::reporting::logging;
use crate::scoring::{ReleaseComparison, compare_releases};

/// Everything rendered for one invocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub generated_at: String,
    pub sections: Vec<PageReport>,
}

/// One page across all releases
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page: PageConfig,
    /// Oldest first
    pub releases: Vec<ReleaseComparison>,
}

impl PageReport {
    pub fn latest(&self) -> Option<&ReleaseComparison> {
        self.releases.last()
    }

    /// Release the latest one is compared against
    pub fn previous(&self) -> Option<&ReleaseComparison> {
        self.releases.iter().rev().nth(1)
    }
}

impl Report {
    pub fn new(title: &str, sections: Vec<PageReport>) -> Self {
        Self {
            title: title.to_string(),
            generated_at: chrono::Utc::now()
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            sections,
        }
    }

    pub fn release_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.releases.len())
            .max()
            .unwrap_or(0)
    }
}

/// Build a report from every release under `base_dir`.
///
/// An unreadable summary degrades that release and page to missing
/// metrics; the other sections are unaffected.
pub fn build_batch_report(config: &Config, base_dir: &Path) -> Result<Report> {
    let releases = discover_releases(base_dir, config.release_prefix())?;
    logging::log_release_discovery(base_dir, &releases);
    if releases.is_empty() {
        logging::log_warning(&format!(
            "No '{}<N>' directories found in {}",
            config.release_prefix(),
            base_dir.display()
        ));
    }

    let sections = config
        .pages()
        .into_iter()
        .map(|page| {
            let metrics: ReleaseMetrics = releases
                .iter()
                .map(|release| {
                    let path =
                        summary_path(base_dir, &release.name, &page.name, config.summary_file());
                    (release.clone(), load_lenient(&path))
                })
                .collect();

            PageReport {
                releases: compare_releases(&metrics),
                page,
            }
        })
        .collect();

    Ok(Report::new(config.title(), sections))
}

/// Build a single-section report comparing two summary files.
///
/// Either file failing to load is fatal.
pub fn build_pairwise_report(before: &Path, after: &Path, title: &str) -> Result<Report> {
    let before_metrics = load_strict(before)?;
    let after_metrics = load_strict(after)?;

    let metrics: ReleaseMetrics = [
        (ReleaseId::new("before", 0), before_metrics),
        (ReleaseId::new("after", 1), after_metrics),
    ]
    .into_iter()
    .collect();

    let page = PageConfig {
        name: "comparison".to_string(),
        label: format!(
            "{} vs {}",
            file_label(before),
            file_label(after)
        ),
        url: None,
    };

    Ok(Report::new(
        title,
        vec![PageReport {
            page,
            releases: compare_releases(&metrics),
        }],
    ))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
