use crate::config::Config;
use crate::core::types::{Metric, MetricSet, ReleaseId};
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Initialize the logger with appropriate level based on verbosity.
///
/// Warnings stay visible by default so that batch reports say which
/// summaries were skipped.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    // A second initialization (tests, repeated runs in one process) is ignored
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    let timeout = config.tool_timeout_duration().as_secs();
    let pages = config.pages().len();

    info!(
        "Configuration: tool={}, timeout={timeout}s, pages={pages}",
        config.tool_command()
    );
    info!(
        "Layout: summary_file={}, release_prefix={}",
        config.summary_file(),
        config.release_prefix()
    );
    debug!("Retained artifacts: {:?}", config.retained_artifacts());
}

/// Log the releases found under a base directory
pub fn log_release_discovery(base_dir: &Path, releases: &[ReleaseId]) {
    info!(
        "Found {} release(s) in {}",
        releases.len(),
        base_dir.display()
    );
    for (i, release) in releases.iter().enumerate() {
        debug!("  {}. {} (#{})", i + 1, release.name, release.number);
    }
}

/// Log which metrics a summary file provided
pub fn log_extraction(path: &Path, metrics: &MetricSet) {
    let missing: Vec<&str> = Metric::ALL
        .iter()
        .filter(|metric| metrics.get(**metric).is_none())
        .map(|metric| metric.abbreviation())
        .collect();

    if missing.is_empty() {
        debug!("Extracted all metrics from {}", path.display());
    } else {
        debug!(
            "Extracted {}/{} metrics from {} (missing: {})",
            metrics.len(),
            Metric::ALL.len(),
            path.display(),
            missing.join(", ")
        );
    }
}

/// Log the start of a tool run
pub fn log_tool_start(command: &str, args: &[String]) {
    info!("Running {command} {}", args.join(" "));
}

/// Log the end of a successful tool run
pub fn log_tool_finish(command: &str, elapsed: Duration) {
    info!("✅ {command} finished in {}s", elapsed.as_secs());
}

/// Log artifacts removed from a page folder
pub fn log_pruned(dir: &Path, removed: &[String]) {
    if removed.is_empty() {
        debug!("Nothing to prune in {}", dir.display());
    } else {
        info!("Pruned {} artifact(s) from {}", removed.len(), dir.display());
        for name in removed {
            debug!("  - {name}");
        }
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_logger_initialization_is_idempotent() {
        init_logger(true, false);
        init_logger(false, true);
        init_logger(false, false);
    }

    #[test]
    fn test_log_config_info_defaults() {
        log_config_info(&Config::default());
    }

    #[test]
    fn test_log_release_discovery() {
        log_release_discovery(Path::new("/runs"), &[]);
        log_release_discovery(
            Path::new("/runs"),
            &[
                ReleaseId::new("release-28", 28),
                ReleaseId::new("release-29", 29),
            ],
        );
    }

    #[test]
    fn test_log_extraction_partial_and_complete() {
        let path = PathBuf::from("summary.json");
        log_extraction(&path, &MetricSet::empty());

        let mut full = MetricSet::empty();
        for metric in Metric::ALL {
            full.set(metric, Some(1.0));
        }
        log_extraction(&path, &full);
    }

    #[test]
    fn test_log_tool_lifecycle() {
        log_tool_start("sitespeed.io", &["https://example.com".to_string()]);
        log_tool_finish("sitespeed.io", Duration::from_secs(42));
    }

    #[test]
    fn test_log_pruned() {
        log_pruned(Path::new("/runs/release-1/home"), &[]);
        log_pruned(
            Path::new("/runs/release-1/home"),
            &["pages".to_string(), "index.html".to_string()],
        );
    }

    #[test]
    fn test_log_error_with_and_without_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        log_error("Failed to read file", Some(&io_error));
        log_error("Something went wrong", None);
        log_warning("Summary missing");
    }
}
