use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Terminal progress for `vitalsup run`: an overall page bar plus one
/// spinner per tool invocation
pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    page_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::new()),
            page_progress: None,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_pages(&mut self, total_pages: usize, release: &str) {
        if !self.enabled {
            return;
        }

        let pb = self
            .multi_progress
            .add(ProgressBar::new(total_pages as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages measured")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Measuring {release}"));
        self.page_progress = Some(pb);
    }

    pub fn page_done(&self) {
        if let Some(ref pb) = self.page_progress {
            pb.inc(1);
        }
    }

    pub fn finish_pages(&self, completed: usize, total: usize) {
        if let Some(ref pb) = self.page_progress {
            let message = if completed == total {
                "✓ All pages measured".to_string()
            } else {
                format!("✗ Stopped after {completed}/{total} pages")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.enabled {
            self.multi_progress
                .println(format!("⚠ {message}"))
                .unwrap_or(());
        }
    }

    /// Create a spinner while one page is measured
    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}
