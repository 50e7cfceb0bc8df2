//! Terminal output for reports and runs

use std::path::Path;

use crate::core::constants::{display, output_formats};
use crate::core::types::Metric;
use crate::reporting::report::{PageReport, Report};
use crate::runner::PageRun;
use crate::ui::color::{Colors, colorize, delta_color, emphasize, score_color};

/// Print a report summary in the requested format
pub fn display_report_summary(report: &Report, output_format: &str, quiet: bool) {
    match output_format {
        output_formats::JSON => match render_json_summary(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: Failed to serialize report: {e}"),
        },
        _ if quiet => {}
        _ => print!("{}", render_text_summary(report)),
    }
}

/// Pretty JSON of the whole report model
pub fn render_json_summary(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Plain text summary of the latest release of every section
pub fn render_text_summary(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{}\n",
        emphasize(&report.title, Colors::CYAN)
    ));

    for section in &report.sections {
        out.push('\n');
        out.push_str(&render_section(section));
    }
    out
}

fn render_section(section: &PageReport) -> String {
    let mut out = emphasize(&section.page.label, Colors::CYAN);
    if let Some(ref url) = section.page.url {
        out.push_str(&format!(" {}", colorize(url, Colors::DIM)));
    }
    out.push('\n');

    let Some(latest) = section.latest() else {
        out.push_str(&format!(
            "  {} No releases found\n",
            display::WARNING_EMOJI
        ));
        return out;
    };

    let previous = section.previous();
    let score_line = match previous {
        Some(prev) => format!(
            "  Score: {} {} → {} {}\n",
            colorize(&format_score(prev.score), score_color(prev.score)),
            colorize(&format!("({})", prev.release.name), Colors::DIM),
            colorize(&format_score(latest.score), score_color(latest.score)),
            colorize(&format!("({})", latest.release.name), Colors::DIM),
        ),
        None => format!(
            "  Score: {} {}\n",
            colorize(&format_score(latest.score), score_color(latest.score)),
            colorize(&format!("({})", latest.release.name), Colors::DIM),
        ),
    };
    out.push_str(&score_line);

    for metric in Metric::ALL {
        let line = match latest.record(metric) {
            Some(record) => {
                let change = match record.delta {
                    Some(delta) => colorize(
                        &format!(
                            "{} ({})",
                            metric.unit().format_delta(delta),
                            record.percent_delta
                        ),
                        delta_color(record),
                    ),
                    None => display::MISSING_VALUE.to_string(),
                };
                format!(
                    "  {:<5} {:>10}  score {:>3}  {}\n",
                    metric.abbreviation(),
                    metric.unit().format_value(record.value),
                    format_score(record.score),
                    change
                )
            }
            None => format!(
                "  {:<5} {:>10}\n",
                metric.abbreviation(),
                display::MISSING_VALUE
            ),
        };
        out.push_str(&line);
    }
    out
}

fn format_score(score: Option<u8>) -> String {
    score
        .map(|s| s.to_string())
        .unwrap_or_else(|| display::NOT_APPLICABLE.to_string())
}

/// Confirm where the dashboard was written
pub fn display_dashboard_written(path: &Path, quiet: bool) {
    if !quiet {
        println!("📊 HTML dashboard generated: {}", path.display());
    }
}

/// Summarize a finished `run`
pub fn display_run_summary(release: &str, runs: &[PageRun], quiet: bool) {
    if quiet {
        return;
    }

    println!(
        "\n{} {}",
        display::SUCCESS_EMOJI,
        emphasize(
            &format!(
                "Measured {} page{} for {release}",
                runs.len(),
                if runs.len() == 1 { "" } else { "s" },
            ),
            Colors::GREEN
        )
    );
    for run in runs {
        let note = if run.summary_found {
            String::new()
        } else {
            format!(" {}", colorize("(no summary)", Colors::YELLOW))
        };
        println!(
            "   {} {} {}{note}",
            colorize(&run.page, Colors::CYAN),
            colorize(&format!("{}s", run.elapsed.as_secs()), Colors::DIM),
            run.output_dir.display()
        );
    }
}
