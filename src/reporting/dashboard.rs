use crate::core::constants::{display, scoring};
use crate::core::types::Metric;
use crate::reporting::report::{PageReport, Report};
use crate::scoring::PercentDelta;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Constants for dashboard styling and layout
mod dashboard_constants {
    /// Chart.js CDN URL for rendering charts
    pub const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";
}

/// Error type for dashboard generation
#[derive(Debug)]
pub enum DashboardError {
    FileWrite(io::Error),
    Serialization(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::FileWrite(e) => write!(f, "Failed to write dashboard file: {e}"),
            DashboardError::Serialization(e) => write!(f, "Failed to serialize chart data: {e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::FileWrite(e) => Some(e),
            DashboardError::Serialization(_) => None,
        }
    }
}

impl From<io::Error> for DashboardError {
    fn from(e: io::Error) -> Self {
        DashboardError::FileWrite(e)
    }
}

/// Series for one bar chart, read by the page script
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartSeries<'a> {
    canvas_id: String,
    label: &'a str,
    unit: &'a str,
    releases: Vec<&'a str>,
    values: Vec<Option<f64>>,
}

/// Static HTML dashboard comparing releases page by page
pub struct HtmlDashboard;

impl HtmlDashboard {
    /// Generate and write an HTML dashboard to the specified path
    pub fn generate_dashboard(report: &Report, output_path: &Path) -> Result<(), DashboardError> {
        let html_content = Self::generate_html_content(report)?;
        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html_content)?;
        Ok(())
    }

    /// Generate the complete HTML document content
    pub fn generate_html_content(report: &Report) -> Result<String, DashboardError> {
        let css_styles = Self::generate_css();
        let js_scripts = Self::generate_javascript();
        let body_content = Self::generate_body_content(report)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - vitalsup</title>
    <script src="{}"></script>
    <style>{}</style>
</head>
<body>
    {}
    <script>{}</script>
</body>
</html>"#,
            html_escape(&report.title),
            dashboard_constants::CHART_JS_CDN,
            css_styles,
            body_content,
            js_scripts
        ))
    }

    fn generate_css() -> &'static str {
        r#"
        :root {
            --primary-color: #2563eb;
            --good-color: #059669;
            --needs-improvement-color: #d97706;
            --poor-color: #dc2626;
            --bg-color: #f8fafc;
            --card-bg: #ffffff;
            --border-color: #e2e8f0;
            --text-primary: #1e293b;
            --text-secondary: #64748b;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background-color: var(--bg-color);
            color: var(--text-primary);
            line-height: 1.6;
        }

        .container {
            max-width: 1200px;
            margin: 0 auto;
            padding: 2rem;
        }

        .header {
            text-align: center;
            margin-bottom: 3rem;
            padding: 2rem;
            background: linear-gradient(135deg, var(--primary-color), #3b82f6);
            color: white;
            border-radius: 12px;
            box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1);
        }

        .header h1 {
            font-size: 2.5rem;
            margin-bottom: 0.5rem;
            font-weight: 700;
        }

        .header p {
            font-size: 1.1rem;
            opacity: 0.9;
        }

        .page-section {
            background: var(--card-bg);
            border-radius: 12px;
            border: 1px solid var(--border-color);
            margin-bottom: 2.5rem;
            overflow: hidden;
            box-shadow: 0 2px 4px -1px rgba(0, 0, 0, 0.06);
        }

        .section-header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            background: var(--bg-color);
            padding: 1.5rem;
            border-bottom: 1px solid var(--border-color);
        }

        .section-title {
            font-size: 1.4rem;
            font-weight: 600;
        }

        .section-url {
            font-size: 0.9rem;
            color: var(--text-secondary);
            word-break: break-all;
        }

        .score-badge {
            min-width: 72px;
            padding: 0.75rem 1rem;
            border-radius: 999px;
            text-align: center;
            font-size: 1.5rem;
            font-weight: 700;
        }

        .score-caption {
            display: block;
            font-size: 0.7rem;
            font-weight: 500;
            text-transform: uppercase;
            letter-spacing: 0.5px;
        }

        .good { color: var(--good-color); background-color: #ecfdf5; }
        .needs-improvement { color: var(--needs-improvement-color); background-color: #fffbeb; }
        .poor { color: var(--poor-color); background-color: #fef2f2; }
        .unknown { color: var(--text-secondary); background-color: #f1f5f9; }

        .metrics-table {
            width: 100%;
            border-collapse: collapse;
            font-size: 0.9rem;
        }

        .metrics-table th,
        .metrics-table td {
            padding: 0.6rem 1rem;
            border-bottom: 1px solid var(--border-color);
            text-align: right;
            white-space: nowrap;
        }

        .metrics-table th:first-child,
        .metrics-table td:first-child {
            text-align: left;
        }

        .metrics-table th {
            color: var(--text-secondary);
            font-weight: 600;
            text-transform: uppercase;
            font-size: 0.75rem;
            letter-spacing: 0.5px;
        }

        .cell-score {
            display: block;
            font-size: 0.75rem;
            color: var(--text-secondary);
        }

        .regression { color: var(--poor-color); }
        .improvement { color: var(--good-color); }

        .table-wrapper {
            overflow-x: auto;
        }

        .empty-section {
            padding: 2rem;
            text-align: center;
            color: var(--text-secondary);
        }

        .charts-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
            gap: 1.5rem;
            padding: 1.5rem;
        }

        .chart-container {
            border: 1px solid var(--border-color);
            border-radius: 12px;
            padding: 1rem;
        }

        .chart-title {
            font-size: 1rem;
            font-weight: 600;
            margin-bottom: 0.5rem;
        }

        @media (max-width: 768px) {
            .container { padding: 1rem; }
            .header h1 { font-size: 2rem; }
            .charts-grid { grid-template-columns: 1fr; }
        }
        "#
    }

    /// Generate the main body content of the dashboard
    fn generate_body_content(report: &Report) -> Result<String, DashboardError> {
        let header_section = Self::generate_header_section(&report.title, &report.generated_at);
        let sections = report
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| Self::generate_page_section(index, section))
            .collect::<Result<Vec<_>, _>>()?
            .join("");

        Ok(format!(
            r#"
            <div class="container">
                {header_section}
                {sections}
            </div>
            "#
        ))
    }

    /// Generate the dashboard header section
    fn generate_header_section(title: &str, timestamp: &str) -> String {
        format!(
            r#"
            <div class="header">
                <h1>{}</h1>
                <p>Generated on {} by vitalsup</p>
            </div>
            "#,
            html_escape(title),
            html_escape(timestamp)
        )
    }

    fn generate_page_section(index: usize, section: &PageReport) -> Result<String, DashboardError> {
        let url_html = match section.page.url {
            Some(ref url) => format!(r#"<div class="section-url">{}</div>"#, html_escape(url)),
            None => String::new(),
        };

        let body = if section.releases.is_empty() {
            r#"<div class="empty-section"><p>No releases found for this page.</p></div>"#
                .to_string()
        } else {
            format!(
                "{}{}",
                Self::generate_metrics_table(section),
                Self::generate_charts(index, section)?
            )
        };

        Ok(format!(
            r#"
            <section class="page-section" id="page-{}">
                <div class="section-header">
                    <div>
                        <h2 class="section-title">{}</h2>
                        {}
                    </div>
                    {}
                </div>
                {}
            </section>
            "#,
            html_escape(&section.page.name),
            html_escape(&section.page.label),
            url_html,
            Self::generate_score_badge(section),
            body
        ))
    }

    fn generate_score_badge(section: &PageReport) -> String {
        let latest = section.latest();
        let score = latest.and_then(|release| release.score);
        let caption = latest
            .map(|release| html_escape(&release.release.name))
            .unwrap_or_default();

        format!(
            r#"<div class="score-badge {}">{}<span class="score-caption">{}</span></div>"#,
            score_class(score),
            format_score(score),
            caption
        )
    }

    /// Rows are metrics; columns are releases plus the latest change
    fn generate_metrics_table(section: &PageReport) -> String {
        let release_headers: String = section
            .releases
            .iter()
            .map(|release| format!("<th>{}</th>", html_escape(&release.release.name)))
            .collect();

        let latest = section.latest();
        let rows: String = Metric::ALL
            .iter()
            .map(|&metric| {
                let cells: String = section
                    .releases
                    .iter()
                    .map(|release| match release.record(metric) {
                        Some(record) => format!(
                            r#"<td>{}<span class="cell-score">score {}</span></td>"#,
                            metric.unit().format_value(record.value),
                            format_score(record.score)
                        ),
                        None => format!("<td>{}</td>", display::MISSING_VALUE),
                    })
                    .collect();

                let record = latest.and_then(|release| release.record(metric));
                let change_class = match record {
                    Some(r) if r.is_regression() => "regression",
                    Some(r) if r.is_improvement() => "improvement",
                    _ => "",
                };
                let delta = record
                    .and_then(|r| r.delta)
                    .map(|delta| metric.unit().format_delta(delta))
                    .unwrap_or_else(|| display::MISSING_VALUE.to_string());
                let percent = record
                    .map(|r| r.percent_delta)
                    .unwrap_or(PercentDelta::Unavailable);

                format!(
                    r#"
                    <tr>
                        <td>{} ({})</td>
                        {}
                        <td class="{change_class}">{delta}</td>
                        <td class="{change_class}">{percent}</td>
                    </tr>
                    "#,
                    metric.label(),
                    metric.abbreviation(),
                    cells
                )
            })
            .collect();

        format!(
            r#"
            <div class="table-wrapper">
                <table class="metrics-table">
                    <thead>
                        <tr>
                            <th>Metric</th>
                            {release_headers}
                            <th>Δ</th>
                            <th>Δ%</th>
                        </tr>
                    </thead>
                    <tbody>
                        {rows}
                    </tbody>
                </table>
            </div>
            "#
        )
    }

    /// One bar chart per metric across releases
    fn generate_charts(index: usize, section: &PageReport) -> Result<String, DashboardError> {
        let releases: Vec<&str> = section
            .releases
            .iter()
            .map(|release| release.release.name.as_str())
            .collect();

        let series: Vec<ChartSeries> = Metric::ALL
            .iter()
            .map(|&metric| ChartSeries {
                canvas_id: format!("chart-{index}-{}", metric.json_key()),
                label: metric.abbreviation(),
                unit: metric.unit().suffix().trim(),
                releases: releases.clone(),
                values: section
                    .releases
                    .iter()
                    .map(|release| release.record(metric).map(|record| record.value))
                    .collect(),
            })
            .collect();

        let canvases: String = series
            .iter()
            .map(|chart| {
                format!(
                    r#"
                    <div class="chart-container">
                        <h3 class="chart-title">{}</h3>
                        <canvas id="{}" height="200"></canvas>
                    </div>
                    "#,
                    chart.label, chart.canvas_id
                )
            })
            .collect();

        let chart_data_json = serde_json::to_string(&series)
            .map_err(|e| DashboardError::Serialization(e.to_string()))?
            .replace("</", "<\\/");

        Ok(format!(
            r#"
            <div class="charts-grid">
                {canvases}
            </div>

            <script>
                window.vitalsCharts = (window.vitalsCharts || []).concat({chart_data_json});
            </script>
            "#
        ))
    }

    fn generate_javascript() -> &'static str {
        r#"
        document.addEventListener('DOMContentLoaded', function() {
            if (typeof Chart === 'undefined' || !window.vitalsCharts) {
                return;
            }
            window.vitalsCharts.forEach(function(series) {
                const ctx = document.getElementById(series.canvasId);
                if (!ctx) {
                    return;
                }
                new Chart(ctx, {
                    type: 'bar',
                    data: {
                        labels: series.releases,
                        datasets: [{
                            label: series.unit ? series.label + ' (' + series.unit + ')' : series.label,
                            data: series.values,
                            backgroundColor: '#3b82f6',
                            borderRadius: 4
                        }]
                    },
                    options: {
                        responsive: true,
                        plugins: {
                            legend: { display: false }
                        },
                        scales: {
                            y: { beginAtZero: true }
                        }
                    }
                });
            });
        });
        "#
    }
}

/// CSS class for a score badge
pub fn score_class(score: Option<u8>) -> &'static str {
    match score {
        Some(s) if s >= scoring::GOOD_THRESHOLD => "good",
        Some(s) if s >= scoring::NEEDS_IMPROVEMENT_THRESHOLD => "needs-improvement",
        Some(_) => "poor",
        None => "unknown",
    }
}

fn format_score(score: Option<u8>) -> String {
    score
        .map(|s| s.to_string())
        .unwrap_or_else(|| display::NOT_APPLICABLE.to_string())
}

/// Escape text for HTML element content and attribute values
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
