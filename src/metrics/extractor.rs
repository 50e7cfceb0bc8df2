use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::core::error::{Result, VitalsUpError};
use crate::core::types::{Metric, MetricSet};
use crate::reporting::logging;

/// Accepted layouts of a summary document.
///
/// Browsertime summaries nest the vitals under `statistics`; some exports
/// put them at the top level. The nested layout is tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummaryDocument {
    Nested { statistics: Statistics },
    Flat {
        #[serde(rename = "googleWebVitals")]
        vitals: RawVitals,
    },
}

#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(rename = "googleWebVitals")]
    vitals: RawVitals,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVitals {
    #[serde(default)]
    ttfb: Option<RawMetric>,
    #[serde(default)]
    first_contentful_paint: Option<RawMetric>,
    #[serde(default)]
    largest_contentful_paint: Option<RawMetric>,
    #[serde(default)]
    total_blocking_time: Option<RawMetric>,
    #[serde(default)]
    cumulative_layout_shift: Option<RawMetric>,
}

/// A metric field is either a bare number or a statistics object.
/// Anything else is kept as `Other` so one odd field never rejects the
/// whole document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMetric {
    Scalar(f64),
    Summary {
        #[serde(default)]
        median: Option<f64>,
    },
    Other(Value),
}

impl RawMetric {
    fn value(&self) -> Option<f64> {
        match self {
            RawMetric::Scalar(value) => Some(*value),
            RawMetric::Summary { median } => *median,
            RawMetric::Other(_) => None,
        }
    }
}

impl RawVitals {
    fn field(&self, metric: Metric) -> Option<&RawMetric> {
        match metric {
            Metric::Ttfb => self.ttfb.as_ref(),
            Metric::Fcp => self.first_contentful_paint.as_ref(),
            Metric::Lcp => self.largest_contentful_paint.as_ref(),
            Metric::Tbt => self.total_blocking_time.as_ref(),
            Metric::Cls => self.cumulative_layout_shift.as_ref(),
        }
    }

    fn into_metric_set(self) -> MetricSet {
        let mut set = MetricSet::empty();
        for metric in Metric::ALL {
            set.set(metric, self.field(metric).and_then(RawMetric::value));
        }
        set
    }
}

/// Extract the five Web Vitals from a parsed summary document.
///
/// Never fails: a document without either known layout yields an empty set,
/// and each metric that is missing or not numeric is simply absent.
pub fn extract(document: &Value) -> MetricSet {
    match SummaryDocument::deserialize(document) {
        Ok(SummaryDocument::Nested { statistics }) => statistics.vitals.into_metric_set(),
        Ok(SummaryDocument::Flat { vitals }) => vitals.into_metric_set(),
        Err(_) => MetricSet::empty(),
    }
}

/// Parse summary JSON text and extract its metrics
pub fn parse_summary(content: &str) -> serde_json::Result<MetricSet> {
    let document: Value = serde_json::from_str(content)?;
    Ok(extract(&document))
}

/// Load a summary file, failing on an unreadable file or invalid JSON.
///
/// Used where the caller cannot continue without the file, e.g. a pairwise
/// comparison.
pub fn load_strict<P: AsRef<Path>>(path: P) -> Result<MetricSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| VitalsUpError::SummaryUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let metrics = parse_summary(&content).map_err(|source| VitalsUpError::SummaryInvalid {
        path: path.to_path_buf(),
        source,
    })?;

    logging::log_extraction(path, &metrics);
    Ok(metrics)
}

/// Load a summary file, degrading any failure to an empty set.
///
/// Batch reports use this so one broken release does not hide the others.
pub fn load_lenient<P: AsRef<Path>>(path: P) -> MetricSet {
    match load_strict(path) {
        Ok(metrics) => metrics,
        Err(e) => {
            logging::log_warning(&format!("{e}; reporting its metrics as missing"));
            MetricSet::empty()
        }
    }
}
