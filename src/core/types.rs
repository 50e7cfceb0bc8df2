use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::constants::scoring;

// Release names end in a plain unsigned integer, e.g. "release-29"
static RELEASE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Failed to compile release number pattern"));

/// One of the five Web Vitals tracked per page.
///
/// The declaration order is the display order used by tables and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    Fcp,
    Lcp,
    Tbt,
    Cls,
    Ttfb,
}

/// Unit tag attached to every metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Milliseconds,
    Unitless,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; 5] = [
        Metric::Fcp,
        Metric::Lcp,
        Metric::Tbt,
        Metric::Cls,
        Metric::Ttfb,
    ];

    /// Field name inside the `googleWebVitals` object of a summary file
    pub fn json_key(self) -> &'static str {
        match self {
            Metric::Fcp => "firstContentfulPaint",
            Metric::Lcp => "largestContentfulPaint",
            Metric::Tbt => "totalBlockingTime",
            Metric::Cls => "cumulativeLayoutShift",
            Metric::Ttfb => "ttfb",
        }
    }

    /// Short uppercase abbreviation, e.g. "LCP"
    pub fn abbreviation(self) -> &'static str {
        match self {
            Metric::Fcp => "FCP",
            Metric::Lcp => "LCP",
            Metric::Tbt => "TBT",
            Metric::Cls => "CLS",
            Metric::Ttfb => "TTFB",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Metric::Fcp => "First Contentful Paint",
            Metric::Lcp => "Largest Contentful Paint",
            Metric::Tbt => "Total Blocking Time",
            Metric::Cls => "Cumulative Layout Shift",
            Metric::Ttfb => "Time To First Byte",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Metric::Cls => Unit::Unitless,
            _ => Unit::Milliseconds,
        }
    }

    /// Log-normal reference points as (median, poor)
    pub fn reference_points(self) -> (f64, f64) {
        let (median, poor, _) = self.scoring_row();
        (median, poor)
    }

    /// Weight of this metric in the aggregate performance score
    pub fn weight(self) -> f64 {
        self.scoring_row().2
    }

    fn scoring_row(self) -> (f64, f64, f64) {
        match self {
            Metric::Fcp => scoring::FCP,
            Metric::Lcp => scoring::LCP,
            Metric::Tbt => scoring::TBT,
            Metric::Cls => scoring::CLS,
            Metric::Ttfb => scoring::TTFB,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl Unit {
    /// Suffix appended to formatted values
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Milliseconds => " ms",
            Unit::Unitless => "",
        }
    }

    /// Format a value of this unit for display
    pub fn format_value(self, value: f64) -> String {
        match self {
            Unit::Milliseconds => format!("{value:.0}{}", self.suffix()),
            Unit::Unitless => format!("{value:.3}"),
        }
    }

    /// Format a change with an explicit sign, e.g. "+200 ms"
    pub fn format_delta(self, delta: f64) -> String {
        let sign = if delta > 0.0 { "+" } else { "" };
        format!("{sign}{}", self.format_value(delta))
    }
}

/// A single metric reading.
///
/// `value` is `None` when the summary did not report the metric. A reported
/// zero is `Some(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSample {
    pub metric: Metric,
    pub value: Option<f64>,
    pub unit: Unit,
}

/// The Web Vitals of one summary document.
///
/// Only present values are stored; lookups for absent metrics return `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    values: BTreeMap<Metric, f64>,
}

impl MetricSet {
    /// An empty set with every metric missing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Record a value for `metric`, or clear it when `value` is `None`
    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        match value {
            Some(v) => {
                self.values.insert(metric, v);
            }
            None => {
                self.values.remove(&metric);
            }
        }
    }

    /// Builder-style variant of [`MetricSet::set`]
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn sample(&self, metric: Metric) -> MetricSample {
        MetricSample {
            metric,
            value: self.get(metric),
            unit: metric.unit(),
        }
    }

    /// All five samples in display order, missing ones included
    pub fn samples(&self) -> impl Iterator<Item = MetricSample> + '_ {
        Metric::ALL.into_iter().map(|metric| self.sample(metric))
    }

    /// True when no metric is present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of metrics present
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Identifier of a release, ordered by its numeric suffix.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct ReleaseId {
    /// Directory or display name, e.g. "release-29"
    pub name: String,
    /// Numeric suffix defining chronological order
    pub number: u64,
}

impl ReleaseId {
    pub fn new<S: Into<String>>(name: S, number: u64) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }

    /// Parse a release name of the form `<prefix><N>`.
    ///
    /// # Examples
    /// ```
    /// use vitalsup::ReleaseId;
    ///
    /// let id = ReleaseId::parse("release-29", "release-").unwrap();
    /// assert_eq!(id.number, 29);
    /// assert!(ReleaseId::parse("release-x", "release-").is_none());
    /// ```
    pub fn parse(name: &str, prefix: &str) -> Option<Self> {
        let digits = name.strip_prefix(prefix)?;
        if !RELEASE_NUMBER.is_match(digits) {
            return None;
        }
        let number = digits.parse().ok()?;
        Some(Self::new(name, number))
    }
}

impl Ord for ReleaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ReleaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseId {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.name == other.name
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Metric sets keyed by release, kept in chronological order.
///
/// Insertion keeps the sequence sorted, so "previous release" is always the
/// preceding entry regardless of gaps in the numbering.
#[derive(Debug, Clone, Default)]
pub struct ReleaseMetrics {
    entries: Vec<(ReleaseId, MetricSet)>,
}

impl ReleaseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the metrics of `release`
    pub fn insert(&mut self, release: ReleaseId, metrics: MetricSet) {
        match self.entries.binary_search_by(|(id, _)| id.cmp(&release)) {
            Ok(index) => self.entries[index].1 = metrics,
            Err(index) => self.entries.insert(index, (release, metrics)),
        }
    }

    pub fn get(&self, release: &ReleaseId) -> Option<&MetricSet> {
        self.entries
            .iter()
            .find(|(id, _)| id == release)
            .map(|(_, metrics)| metrics)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReleaseId, &MetricSet)> {
        self.entries.iter().map(|(id, metrics)| (id, metrics))
    }

    pub fn releases(&self) -> impl Iterator<Item = &ReleaseId> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn latest(&self) -> Option<(&ReleaseId, &MetricSet)> {
        self.entries.last().map(|(id, metrics)| (id, metrics))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ReleaseId, MetricSet)> for ReleaseMetrics {
    fn from_iter<I: IntoIterator<Item = (ReleaseId, MetricSet)>>(iter: I) -> Self {
        let mut metrics = ReleaseMetrics::new();
        for (release, set) in iter {
            metrics.insert(release, set);
        }
        metrics
    }
}
