//! Release-over-release comparison
//!
//! Each release is compared against the entry immediately before it in the
//! chronologically sorted sequence.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::core::constants::display;

use crate::core::types::{Metric, MetricSet, ReleaseId, ReleaseMetrics, Unit};
use crate::scoring::curve::{metric_score, performance_score};

/// Relative change of a metric against the previous release
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentDelta {
    /// No previous release, or the previous release lacks this metric
    Unavailable,
    /// The previous value was exactly zero
    Undefined,
    /// Change in percent of the previous value
    Value(f64),
}

impl PercentDelta {
    pub fn value(self) -> Option<f64> {
        match self {
            PercentDelta::Value(v) => Some(v),
            _ => None,
        }
    }
}

// Unavailable -> null, Undefined -> "NaN", Value -> number
impl Serialize for PercentDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentDelta::Unavailable => serializer.serialize_none(),
            PercentDelta::Undefined => serializer.serialize_str("NaN"),
            PercentDelta::Value(v) => serializer.serialize_f64(*v),
        }
    }
}

impl fmt::Display for PercentDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentDelta::Unavailable => write!(f, "{}", display::MISSING_VALUE),
            PercentDelta::Undefined => write!(f, "{}", display::NOT_APPLICABLE),
            PercentDelta::Value(v) if *v > 0.0 => write!(f, "+{v:.1}%"),
            PercentDelta::Value(v) => write!(f, "{v:.1}%"),
        }
    }
}

/// One metric of one release, with its change against the previous release
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub metric: Metric,
    pub value: f64,
    pub unit: Unit,
    pub score: Option<u8>,
    pub delta: Option<f64>,
    pub percent_delta: PercentDelta,
}

impl ComparisonRecord {
    /// True when the metric got worse; every tracked metric is
    /// smaller-is-better
    pub fn is_regression(&self) -> bool {
        self.delta.is_some_and(|delta| delta > 0.0)
    }

    pub fn is_improvement(&self) -> bool {
        self.delta.is_some_and(|delta| delta < 0.0)
    }
}

/// Comparison output for a single release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseComparison {
    pub release: ReleaseId,
    pub score: Option<u8>,
    pub metrics: Vec<ComparisonRecord>,
}

impl ReleaseComparison {
    pub fn record(&self, metric: Metric) -> Option<&ComparisonRecord> {
        self.metrics.iter().find(|record| record.metric == metric)
    }
}

/// Compare one metric of `current` against `previous`.
///
/// Returns `None` when the current release lacks the metric.
pub fn compare_metric(
    metric: Metric,
    current: &MetricSet,
    previous: Option<&MetricSet>,
) -> Option<ComparisonRecord> {
    let value = current.get(metric)?;
    let previous_value = previous.and_then(|set| set.get(metric));

    let (delta, percent_delta) = match previous_value {
        None => (None, PercentDelta::Unavailable),
        Some(prev) => {
            let delta = value - prev;
            let percent = if prev == 0.0 {
                PercentDelta::Undefined
            } else {
                PercentDelta::Value(delta / prev * 100.0)
            };
            (Some(delta), percent)
        }
    };

    Some(ComparisonRecord {
        metric,
        value,
        unit: metric.unit(),
        score: metric_score(metric, value),
        delta,
        percent_delta,
    })
}

/// Compare every release against its predecessor and score it.
///
/// The output has one entry per release, in chronological order.
pub fn compare_releases(releases: &ReleaseMetrics) -> Vec<ReleaseComparison> {
    let mut previous: Option<&MetricSet> = None;
    let mut comparisons = Vec::with_capacity(releases.len());

    for (release, current) in releases.iter() {
        let metrics = Metric::ALL
            .into_iter()
            .filter_map(|metric| compare_metric(metric, current, previous))
            .collect();

        comparisons.push(ReleaseComparison {
            release: release.clone(),
            score: performance_score(current),
            metrics,
        });
        previous = Some(current);
    }

    comparisons
}
