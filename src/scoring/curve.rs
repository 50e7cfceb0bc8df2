//! Log-normal scoring curve
//!
//! A metric value is mapped to a 0-100 score by the complementary CDF of a
//! log-normal distribution anchored at two reference points: the value that
//! scores 50 (median) and a "poor" value further out on the curve.

use std::f64::consts::{LN_2, SQRT_2};

use crate::core::types::{Metric, MetricSet};

// Abramowitz-Stegun 7.1.26 coefficients
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Error function, Abramowitz-Stegun rational approximation (|error| < 1.5e-7)
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Scoring curve for one metric where smaller values are better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormalCurve {
    median: f64,
    poor: f64,
}

impl LogNormalCurve {
    /// Build a curve from its reference points. `poor` must exceed `median`
    /// and both must be positive.
    pub fn new(median: f64, poor: f64) -> Self {
        debug_assert!(median > 0.0 && poor > median);
        Self { median, poor }
    }

    pub fn for_metric(metric: Metric) -> Self {
        let (median, poor) = metric.reference_points();
        Self::new(median, poor)
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn poor(&self) -> f64 {
        self.poor
    }

    /// Unrounded score in [0, 100]
    pub fn raw_score(&self, value: f64) -> f64 {
        // ln(0) is -inf, the curve's limit there is a perfect score
        if value <= 0.0 {
            return 100.0;
        }
        let mu = self.median.ln();
        let sigma = LN_2 / (self.poor.ln() - mu);
        let z = (value.ln() - mu) / sigma;
        ((1.0 - standard_normal_cdf(z)) * 100.0).clamp(0.0, 100.0)
    }

    /// Score rounded to the nearest integer
    pub fn score(&self, value: f64) -> u8 {
        self.raw_score(value).round() as u8
    }
}

/// Score of a single metric value, or `None` for a NaN reading
pub fn metric_score(metric: Metric, value: f64) -> Option<u8> {
    if value.is_nan() {
        return None;
    }
    Some(LogNormalCurve::for_metric(metric).score(value))
}

/// Weighted performance score of a release.
///
/// Only metrics with a value take part, and the weights are renormalised
/// over them. Returns `None` when no metric is present.
pub fn performance_score(metrics: &MetricSet) -> Option<u8> {
    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for sample in metrics.samples() {
        let Some(score) = sample
            .value
            .and_then(|value| metric_score(sample.metric, value))
        else {
            continue;
        };
        let weight = sample.metric.weight();
        total += f64::from(score) * weight;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        Some((total / weight_sum).round() as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_medians() -> MetricSet {
        MetricSet::empty()
            .with(Metric::Fcp, 1800.0)
            .with(Metric::Lcp, 2500.0)
            .with(Metric::Tbt, 300.0)
            .with(Metric::Cls, 0.1)
            .with(Metric::Ttfb, 800.0)
    }

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((erf(3.0) - 0.999_977_91).abs() < 1e-6);
    }

    #[test]
    fn test_standard_normal_cdf() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!(standard_normal_cdf(-8.0) < 1e-6);
    }

    #[test]
    fn test_median_scores_fifty() {
        for metric in Metric::ALL {
            let (median, _) = metric.reference_points();
            assert_eq!(metric_score(metric, median), Some(50), "{metric}");
        }
    }

    #[test]
    fn test_poor_scores_below_median() {
        // With sigma = ln 2 / ln(poor/median) the poor point lands well
        // below 50 but not at zero: TBT (300, 600) gives z = ln 2.
        assert_eq!(metric_score(Metric::Tbt, 600.0), Some(24));
        assert_eq!(metric_score(Metric::Fcp, 3000.0), Some(35));
        for metric in Metric::ALL {
            let (_, poor) = metric.reference_points();
            assert!(metric_score(metric, poor).unwrap() < 50);
        }
    }

    #[test]
    fn test_far_tail_approaches_zero() {
        assert_eq!(metric_score(Metric::Lcp, 200_000.0), Some(0));
        assert_eq!(metric_score(Metric::Tbt, 20_000.0), Some(0));
    }

    #[test]
    fn test_zero_value_scores_perfect() {
        assert_eq!(metric_score(Metric::Cls, 0.0), Some(100));
        assert_eq!(metric_score(Metric::Tbt, 0.0), Some(100));
    }

    #[test]
    fn test_nan_value_has_no_score() {
        assert_eq!(metric_score(Metric::Lcp, f64::NAN), None);
    }

    #[test]
    fn test_score_is_monotonic_on_grid() {
        let curve = LogNormalCurve::for_metric(Metric::Lcp);
        let mut previous = u8::MAX;
        for step in 0..200 {
            let score = curve.score(step as f64 * 50.0);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_aggregate_at_medians_is_fifty() {
        let score = performance_score(&at_medians()).unwrap();
        assert!((48..=52).contains(&score));
        assert_eq!(score, 50);
    }

    #[test]
    fn test_aggregate_excludes_missing_metrics() {
        // Only CLS present: the aggregate is CLS's own score, not diluted
        let only_cls = MetricSet::empty().with(Metric::Cls, 0.0);
        assert_eq!(performance_score(&only_cls), Some(100));

        let mut partial = at_medians();
        partial.set(Metric::Ttfb, None);
        assert_eq!(performance_score(&partial), Some(50));
    }

    #[test]
    fn test_aggregate_weights_metrics() {
        // TBT perfect (weight .30), LCP at median (weight .25)
        let set = MetricSet::empty()
            .with(Metric::Tbt, 0.0)
            .with(Metric::Lcp, 2500.0);
        let expected = ((100.0 * 0.30 + 50.0 * 0.25) / 0.55_f64).round() as u8;
        assert_eq!(performance_score(&set), Some(expected));
    }

    #[test]
    fn test_aggregate_all_missing_is_none() {
        assert_eq!(performance_score(&MetricSet::empty()), None);
    }
}
