//! Property-based tests for vitalsup using proptest
//!
//! These tests generate random metric values and release sequences to check
//! the scoring curve and the release-over-release comparison.

use proptest::prelude::*;
use vitalsup::scoring::{compare_metric, compare_releases, metric_score, performance_score};
use vitalsup::{Metric, MetricSet, PercentDelta, ReleaseId, ReleaseMetrics};

fn metric_strategy() -> impl Strategy<Value = Metric> {
    prop_oneof![
        Just(Metric::Fcp),
        Just(Metric::Lcp),
        Just(Metric::Tbt),
        Just(Metric::Cls),
        Just(Metric::Ttfb),
    ]
}

/// Plausible reading for a metric, including zero
fn value_strategy(metric: Metric) -> BoxedStrategy<f64> {
    match metric {
        Metric::Cls => (0.0..3.0f64).boxed(),
        _ => (0.0..60_000.0f64).boxed(),
    }
}

fn metric_set_strategy() -> impl Strategy<Value = MetricSet> {
    prop::collection::vec(prop::option::of(0.0..10_000.0f64), 5).prop_map(|values| {
        let mut set = MetricSet::empty();
        for (metric, value) in Metric::ALL.into_iter().zip(values) {
            set.set(metric, value);
        }
        set
    })
}

fn releases_strategy() -> impl Strategy<Value = ReleaseMetrics> {
    prop::collection::btree_map(0u64..500, metric_set_strategy(), 1..8).prop_map(|map| {
        map.into_iter()
            .map(|(number, set)| (ReleaseId::new(format!("release-{number}"), number), set))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_score_is_monotonically_non_increasing(
        (metric, a, b) in metric_strategy().prop_flat_map(|metric| {
            (Just(metric), value_strategy(metric), value_strategy(metric))
        })
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_score = metric_score(metric, low).unwrap();
        let high_score = metric_score(metric, high).unwrap();
        prop_assert!(low_score >= high_score, "{metric}: {low}->{low_score}, {high}->{high_score}");
    }

    #[test]
    fn test_score_stays_in_range(
        (metric, value) in metric_strategy().prop_flat_map(|metric| {
            (Just(metric), value_strategy(metric))
        })
    ) {
        let score = metric_score(metric, value).unwrap();
        prop_assert!(score <= 100);
        if value <= 0.0 {
            prop_assert_eq!(score, 100);
        }
    }

    #[test]
    fn test_aggregate_score_present_iff_any_metric(set in metric_set_strategy()) {
        let score = performance_score(&set);
        prop_assert_eq!(score.is_some(), !set.is_empty());
        if let Some(score) = score {
            prop_assert!(score <= 100);
        }
    }

    #[test]
    fn test_delta_is_exact_difference(
        metric in metric_strategy(),
        previous in 0.0..10_000.0f64,
        current in 0.0..10_000.0f64,
    ) {
        let prev_set = MetricSet::empty().with(metric, previous);
        let curr_set = MetricSet::empty().with(metric, current);
        let record = compare_metric(metric, &curr_set, Some(&prev_set)).unwrap();

        prop_assert_eq!(record.delta, Some(current - previous));
        match record.percent_delta {
            PercentDelta::Undefined => prop_assert_eq!(previous, 0.0),
            PercentDelta::Value(percent) => {
                let expected = (current - previous) / previous * 100.0;
                prop_assert!((percent - expected).abs() < 1e-9);
            }
            PercentDelta::Unavailable => prop_assert!(false, "previous value was present"),
        }
    }

    #[test]
    fn test_previous_zero_gives_undefined_percent(
        metric in metric_strategy(),
        current in 0.0..10_000.0f64,
    ) {
        let prev_set = MetricSet::empty().with(metric, 0.0);
        let curr_set = MetricSet::empty().with(metric, current);
        let record = compare_metric(metric, &curr_set, Some(&prev_set)).unwrap();
        prop_assert_eq!(record.percent_delta, PercentDelta::Undefined);
    }

    #[test]
    fn test_comparison_follows_release_order(releases in releases_strategy()) {
        let comparisons = compare_releases(&releases);
        prop_assert_eq!(comparisons.len(), releases.len());

        let numbers: Vec<u64> = comparisons.iter().map(|c| c.release.number).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        prop_assert_eq!(&numbers, &sorted);

        // The oldest release never has a delta
        prop_assert!(comparisons[0].metrics.iter().all(|r| r.delta.is_none()));
        prop_assert!(
            comparisons[0]
                .metrics
                .iter()
                .all(|r| r.percent_delta == PercentDelta::Unavailable)
        );

        for window in releases.iter().collect::<Vec<_>>().windows(2) {
            let (_, previous) = window[0];
            let (release, current) = window[1];
            let comparison = comparisons.iter().find(|c| &c.release == release).unwrap();
            for metric in Metric::ALL {
                let record = comparison.record(metric);
                prop_assert_eq!(record.is_some(), current.get(metric).is_some());
                if let (Some(record), Some(prev), Some(curr)) =
                    (record, previous.get(metric), current.get(metric))
                {
                    prop_assert_eq!(record.delta, Some(curr - prev));
                }
            }
        }
    }
}
