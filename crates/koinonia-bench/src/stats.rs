//! Percentile statistics over raw timing samples.
//!
//! Summaries use the nearest-rank method (no interpolation): for percentile
//! `p` over `n` sorted samples the chosen index is `ceil(n * p / 100) - 1`,
//! clamped to zero. Sorting normalizes input order, so the same multiset of
//! durations always produces the same summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unit of a recorded metric value. Durations default to milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    #[default]
    Milliseconds,
    Seconds,
    Percent,
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricUnit::Milliseconds => write!(f, "ms"),
            MetricUnit::Seconds => write!(f, "s"),
            MetricUnit::Percent => write!(f, "%"),
        }
    }
}

/// A single timing observation captured by instrumented code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub duration: f64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Derived per-metric summary. All percentile fields are actual sample
/// values; `avg` is the arithmetic mean rounded to the nearest integer.
///
/// An all-zero summary with `count == 0` means "no data", not a real
/// measurement of zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

impl PercentileSummary {
    /// Reduce a sequence of durations to a summary.
    ///
    /// Empty input yields the all-zero summary rather than an error, so a
    /// first run with no samples never fails.
    pub fn from_durations(durations: &[f64]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }

        let mut sorted = durations.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let len = sorted.len();
        let sum: f64 = sorted.iter().sum();

        Self {
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
            min: sorted[0],
            max: sorted[len - 1],
            avg: (sum / len as f64).round(),
            count: len,
        }
    }

    /// Whether this summary carries any samples.
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Nearest-rank percentile: `ceil(n * p / 100) - 1`, clamped to valid range.
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let rank = (sorted.len() as f64 * percentile / 100.0).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_yields_all_zero_summary() {
        let summary = PercentileSummary::from_durations(&[]);
        assert_eq!(summary, PercentileSummary::default());
        assert_eq!(summary.count, 0);
        assert!(!summary.has_data());
    }

    #[test]
    fn five_sample_example() {
        // p95 index = ceil(5 * 95 / 100) - 1 = 4, so p95 picks the outlier.
        let summary = PercentileSummary::from_durations(&[100.0, 100.0, 100.0, 100.0, 500.0]);

        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 500.0);
        assert_eq!(summary.avg, 180.0);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.p95, 500.0);
        assert_eq!(summary.p50, 100.0);
    }

    #[test]
    fn single_sample_pins_every_field() {
        let summary = PercentileSummary::from_durations(&[42.0]);
        assert_eq!(summary.p50, 42.0);
        assert_eq!(summary.p95, 42.0);
        assert_eq!(summary.p99, 42.0);
        assert_eq!(summary.min, 42.0);
        assert_eq!(summary.max, 42.0);
        assert_eq!(summary.avg, 42.0);
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn avg_rounds_half_up() {
        // mean of [1, 2] = 1.5, rounds away from zero
        let summary = PercentileSummary::from_durations(&[1.0, 2.0]);
        assert_eq!(summary.avg, 2.0);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = PercentileSummary::from_durations(&[5.0, 1.0, 3.0, 2.0, 4.0]);
        let b = PercentileSummary::from_durations(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn hundred_samples_pick_expected_ranks() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let summary = PercentileSummary::from_durations(&samples);
        assert_eq!(summary.p50, 50.0);
        assert_eq!(summary.p95, 95.0);
        assert_eq!(summary.p99, 99.0);
    }

    proptest! {
        #[test]
        fn summary_is_permutation_invariant(
            mut samples in prop::collection::vec(0.0f64..10_000.0, 1..64),
            seed in any::<u64>(),
        ) {
            let original = PercentileSummary::from_durations(&samples);

            // Cheap deterministic shuffle.
            let len = samples.len();
            for i in 0..len {
                let j = (seed as usize).wrapping_mul(31).wrapping_add(i * 7) % len;
                samples.swap(i, j);
            }

            let shuffled = PercentileSummary::from_durations(&samples);
            prop_assert_eq!(original, shuffled);
        }

        #[test]
        fn percentiles_are_ordered(samples in prop::collection::vec(0.0f64..10_000.0, 1..64)) {
            let summary = PercentileSummary::from_durations(&samples);
            prop_assert!(summary.min <= summary.p50);
            prop_assert!(summary.p50 <= summary.p95);
            prop_assert!(summary.p95 <= summary.p99);
            prop_assert!(summary.p99 <= summary.max);
        }
    }
}
