//! Metric accumulation and the benchmark workflow.
//!
//! The engine holds the current run's raw metric sequence, reduces it into
//! baseline snapshots, and diffs live samples against a previously stored
//! baseline. It is an explicitly constructed, explicitly owned object with
//! one instance per process or test; there is no module-level singleton.
//!
//! Recording is infallible and fast; only baseline persistence touches the
//! filesystem. In a multi-threaded runtime the engine must be owned by a
//! single task or wrapped in a lock by the caller.

use crate::baseline::{Baseline, BaselineStore, DEFAULT_VERSION};
use crate::error::BenchError;
use crate::regression::{
    Classification, Improvement, Regression, RegressionAnalysis, classify,
};
use crate::stats::{Metric, MetricUnit, PercentileSummary};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

/// One element of a bulk recording call. A missing unit defaults to
/// milliseconds when the sample is recorded.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<MetricUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

/// Accumulates timing samples, persists baseline snapshots, and classifies
/// regressions against them.
#[derive(Debug, Default)]
pub struct BenchmarkEngine {
    metrics: Vec<Metric>,
    store: BaselineStore,
}

impl BenchmarkEngine {
    /// Engine with the default baseline directory (`benchmarks/` under the
    /// current working directory).
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine backed by a specific baseline store.
    pub fn with_store(store: BaselineStore) -> Self {
        Self {
            metrics: Vec::new(),
            store,
        }
    }

    /// The underlying baseline store.
    pub fn store(&self) -> &BaselineStore {
        &self.store
    }

    /// Record one duration sample in milliseconds.
    ///
    /// Values are taken as-is: no validation of sign or name emptiness, so
    /// garbage values propagate into summaries.
    pub fn record_metric(&mut self, name: impl Into<String>, duration: f64) {
        self.record_metric_with(name, duration, MetricUnit::Milliseconds, None);
    }

    /// Record one sample with an explicit unit and optional tags.
    pub fn record_metric_with(
        &mut self,
        name: impl Into<String>,
        duration: f64,
        unit: MetricUnit,
        tags: Option<HashMap<String, String>>,
    ) {
        self.metrics.push(Metric {
            name: name.into(),
            duration,
            unit,
            timestamp: Utc::now(),
            tags,
        });
    }

    /// Bulk recording convenience; forwards each sample to the single-record
    /// path. Cannot fail, so one odd sample never blocks the rest.
    pub fn record_metrics(&mut self, samples: impl IntoIterator<Item = MetricSample>) {
        for sample in samples {
            self.record_metric_with(
                sample.name,
                sample.duration,
                sample.unit.unwrap_or_default(),
                sample.tags,
            );
        }
    }

    /// A copy of the currently held metric sequence.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.clone()
    }

    /// Drop all held metrics. Used between test cases or before creating a
    /// fresh baseline so the snapshot reflects only the current run.
    pub fn clear_metrics(&mut self) {
        self.metrics.clear();
    }

    /// Snapshot the current metrics into a baseline with the default version
    /// and persist it.
    pub fn create_baseline(&mut self, name: impl Into<String>) -> Result<Baseline, BenchError> {
        self.create_baseline_with_version(name, DEFAULT_VERSION)
    }

    /// Snapshot the current metrics into a named, versioned baseline.
    ///
    /// Groups samples by metric name, reduces each group to a percentile
    /// summary, and writes the result synchronously. The returned value is
    /// identical to the persisted one.
    pub fn create_baseline_with_version(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Baseline, BenchError> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for metric in &self.metrics {
            groups
                .entry(metric.name.clone())
                .or_default()
                .push(metric.duration);
        }

        let metrics = groups
            .into_iter()
            .map(|(name, durations)| (name, PercentileSummary::from_durations(&durations)))
            .collect();

        let baseline = Baseline {
            name: name.into(),
            version: version.into(),
            timestamp: Utc::now(),
            metrics,
        };

        self.store.save(&baseline)?;
        Ok(baseline)
    }

    /// Compare the live metric sequence against a baseline.
    ///
    /// The loop iterates baseline metric names only: metrics present in the
    /// live sequence but absent from the baseline are never reported. Names
    /// with zero live samples are skipped — absence of current data is not a
    /// regression. A baseline p95 of zero is "no data" and is skipped with a
    /// warning rather than dividing by zero.
    pub fn analyze_regression(
        &self,
        baseline: &Baseline,
        name: Option<&str>,
    ) -> RegressionAnalysis {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("regression-{}", Utc::now().timestamp_millis()));

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();

        for (metric_name, summary) in &baseline.metrics {
            let samples: Vec<f64> = self
                .metrics
                .iter()
                .filter(|m| &m.name == metric_name)
                .map(|m| m.duration)
                .collect();

            if samples.is_empty() {
                continue;
            }

            if summary.p95 == 0.0 {
                tracing::warn!(
                    metric = %metric_name,
                    "baseline p95 is zero, skipping comparison"
                );
                continue;
            }

            let current = PercentileSummary::from_durations(&samples);
            let change = (current.p95 - summary.p95) / summary.p95;

            match classify(change) {
                Some(Classification::Regression(severity)) => regressions.push(Regression {
                    metric: metric_name.clone(),
                    baseline_value: summary.p95,
                    current_value: current.p95,
                    percent_change: change * 100.0,
                    severity,
                }),
                Some(Classification::Improvement) => improvements.push(Improvement {
                    metric: metric_name.clone(),
                    baseline_value: summary.p95,
                    current_value: current.p95,
                    percent_change: change * 100.0,
                }),
                None => {}
            }
        }

        let passed_threshold = !regressions.iter().any(|r| r.severity.blocks_gate());

        RegressionAnalysis {
            name,
            timestamp: Utc::now(),
            baseline: baseline.name.clone(),
            regressions,
            improvements,
            passed_threshold,
        }
    }

    /// CI gate: true iff comparing the live metrics against the baseline
    /// finds no critical or high regression.
    pub fn passed_regression_test(&self, baseline: &Baseline) -> bool {
        self.analyze_regression(baseline, None).passed_threshold
    }
}
