//! # Koinonia Benchmark Engine
//!
//! In-process performance benchmarking with baseline persistence and
//! regression detection, used by the Koinonia Connect CI pipeline.
//!
//! ## Components
//!
//! - **Statistics**: nearest-rank percentile summaries over raw timing samples
//! - **Baseline Management**: store and retrieve named baseline snapshots
//! - **Regression Detection**: p95 comparison with severity classification
//! - **Report Generation**: plain-text report rendering for CI output
//!
//! ## Usage
//!
//! ```rust
//! use koinonia_bench::{BaselineStore, BenchmarkEngine};
//! use tempfile::TempDir;
//!
//! let dir = TempDir::new().unwrap();
//! let mut engine = BenchmarkEngine::with_store(BaselineStore::new(dir.path()));
//!
//! for duration in [12.0, 14.0, 13.0, 15.0, 11.0] {
//!     engine.record_metric("db.query.members", duration);
//! }
//! let baseline = engine.create_baseline("main").unwrap();
//!
//! // A later run compares its own samples against the stored baseline.
//! engine.clear_metrics();
//! engine.record_metric("db.query.members", 13.0);
//! let analysis = engine.analyze_regression(&baseline, None);
//! assert!(analysis.passed_threshold);
//! ```

/// Baseline snapshot type and on-disk store
pub mod baseline;
/// Metric accumulation and the benchmark engine workflow
pub mod engine;
/// Error types for benchmark operations
pub mod error;
/// Percentile statistics over raw timing samples
pub mod stats;
/// Regression classification against stored baselines
pub mod regression;
/// Plain-text regression report rendering
pub mod report;

pub use baseline::{Baseline, BaselineStore, DEFAULT_BASELINE_DIR, DEFAULT_VERSION};
pub use engine::{BenchmarkEngine, MetricSample};
pub use error::BenchError;
pub use regression::{
    Classification, Improvement, Regression, RegressionAnalysis, Severity, classify,
};
pub use report::{print_report, render_report};
pub use stats::{Metric, MetricUnit, PercentileSummary};
