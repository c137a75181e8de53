//! # Koinonia Observability
//!
//! Metric recording facade and slow-query logging for the Koinonia Connect
//! backend. The recorder forwards observations to an injected monitoring
//! backend and independently applies local threshold checks, so slow queries
//! and degraded delivery rates are logged whether or not an external backend
//! is configured.
//!
//! All recording paths are infallible: they never panic and never affect the
//! caller's control flow. State is process-local with no persistence — a
//! restart loses slow-query history by design.
//!
//! ## Usage
//!
//! ```rust
//! use koinonia_observability::{MetricRecorder, SlowQueryLog};
//!
//! let recorder = MetricRecorder::noop();
//! recorder.record_database_query("members.findMany", 620.0, true);
//!
//! let log = SlowQueryLog::new(100);
//! assert!(log.stats().count == 0);
//! ```

/// Monitoring backend abstraction with no-op and logging implementations
pub mod backend;
/// Endpoint latency middleware and metric-key sanitization
pub mod http;
/// The metric recording facade
pub mod recorder;
/// Fixed-capacity slow-query event buffer
pub mod slow_query;

pub use backend::{LogBackend, MonitoringBackend, NoopBackend};
pub use http::{endpoint_metric_key, sanitize_path, track_endpoint_latency};
pub use recorder::{
    DELIVERY_RATE_DEGRADED, MetricRecorder, SLOW_ENDPOINT_MS, SLOW_QUERY_MS, VERY_SLOW_QUERY_MS,
};
pub use slow_query::{SlowQueryEvent, SlowQueryLog, SlowQueryStats};
