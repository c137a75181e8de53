//! Monitoring backend abstraction.
//!
//! The external APM client is an injected capability selected at startup,
//! not a runtime existence probe: code paths are identical with or without
//! a real backend, and tests exercise both by swapping implementations.
//! Methods are infallible and must not panic — backend failure must never
//! reach the hot path that recorded the observation.

/// Sink for metric observations. Implementations must be cheap enough to
/// call from request hot paths.
pub trait MonitoringBackend: Send + Sync {
    /// Record a duration in milliseconds under a metric name.
    fn record_timing(&self, name: &str, millis: f64, tags: &[(&str, &str)]);

    /// Increment a counter.
    fn increment(&self, name: &str, value: u64, tags: &[(&str, &str)]);

    /// Set a gauge to an absolute value.
    fn gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]);
}

/// Default backend when no external monitoring is configured. All
/// observations are dropped; local threshold logging still applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl MonitoringBackend for NoopBackend {
    fn record_timing(&self, _name: &str, _millis: f64, _tags: &[(&str, &str)]) {}
    fn increment(&self, _name: &str, _value: u64, _tags: &[(&str, &str)]) {}
    fn gauge(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
}

/// Backend that emits every observation as a debug-level tracing event.
/// Useful in development and when a log pipeline is the only sink available.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBackend;

impl MonitoringBackend for LogBackend {
    fn record_timing(&self, name: &str, millis: f64, tags: &[(&str, &str)]) {
        tracing::debug!(metric = name, millis, ?tags, "timing");
    }

    fn increment(&self, name: &str, value: u64, tags: &[(&str, &str)]) {
        tracing::debug!(metric = name, value, ?tags, "count");
    }

    fn gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        tracing::debug!(metric = name, value, ?tags, "gauge");
    }
}
