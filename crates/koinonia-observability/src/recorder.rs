//! Metric recording facade for the Koinonia Connect backend.
//!
//! Named recording operations for each instrumented domain: database query
//! latency, API endpoint latency, message delivery, billing usage,
//! subscription counts, cache access, and errors. Every operation forwards
//! to the injected [`MonitoringBackend`] and applies local threshold checks
//! that log through `tracing` regardless of which backend is installed.

use crate::backend::{MonitoringBackend, NoopBackend};
use crate::http::endpoint_metric_key;
use std::sync::Arc;
use std::time::Instant;

/// Database queries slower than this are flagged as slow.
pub const SLOW_QUERY_MS: f64 = 500.0;
/// Database queries slower than this are additionally logged as warnings.
pub const VERY_SLOW_QUERY_MS: f64 = 1000.0;
/// API endpoints slower than this are flagged and always warned.
pub const SLOW_ENDPOINT_MS: f64 = 3000.0;
/// Delivery success rates below this trigger a degradation warning.
pub const DELIVERY_RATE_DEGRADED: f64 = 0.95;

/// Fire-and-forget metric recorder. Cloning is cheap; clones share the same
/// backend. Recording never fails and never panics.
#[derive(Clone)]
pub struct MetricRecorder {
    backend: Arc<dyn MonitoringBackend>,
}

impl Default for MetricRecorder {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for MetricRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRecorder").finish_non_exhaustive()
    }
}

impl MetricRecorder {
    /// Recorder forwarding to the given backend.
    pub fn new(backend: Arc<dyn MonitoringBackend>) -> Self {
        Self { backend }
    }

    /// Recorder with no external backend. Threshold logging still applies.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopBackend))
    }

    /// Record a database query's latency and outcome.
    pub fn record_database_query(&self, query_name: &str, millis: f64, success: bool) {
        let status = if success { "ok" } else { "error" };
        self.backend.record_timing(
            "db.query.duration",
            millis,
            &[("query", query_name), ("status", status)],
        );

        if millis > SLOW_QUERY_MS {
            self.backend
                .increment("db.query.slow", 1, &[("query", query_name)]);
            tracing::debug!(query = query_name, duration_ms = millis, "slow database query");
        }
        if millis > VERY_SLOW_QUERY_MS {
            tracing::warn!(
                query = query_name,
                duration_ms = millis,
                "very slow database query"
            );
        }
    }

    /// Record an API endpoint's latency, keyed by method and a sanitized,
    /// truncated path to bound metric-name cardinality.
    pub fn record_api_endpoint(&self, method: &str, path: &str, status: u16, millis: f64) {
        let key = endpoint_metric_key(method, path);
        let status = status.to_string();
        self.backend
            .record_timing(&key, millis, &[("status", status.as_str())]);

        if millis > SLOW_ENDPOINT_MS {
            tracing::warn!(endpoint = %key, duration_ms = millis, "slow API endpoint");
        }
    }

    /// Record a message delivery batch for a church. A success rate below
    /// [`DELIVERY_RATE_DEGRADED`] warns; a batch with nothing sent records
    /// nothing.
    pub fn record_message_delivery(&self, church_id: &str, sent: u64, delivered: u64) {
        if sent == 0 {
            return;
        }

        let rate = delivered as f64 / sent as f64;
        self.backend
            .increment("messages.sent", sent, &[("church", church_id)]);
        self.backend
            .gauge("messages.delivery_rate", rate, &[("church", church_id)]);

        if rate < DELIVERY_RATE_DEGRADED {
            tracing::warn!(
                church = church_id,
                delivery_rate = rate,
                sent,
                delivered,
                "message delivery rate degraded"
            );
        }
    }

    /// Record a church's SMS usage against its plan limit.
    pub fn record_billing_usage(&self, church_id: &str, used: u64, limit: u64) {
        self.backend
            .gauge("billing.usage", used as f64, &[("church", church_id)]);
        if limit > 0 {
            self.backend.gauge(
                "billing.usage_ratio",
                used as f64 / limit as f64,
                &[("church", church_id)],
            );
        }
    }

    /// Record the current active subscription count for a plan.
    pub fn record_subscription_count(&self, plan: &str, count: u64) {
        self.backend
            .gauge("subscriptions.active", count as f64, &[("plan", plan)]);
    }

    /// Record a cache hit or miss.
    pub fn record_cache_access(&self, cache_name: &str, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.backend.increment(
            "cache.access",
            1,
            &[("cache", cache_name), ("outcome", outcome)],
        );
    }

    /// Record a generic application error.
    pub fn record_error(&self, scope: &str, error_kind: &str) {
        self.backend
            .increment("errors.total", 1, &[("scope", scope), ("kind", error_kind)]);
    }

    /// Time an async operation. The elapsed duration is forwarded under
    /// `op.{name}.duration`; a failure is logged with its elapsed time and
    /// the original error is returned unchanged.
    pub async fn time_async<F, T, E>(&self, name: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let result = fut.await;
        self.observe_timed(name, start, &result);
        result
    }

    /// Synchronous counterpart of [`MetricRecorder::time_async`].
    pub fn time_sync<F, T, E>(&self, name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let result = f();
        self.observe_timed(name, start, &result);
        result
    }

    fn observe_timed<T, E: std::fmt::Display>(
        &self,
        name: &str,
        start: Instant,
        result: &Result<T, E>,
    ) {
        let millis = start.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(_) => {
                self.backend
                    .record_timing(&format!("op.{name}.duration"), millis, &[]);
            }
            Err(e) => {
                self.backend
                    .increment(&format!("op.{name}.failure"), 1, &[]);
                tracing::warn!(
                    operation = name,
                    duration_ms = millis,
                    error = %e,
                    "timed operation failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures backend calls for assertions.
    #[derive(Default)]
    struct CapturingBackend {
        timings: Mutex<Vec<(String, f64)>>,
        counts: Mutex<Vec<(String, u64)>>,
        gauges: Mutex<Vec<(String, f64)>>,
    }

    impl MonitoringBackend for CapturingBackend {
        fn record_timing(&self, name: &str, millis: f64, _tags: &[(&str, &str)]) {
            if let Ok(mut timings) = self.timings.lock() {
                timings.push((name.to_string(), millis));
            }
        }

        fn increment(&self, name: &str, value: u64, _tags: &[(&str, &str)]) {
            if let Ok(mut counts) = self.counts.lock() {
                counts.push((name.to_string(), value));
            }
        }

        fn gauge(&self, name: &str, value: f64, _tags: &[(&str, &str)]) {
            if let Ok(mut gauges) = self.gauges.lock() {
                gauges.push((name.to_string(), value));
            }
        }
    }

    fn capturing_recorder() -> (MetricRecorder, Arc<CapturingBackend>) {
        let backend = Arc::new(CapturingBackend::default());
        (MetricRecorder::new(backend.clone()), backend)
    }

    #[test]
    fn fast_query_records_timing_without_slow_counter() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_database_query("members.findMany", 120.0, true);

        let timings = backend.timings.lock().unwrap();
        assert_eq!(timings.len(), 1);
        assert_eq!(timings[0].0, "db.query.duration");
        assert!(backend.counts.lock().unwrap().is_empty());
    }

    #[test]
    fn slow_query_increments_slow_counter() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_database_query("members.findMany", 620.0, true);

        let counts = backend.counts.lock().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].0, "db.query.slow");
    }

    #[test]
    fn exact_threshold_is_not_slow() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_database_query("members.findMany", SLOW_QUERY_MS, true);

        assert!(backend.counts.lock().unwrap().is_empty());
    }

    #[test]
    fn endpoint_metric_key_is_sanitized() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_api_endpoint("GET", "/api/churches/abc123/members", 200, 42.0);

        let timings = backend.timings.lock().unwrap();
        assert_eq!(timings[0].0, "api.get.api_churches_abc123");
    }

    #[test]
    fn degraded_delivery_rate_still_records_metrics() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_message_delivery("church-1", 100, 90);

        let gauges = backend.gauges.lock().unwrap();
        assert_eq!(gauges.len(), 1);
        assert_eq!(gauges[0].0, "messages.delivery_rate");
        assert!((gauges[0].1 - 0.9).abs() < 1e-9);
    }

    #[test]
    fn empty_delivery_batch_records_nothing() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_message_delivery("church-1", 0, 0);

        assert!(backend.gauges.lock().unwrap().is_empty());
        assert!(backend.counts.lock().unwrap().is_empty());
    }

    #[test]
    fn billing_usage_ratio_skipped_for_zero_limit() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_billing_usage("church-1", 50, 0);

        let gauges = backend.gauges.lock().unwrap();
        assert_eq!(gauges.len(), 1);
        assert_eq!(gauges[0].0, "billing.usage");
    }

    #[test]
    fn cache_and_error_counters() {
        let (recorder, backend) = capturing_recorder();

        recorder.record_cache_access("plan-limits", true);
        recorder.record_cache_access("plan-limits", false);
        recorder.record_error("sms", "twilio_timeout");

        let counts = backend.counts.lock().unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|(name, _)| name == "cache.access" || name == "errors.total"));
    }

    #[test]
    fn time_sync_returns_value_and_records_duration() {
        let (recorder, backend) = capturing_recorder();

        let result: Result<i32, String> = recorder.time_sync("load_members", || Ok(7));

        assert_eq!(result.unwrap(), 7);
        let timings = backend.timings.lock().unwrap();
        assert_eq!(timings[0].0, "op.load_members.duration");
    }

    #[test]
    fn time_sync_propagates_error_unchanged() {
        let (recorder, backend) = capturing_recorder();

        let result: Result<(), String> =
            recorder.time_sync("load_members", || Err("boom".to_string()));

        assert_eq!(result.unwrap_err(), "boom");
        assert!(backend.timings.lock().unwrap().is_empty());
        let counts = backend.counts.lock().unwrap();
        assert_eq!(counts[0].0, "op.load_members.failure");
    }

    #[tokio::test]
    async fn time_async_records_duration_on_success() {
        let (recorder, backend) = capturing_recorder();

        let result: Result<&str, String> =
            recorder.time_async("send_batch", async { Ok("sent") }).await;

        assert_eq!(result.unwrap(), "sent");
        let timings = backend.timings.lock().unwrap();
        assert_eq!(timings[0].0, "op.send_batch.duration");
    }

    #[tokio::test]
    async fn time_async_propagates_error_unchanged() {
        let (recorder, _backend) = capturing_recorder();

        let result: Result<(), String> = recorder
            .time_async("send_batch", async { Err("twilio down".to_string()) })
            .await;

        assert_eq!(result.unwrap_err(), "twilio down");
    }

    #[test]
    fn recording_with_noop_backend_does_not_panic() {
        let recorder = MetricRecorder::noop();

        recorder.record_database_query("q", 2000.0, false);
        recorder.record_api_endpoint("POST", "/api/messages", 500, 5000.0);
        recorder.record_message_delivery("church-1", 10, 5);
        recorder.record_subscription_count("growth", 42);
    }
}
