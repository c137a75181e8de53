//! Endpoint latency middleware.
//!
//! Metric keys derive from the request method and a truncated, sanitized
//! path (first few segments, slashes replaced with underscores) so that
//! dynamic path parameters cannot explode metric-name cardinality.

use crate::recorder::MetricRecorder;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::time::Instant;

/// Path segments kept when deriving a metric key.
pub const PATH_SEGMENT_LIMIT: usize = 3;

/// First [`PATH_SEGMENT_LIMIT`] path segments joined with underscores,
/// stripped to alphanumerics, hyphens, and underscores.
pub fn sanitize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .take(PATH_SEGMENT_LIMIT)
        .map(|segment| {
            segment
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Metric key for an endpoint: `api.{method}.{sanitized_path}`.
pub fn endpoint_metric_key(method: &str, path: &str) -> String {
    let sanitized = sanitize_path(path);
    let method = method.to_ascii_lowercase();
    if sanitized.is_empty() {
        format!("api.{method}.root")
    } else {
        format!("api.{method}.{sanitized}")
    }
}

/// Axum middleware recording endpoint latency and status code through the
/// injected [`MetricRecorder`].
///
/// ```rust,ignore
/// use axum::{Router, middleware, routing::get};
/// use koinonia_observability::{MetricRecorder, track_endpoint_latency};
///
/// let recorder = MetricRecorder::noop();
/// let app: Router = Router::new()
///     .route("/api/health", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(recorder, track_endpoint_latency));
/// ```
pub async fn track_endpoint_latency(
    State(recorder): State<MetricRecorder>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let millis = start.elapsed().as_secs_f64() * 1000.0;

    recorder.record_api_endpoint(&method, &path, response.status().as_u16(), millis);

    response
}
