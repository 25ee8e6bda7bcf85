//! Prometheus metrics for groupsync-server.
//!
//! Exposes request metrics in Prometheus format at the `/metrics` endpoint.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Call once at startup, before any request is served.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "groupsync_http_requests_total",
        "Total number of HTTP requests processed"
    );
    describe_histogram!(
        "groupsync_http_request_duration_seconds",
        "Duration of HTTP requests in seconds"
    );

    Ok(handle)
}

pub fn record_request(route: String, status: u16, duration: Duration) {
    counter!(
        "groupsync_http_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("groupsync_http_request_duration_seconds", "route" => route)
        .record(duration.as_secs_f64());
}

/// Middleware labelling each request with its route template.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let start = Instant::now();

    let response = next.run(req).await;
    record_request(route, response.status().as_u16(), start.elapsed());
    response
}
