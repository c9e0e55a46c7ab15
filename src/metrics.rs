//! Server Metrics — request counters with Prometheus + JSON export
//!
//! Lock-free atomics only.
//!
//! ## Endpoints
//! - `GET /metrics` — Prometheus text format
//! - `GET /metrics/json` — JSON format

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::api::ApiState;
use crate::storage::CatalogReader;

/// Shared metrics state
#[derive(Debug)]
pub struct ServerMetrics {
    /// Total HTTP requests served
    pub total_requests: AtomicU64,
    /// Total request errors (4xx + 5xx)
    pub total_errors: AtomicU64,
    /// Requests rejected by the rate limiter
    pub rate_limited: AtomicU64,
    /// Cumulative request duration in microseconds
    pub total_duration_us: AtomicU64,
    pub start_time: Instant,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
            total_duration_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl ServerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, duration_us: u64, is_error: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_duration_us.fetch_add(duration_us, Ordering::Relaxed);
        if is_error {
            self.total_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn requests_per_second(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed) as f64;
        let uptime = self.uptime_secs();
        if uptime > 0.0 { total / uptime } else { 0.0 }
    }

    pub fn avg_duration_ms(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        let dur_us = self.total_duration_us.load(Ordering::Relaxed);
        if total > 0 {
            (dur_us as f64 / total as f64) / 1000.0
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> JsonMetrics {
        JsonMetrics {
            uptime_secs: self.uptime_secs(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_errors: self.total_errors.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            rps: self.requests_per_second(),
            avg_request_duration_ms: self.avg_duration_ms(),
        }
    }
}

// ============================================================================
// Axum Middleware — Automatic request tracking
// ============================================================================

/// Records request count and duration for every HTTP request.
pub async fn metrics_middleware(
    State(state): State<ApiState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let resp = next.run(req).await;
    let duration_us = start.elapsed().as_micros() as u64;
    let is_error = resp.status().is_client_error() || resp.status().is_server_error();

    state.metrics.record_request(duration_us, is_error);
    resp
}

// ============================================================================
// GET /metrics — Prometheus text exposition format
// ============================================================================

pub async fn prometheus_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let m = state.metrics.snapshot();
    let avg_req_duration_s = m.avg_request_duration_ms / 1000.0;
    let mock_mode = u8::from(state.catalog.is_mock());

    let body = format!(
        "# HELP ark_requests_total Total HTTP requests served\n\
         # TYPE ark_requests_total counter\n\
         ark_requests_total {total_requests}\n\
         \n\
         # HELP ark_request_errors_total Total HTTP request errors (4xx/5xx)\n\
         # TYPE ark_request_errors_total counter\n\
         ark_request_errors_total {total_errors}\n\
         \n\
         # HELP ark_rate_limited_total Requests rejected by the rate limiter\n\
         # TYPE ark_rate_limited_total counter\n\
         ark_rate_limited_total {rate_limited}\n\
         \n\
         # HELP ark_request_duration_seconds Average request duration\n\
         # TYPE ark_request_duration_seconds gauge\n\
         ark_request_duration_seconds {avg_req_duration_s:.6}\n\
         \n\
         # HELP ark_requests_per_second Current request throughput\n\
         # TYPE ark_requests_per_second gauge\n\
         ark_requests_per_second {rps:.2}\n\
         \n\
         # HELP ark_mock_mode 1 when serving the built-in mock dataset\n\
         # TYPE ark_mock_mode gauge\n\
         ark_mock_mode {mock_mode}\n\
         \n\
         # HELP ark_uptime_seconds Server uptime\n\
         # TYPE ark_uptime_seconds gauge\n\
         ark_uptime_seconds {uptime:.2}\n",
        total_requests = m.total_requests,
        total_errors = m.total_errors,
        rate_limited = m.rate_limited,
        rps = m.rps,
        uptime = m.uptime_secs,
    );

    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

// ============================================================================
// GET /metrics/json
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct JsonMetrics {
    pub uptime_secs: f64,
    pub total_requests: u64,
    pub total_errors: u64,
    pub rate_limited: u64,
    pub rps: f64,
    pub avg_request_duration_ms: f64,
}

pub async fn json_metrics_handler(State(state): State<ApiState>) -> Json<JsonMetrics> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_counts_errors() {
        let metrics = ServerMetrics::default();
        metrics.record_request(1_000, false);
        metrics.record_request(3_000, true);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.total_errors, 1);
        assert!((snap.avg_request_duration_ms - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_duration_without_requests_is_zero() {
        assert_eq!(ServerMetrics::default().avg_duration_ms(), 0.0);
    }
}
