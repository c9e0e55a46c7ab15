//! HTTP/JSON API Layer
//!
//! ## Architecture
//! ```text
//! Client (frontend, curl)
//!       ↓ HTTP, JSON
//! Axum Router (PORT, default 3000)
//!       ↓ rate limit → metrics → trace → cors
//! Resource Handlers (creatures, maps, regions, search, taming, admin, interactive maps)
//!       ↓
//! Catalog (PostgresStore | MemoryStore mock)          JobQueue → DataPopulationService
//! ```
//!
//! ## Envelope
//! Success: `{ "success": true, "data": ..., "pagination"?: ..., "message"?: ... }`
//! Failure: `{ "success": false, "error": "...", "message"?: "..." }`

pub mod admin;
pub mod creatures;
pub mod extract;
pub mod interactive_maps;
pub mod maps;
pub mod regions;
pub mod search;
pub mod taming;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::jobs::JobQueue;
use crate::metrics::ServerMetrics;
use crate::pagination::{PageRequest, Paged, Pagination};
use crate::rate_limit::RateLimiter;
use crate::storage::{Catalog, CatalogReader};

pub const MOCK_MESSAGE: &str = "Using mock data - database not configured";

/// Shared state available to all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<dyn Catalog>,
    /// Background population; `None` when the server runs on mock data
    pub jobs: Option<JobQueue>,
    /// Server-wide metrics (lock-free atomics)
    pub metrics: Arc<ServerMetrics>,
    pub rate_limiter: Arc<RateLimiter>,
    pub environment: String,
    pub cors_origin: String,
}

impl ApiState {
    pub fn new(catalog: Arc<dyn Catalog>, jobs: Option<JobQueue>) -> Self {
        Self {
            catalog,
            jobs,
            metrics: ServerMetrics::new(),
            rate_limiter: Arc::new(RateLimiter::disabled()),
            environment: "development".to_string(),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Arc::new(limiter);
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }

    pub fn is_mock(&self) -> bool {
        self.catalog.is_mock()
    }
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            count: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Add the mock-data note when the catalog is the mock store
    pub fn noted(mut self, state: &ApiState) -> Self {
        if state.is_mock() && self.message.is_none() {
            self.message = Some(MOCK_MESSAGE.to_string());
        }
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paged(page: Paged<T>, req: PageRequest) -> Self {
        Self {
            success: true,
            pagination: Some(Pagination::new(req, page.total)),
            data: Some(page.items),
            count: None,
            message: None,
        }
    }

    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self::ok(items).with_count(count)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

// ============================================================================
// Health & docs
// ============================================================================

async fn health_check(State(state): State<ApiState>) -> Response {
    let (database, healthy) = if state.is_mock() {
        ("mock", true)
    } else {
        match state.catalog.table_counts().await {
            Ok(_) => ("connected", true),
            Err(e) => {
                warn!("Health check: database unavailable: {}", e);
                ("unavailable", false)
            }
        }
    };

    let metrics = state.metrics.snapshot();
    let body = json!({
        "success": healthy,
        "status": if healthy { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment,
        "database": database,
        "uptimeSecs": metrics.uptime_secs,
        "requests": metrics.total_requests,
        "errors": metrics.total_errors,
    });
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body)).into_response()
}

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/api/health", "Service health, database mode and request counters"),
    ("GET", "/api/docs", "This document"),
    ("GET", "/api/creatures", "List creatures (tameable, rideable, breedable, temperament, diet, page, limit)"),
    ("GET", "/api/creatures/search", "Search creatures by name (q, limit)"),
    ("GET", "/api/creatures/{slug}", "Creature with stats and taming data"),
    ("GET", "/api/maps", "List maps (type=official|expansion|community, official, page, limit)"),
    ("GET", "/api/maps/{slug}", "Map by slug"),
    ("GET", "/api/maps/{slug}/regions", "Regions of a map"),
    ("GET", "/api/maps/{slug}/caves", "Caves of a map"),
    ("GET", "/api/maps/{slug}/resources", "Resources of a map"),
    ("GET", "/api/maps/{slug}/obelisks", "Obelisks of a map"),
    ("GET", "/api/maps/{slug}/supply-drops", "Supply drops of a map"),
    ("GET", "/api/maps/{slug}/base-spots", "Base spots of a map"),
    ("GET", "/api/regions", "List regions (map, category or biome, page, limit)"),
    ("GET", "/api/regions/{id}", "Region by id"),
    ("GET", "/api/search", "Search creatures, maps and regions (q, type, limit)"),
    ("GET", "/api/taming", "List taming data (method, page, limit)"),
    ("GET", "/api/taming/{slug}", "Taming data for a creature"),
    ("POST", "/api/taming/calculate", "Taming requirements {creature, level, food?, tamingSpeed?}"),
    ("GET", "/api/interactive-maps", "Maps with layer counts"),
    ("GET", "/api/interactive-maps/{slug}", "Map with its layers (layers=regions,caves,...)"),
    ("POST", "/api/admin/populate-data", "Queue a full population job"),
    ("POST", "/api/admin/sync-data", "Queue a creature and region re-scrape"),
    ("POST", "/api/admin/reset-database", "Queue a schema reset followed by population"),
    ("POST", "/api/admin/validate-database", "Integrity report"),
    ("GET", "/api/admin/status", "Table counts, status rows, recent syncs and jobs"),
    ("GET", "/api/admin/jobs", "Background jobs, newest first"),
    ("GET", "/api/admin/jobs/{id}", "Background job by id"),
    ("GET", "/metrics", "Prometheus metrics"),
    ("GET", "/metrics/json", "Metrics as JSON"),
];

async fn api_docs() -> Json<Value> {
    let endpoints: Vec<Value> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| json!({ "method": method, "path": path, "description": description }))
        .collect();
    Json(json!({
        "success": true,
        "data": {
            "name": "ARK: Survival Ascended Database API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": endpoints,
        }
    }))
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origin
        .split(',')
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();
    layer.allow_origin(origins)
}

/// Build the full API router with all resource endpoints
pub fn build_router(state: ApiState) -> Router {
    crate::error::set_redact_internal_errors(state.environment.eq_ignore_ascii_case("production"));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/docs", get(api_docs))
        .route("/metrics", get(crate::metrics::prometheus_handler))
        .route("/metrics/json", get(crate::metrics::json_metrics_handler))
        .merge(creatures::routes())
        .merge(maps::routes())
        .merge(regions::routes())
        .merge(search::routes())
        .merge(taming::routes())
        .merge(interactive_maps::routes())
        .merge(admin::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::rate_limit::rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.cors_origin))
        .with_state(state)
}

/// Serve a static frontend for every path the API does not claim
pub fn with_static_files(router: Router, dir: &Path) -> Router {
    if dir.is_dir() {
        info!("Serving static files from {}", dir.display());
        router.fallback_service(ServeDir::new(dir))
    } else {
        router
    }
}

/// Start the HTTP API server on the given port and run until `shutdown` resolves
pub async fn serve(router: Router, port: u16, shutdown: impl Future<Output = ()> + Send + 'static) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
