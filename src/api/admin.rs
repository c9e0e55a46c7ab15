//! Admin endpoints
//!
//! - POST /api/admin/populate-data      → 202 + job
//! - POST /api/admin/sync-data          → 202 + job
//! - POST /api/admin/reset-database     → 202 + job
//! - POST /api/admin/validate-database  → integrity report
//! - GET  /api/admin/status
//! - GET  /api/admin/jobs
//! - GET  /api/admin/jobs/{id}
//!
//! Job endpoints answer 503 on the mock store; there is nothing to populate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::extract::ApiPath;
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::jobs::{JobKind, JobQueue, JobRecord};
use crate::models::{DataSyncLog, IntegrityReport, SystemStatus, TableCounts};
use crate::storage::CatalogReader;

const RECENT_SYNC_LOGS: u32 = 10;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/admin/populate-data", post(populate_data))
        .route("/api/admin/sync-data", post(sync_data))
        .route("/api/admin/reset-database", post(reset_database))
        .route("/api/admin/validate-database", post(validate_database))
        .route("/api/admin/status", get(status))
        .route("/api/admin/jobs", get(list_jobs))
        .route("/api/admin/jobs/{id}", get(get_job))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    pub mode: &'static str,
    pub counts: TableCounts,
    pub system_status: Vec<SystemStatus>,
    pub recent_syncs: Vec<DataSyncLog>,
    pub jobs: Vec<JobRecord>,
}

fn job_queue(state: &ApiState) -> ApiResult<&JobQueue> {
    if state.is_mock() {
        return Err(ApiError::Unavailable(
            "Database not configured; admin data operations are unavailable in mock mode".to_string(),
        ));
    }
    state
        .jobs
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Background jobs are not running".to_string()))
}

fn submit(state: &ApiState, kind: JobKind, started: &str) -> ApiResult<Response> {
    let submission = job_queue(state)?.submit(kind)?;
    let message = if submission.deduplicated {
        format!("A {} job is already {}", kind.as_str(), submission.job.status.as_str())
    } else {
        info!("Admin queued {:?} as {}", kind, submission.job.id);
        started.to_string()
    };
    Ok((StatusCode::ACCEPTED, ApiResponse::ok(submission).with_message(message)).into_response())
}

async fn populate_data(State(state): State<ApiState>) -> ApiResult<Response> {
    submit(&state, JobKind::PopulateAll, "Data population started")
}

async fn sync_data(State(state): State<ApiState>) -> ApiResult<Response> {
    submit(&state, JobKind::SyncData, "Data sync started")
}

async fn reset_database(State(state): State<ApiState>) -> ApiResult<Response> {
    submit(&state, JobKind::ResetDatabase, "Database reset started")
}

async fn validate_database(State(state): State<ApiState>) -> ApiResult<ApiResponse<IntegrityReport>> {
    let report = state.catalog.integrity_report().await?;
    Ok(ApiResponse::ok(report).noted(&state))
}

async fn status(State(state): State<ApiState>) -> ApiResult<ApiResponse<AdminStatus>> {
    let status = AdminStatus {
        mode: if state.is_mock() { "mock" } else { "database" },
        counts: state.catalog.table_counts().await?,
        system_status: state.catalog.system_status().await?,
        recent_syncs: state.catalog.recent_sync_logs(RECENT_SYNC_LOGS).await?,
        jobs: state.jobs.as_ref().map(JobQueue::list).unwrap_or_default(),
    };
    Ok(ApiResponse::ok(status).noted(&state))
}

async fn list_jobs(State(state): State<ApiState>) -> ApiResult<ApiResponse<Vec<JobRecord>>> {
    let jobs = state.jobs.as_ref().map(JobQueue::list).unwrap_or_default();
    Ok(ApiResponse::list(jobs))
}

async fn get_job(State(state): State<ApiState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ApiResponse<JobRecord>> {
    let job = state
        .jobs
        .as_ref()
        .and_then(|jobs| jobs.get(id))
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", id)))?;
    Ok(ApiResponse::ok(job))
}
