//! API error type and the failure envelope
//!
//! Every handler returns `Result<_, ApiError>`; the envelope is
//! `{ "success": false, "error": "...", "message"?: "..." }`.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::jobs::JobError;
use crate::storage::StoreError;
use crate::taming::TamingError;

static REDACT_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Hide database and internal error text from clients (production)
pub fn set_redact_internal_errors(redact: bool) {
    REDACT_INTERNAL_ERRORS.store(redact, Ordering::Relaxed);
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("Too many requests, please try again later")]
    RateLimited { retry_after_secs: u64 },
    #[error("Database error")]
    Store(#[from] StoreError),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope body; `redact` drops the detail of server-side failures
    pub fn body(&self, redact: bool) -> serde_json::Value {
        let detail = match self {
            Self::Store(e) => Some(e.to_string()),
            Self::Internal(msg) => Some(msg.clone()),
            _ => None,
        };
        match detail {
            Some(message) if !redact => json!({ "success": false, "error": self.to_string(), "message": message }),
            _ => json!({ "success": false, "error": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }

        let body = self.body(REDACT_INTERNAL_ERRORS.load(Ordering::Relaxed));
        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<TamingError> for ApiError {
    fn from(e: TamingError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("q".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RateLimited { retry_after_secs: 3 }.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::Store(StoreError::Migration("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(JobError::QueueFull).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_detail_is_redacted_in_production() {
        let err = ApiError::Store(StoreError::Migration("relation \"maps\" does not exist".into()));

        let open = err.body(false);
        assert_eq!(open["error"], "Database error");
        assert!(open["message"].as_str().unwrap().contains("maps"));

        let redacted = err.body(true);
        assert_eq!(redacted["success"], false);
        assert!(redacted.get("message").is_none());
    }

    #[test]
    fn test_validation_body_carries_message_as_error() {
        let body = ApiError::Validation("Query must be at least 2 characters".into()).body(true);
        assert_eq!(body["error"], "Query must be at least 2 characters");
    }
}
