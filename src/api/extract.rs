//! Extractors that reject with the API envelope
//!
//! Axum's own `Query`, `Json` and `Path` rejections are plain text with
//! 4xx codes of their own; these wrappers turn every rejection into a 400
//! `ApiError::Validation`.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Trimmed search term of at least two characters
pub fn search_term(q: Option<&str>) -> Result<String, ApiError> {
    let term = q.map(str::trim).unwrap_or_default();
    if term.chars().count() < 2 {
        return Err(ApiError::Validation(
            "Search query must be at least 2 characters long".to_string(),
        ));
    }
    Ok(term.to_string())
}

/// Parse a `true`/`false`-ish query flag
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<Option<bool>, ApiError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(None),
        Some("true" | "1" | "yes") => Ok(Some(true)),
        Some("false" | "0" | "no") => Ok(Some(false)),
        Some(other) => Err(ApiError::Validation(format!(
            "Invalid value for {}: {} (expected true or false)",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_length() {
        assert!(search_term(None).is_err());
        assert!(search_term(Some("")).is_err());
        assert!(search_term(Some(" a ")).is_err());
        assert_eq!(search_term(Some(" re ")).unwrap(), "re");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("tameable", Some("TRUE")).unwrap(), Some(true));
        assert_eq!(parse_flag("tameable", Some("0")).unwrap(), Some(false));
        assert_eq!(parse_flag("tameable", None).unwrap(), None);
        assert!(parse_flag("tameable", Some("maybe")).is_err());
    }
}
