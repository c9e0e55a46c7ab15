//! Creature endpoints
//!
//! - GET /api/creatures
//! - GET /api/creatures/search
//! - GET /api/creatures/{slug}

use axum::{extract::State, routing::get, Router};
use serde::Deserialize;

use super::extract::{parse_flag, search_term, ApiPath, ApiQuery};
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::{Creature, CreatureDetail};
use crate::pagination::{PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
use crate::storage::repository::CreatureFilter;
use crate::storage::CatalogReader;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/creatures", get(list_creatures))
        .route("/api/creatures/search", get(search_creatures))
        .route("/api/creatures/{slug}", get(get_creature))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatureListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub tameable: Option<String>,
    pub rideable: Option<String>,
    pub breedable: Option<String>,
    pub temperament: Option<String>,
    pub diet: Option<String>,
}

impl CreatureListQuery {
    fn filter(&self) -> ApiResult<CreatureFilter> {
        Ok(CreatureFilter {
            tameable: parse_flag("tameable", self.tameable.as_deref())?,
            rideable: parse_flag("rideable", self.rideable.as_deref())?,
            breedable: parse_flag("breedable", self.breedable.as_deref())?,
            temperament: non_empty(&self.temperament),
            diet: non_empty(&self.diet),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_creatures(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<CreatureListQuery>,
) -> ApiResult<ApiResponse<Vec<Creature>>> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.limit);
    let result = state.catalog.list_creatures(&filter, page).await?;
    Ok(ApiResponse::paged(result, page).noted(&state))
}

async fn search_creatures(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<ApiResponse<Vec<Creature>>> {
    let term = search_term(query.q.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let creatures = state.catalog.search_creatures(&term, limit).await?;
    Ok(ApiResponse::list(creatures).noted(&state))
}

async fn get_creature(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<CreatureDetail>> {
    let detail = state
        .catalog
        .get_creature(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Creature not found: {}", slug)))?;
    Ok(ApiResponse::ok(detail).noted(&state))
}
