//! Region endpoints
//!
//! - GET /api/regions
//! - GET /api/regions/{id}

use axum::{extract::State, routing::get, Router};
use serde::Deserialize;

use super::creatures::non_empty;
use super::extract::{ApiPath, ApiQuery};
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::MapRegion;
use crate::pagination::PageRequest;
use crate::storage::repository::RegionFilter;
use crate::storage::CatalogReader;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/regions", get(list_regions))
        .route("/api/regions/{id}", get(get_region))
}

#[derive(Debug, Deserialize)]
pub struct RegionListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Map slug
    pub map: Option<String>,
    pub category: Option<String>,
    /// Alias of `category`
    pub biome: Option<String>,
}

async fn list_regions(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<RegionListQuery>,
) -> ApiResult<ApiResponse<Vec<MapRegion>>> {
    let filter = RegionFilter {
        map: non_empty(&query.map),
        category: non_empty(&query.category).or_else(|| non_empty(&query.biome)),
    };
    let page = PageRequest::new(query.page, query.limit);
    let result = state.catalog.list_regions(&filter, page).await?;
    Ok(ApiResponse::paged(result, page).noted(&state))
}

async fn get_region(State(state): State<ApiState>, ApiPath(id): ApiPath<i64>) -> ApiResult<ApiResponse<MapRegion>> {
    let region = state
        .catalog
        .get_region(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Region not found: {}", id)))?;
    Ok(ApiResponse::ok(region).noted(&state))
}
