//! Map endpoints
//!
//! - GET /api/maps
//! - GET /api/maps/{slug}
//! - GET /api/maps/{slug}/{regions,caves,resources,obelisks,supply-drops,base-spots}

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use super::extract::{parse_flag, ApiPath, ApiQuery};
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::{BaseSpot, Cave, Map, MapRegion, Obelisk, Resource, SupplyDrop};
use crate::pagination::PageRequest;
use crate::storage::repository::{MapFilter, MapKind};
use crate::storage::CatalogReader;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/maps", get(list_maps))
        .route("/api/maps/{slug}", get(get_map))
        .route("/api/maps/{slug}/regions", get(map_regions))
        .route("/api/maps/{slug}/caves", get(map_caves))
        .route("/api/maps/{slug}/resources", get(map_resources))
        .route("/api/maps/{slug}/obelisks", get(map_obelisks))
        .route("/api/maps/{slug}/supply-drops", get(map_supply_drops))
        .route("/api/maps/{slug}/base-spots", get(map_base_spots))
}

#[derive(Debug, Deserialize)]
pub struct MapListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub official: Option<String>,
}

impl MapListQuery {
    fn filter(&self) -> ApiResult<MapFilter> {
        let kind = match self.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(raw) => Some(MapKind::parse(raw).ok_or_else(|| {
                ApiError::Validation(format!(
                    "Invalid map type: {} (expected official, expansion or community)",
                    raw
                ))
            })?),
            None => None,
        };
        Ok(MapFilter {
            kind,
            official: parse_flag("official", self.official.as_deref())?,
        })
    }
}

/// Rows of one layer plus the map they belong to
#[derive(Debug, Serialize)]
pub struct MapLayer<T> {
    pub map: MapSummary,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<&Map> for MapSummary {
    fn from(map: &Map) -> Self {
        Self {
            id: map.id,
            name: map.name.clone(),
            slug: map.slug.clone(),
        }
    }
}

/// Resolve a map slug or fail with 404
pub(crate) async fn find_map(state: &ApiState, slug: &str) -> ApiResult<Map> {
    state
        .catalog
        .get_map(slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Map not found: {}", slug)))
}

fn layer<T: Serialize>(state: &ApiState, map: &Map, items: Vec<T>) -> ApiResponse<MapLayer<T>> {
    let count = items.len();
    ApiResponse::ok(MapLayer {
        map: map.into(),
        items,
    })
    .with_count(count)
    .noted(state)
}

async fn list_maps(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<MapListQuery>,
) -> ApiResult<ApiResponse<Vec<Map>>> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.limit);
    let result = state.catalog.list_maps(&filter, page).await?;
    Ok(ApiResponse::paged(result, page).noted(&state))
}

async fn get_map(State(state): State<ApiState>, ApiPath(slug): ApiPath<String>) -> ApiResult<ApiResponse<Map>> {
    let map = find_map(&state, &slug).await?;
    Ok(ApiResponse::ok(map).noted(&state))
}

async fn map_regions(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<MapRegion>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_regions(map.id).await?;
    Ok(layer(&state, &map, items))
}

async fn map_caves(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<Cave>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_caves(map.id).await?;
    Ok(layer(&state, &map, items))
}

async fn map_resources(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<Resource>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_resources(map.id).await?;
    Ok(layer(&state, &map, items))
}

async fn map_obelisks(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<Obelisk>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_obelisks(map.id).await?;
    Ok(layer(&state, &map, items))
}

async fn map_supply_drops(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<SupplyDrop>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_supply_drops(map.id).await?;
    Ok(layer(&state, &map, items))
}

async fn map_base_spots(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<MapLayer<BaseSpot>>> {
    let map = find_map(&state, &slug).await?;
    let items = state.catalog.map_base_spots(map.id).await?;
    Ok(layer(&state, &map, items))
}
