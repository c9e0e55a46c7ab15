//! Interactive map endpoints
//!
//! - GET /api/interactive-maps
//! - GET /api/interactive-maps/{slug}?layers=regions,caves,...

use std::collections::HashMap;

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use super::extract::{ApiPath, ApiQuery};
use super::maps::find_map;
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::{BaseSpot, Cave, Map, MapLayerCounts, MapRegion, Obelisk, Resource, SupplyDrop};
use crate::pagination::{PageRequest, MAX_LIMIT};
use crate::storage::repository::MapFilter;
use crate::storage::CatalogReader;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/interactive-maps", get(list_interactive_maps))
        .route("/api/interactive-maps/{slug}", get(get_interactive_map))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Regions,
    Caves,
    Resources,
    Obelisks,
    SupplyDrops,
    BaseSpots,
}

impl Layer {
    pub const ALL: [Layer; 6] = [
        Layer::Regions,
        Layer::Caves,
        Layer::Resources,
        Layer::Obelisks,
        Layer::SupplyDrops,
        Layer::BaseSpots,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "regions" => Some(Self::Regions),
            "caves" => Some(Self::Caves),
            "resources" => Some(Self::Resources),
            "obelisks" => Some(Self::Obelisks),
            "supply-drops" | "supplydrops" => Some(Self::SupplyDrops),
            "base-spots" | "basespots" => Some(Self::BaseSpots),
            _ => None,
        }
    }

    /// Parse a comma-separated list; empty means every layer
    pub fn parse_list(raw: Option<&str>) -> ApiResult<Vec<Self>> {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(Self::ALL.to_vec());
        };
        let mut layers = Vec::new();
        for name in raw.split(',').filter(|n| !n.trim().is_empty()) {
            let layer = Self::parse(name)
                .ok_or_else(|| ApiError::Validation(format!("Unknown map layer: {}", name.trim())))?;
            if !layers.contains(&layer) {
                layers.push(layer);
            }
        }
        Ok(layers)
    }
}

#[derive(Debug, Serialize)]
pub struct InteractiveMapSummary {
    #[serde(flatten)]
    pub map: Map,
    pub layers: MapLayerCounts,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<MapRegion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caves: Option<Vec<Cave>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obelisks: Option<Vec<Obelisk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_drops: Option<Vec<SupplyDrop>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_spots: Option<Vec<BaseSpot>>,
}

#[derive(Debug, Serialize)]
pub struct InteractiveMap {
    pub map: Map,
    pub layers: MapLayers,
}

#[derive(Debug, Deserialize)]
pub struct LayersQuery {
    pub layers: Option<String>,
}

async fn load_layers(state: &ApiState, map_id: i64, wanted: &[Layer]) -> ApiResult<MapLayers> {
    let mut layers = MapLayers::default();
    for layer in wanted {
        match layer {
            Layer::Regions => layers.regions = Some(state.catalog.map_regions(map_id).await?),
            Layer::Caves => layers.caves = Some(state.catalog.map_caves(map_id).await?),
            Layer::Resources => layers.resources = Some(state.catalog.map_resources(map_id).await?),
            Layer::Obelisks => layers.obelisks = Some(state.catalog.map_obelisks(map_id).await?),
            Layer::SupplyDrops => layers.supply_drops = Some(state.catalog.map_supply_drops(map_id).await?),
            Layer::BaseSpots => layers.base_spots = Some(state.catalog.map_base_spots(map_id).await?),
        }
    }
    Ok(layers)
}

async fn list_interactive_maps(State(state): State<ApiState>) -> ApiResult<ApiResponse<Vec<InteractiveMapSummary>>> {
    let maps = state
        .catalog
        .list_maps(&MapFilter::default(), PageRequest::new(Some(1), Some(MAX_LIMIT)))
        .await?
        .items;

    let counts: HashMap<i64, MapLayerCounts> = state
        .catalog
        .layer_counts()
        .await?
        .into_iter()
        .map(|c| (c.map_id, c))
        .collect();

    let summaries: Vec<InteractiveMapSummary> = maps
        .into_iter()
        .map(|map| InteractiveMapSummary {
            layers: counts.get(&map.id).copied().unwrap_or_default(),
            map,
        })
        .collect();

    Ok(ApiResponse::list(summaries).noted(&state))
}

async fn get_interactive_map(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(query): ApiQuery<LayersQuery>,
) -> ApiResult<ApiResponse<InteractiveMap>> {
    let wanted = Layer::parse_list(query.layers.as_deref())?;
    let map = find_map(&state, &slug).await?;
    let layers = load_layers(&state, map.id, &wanted).await?;
    Ok(ApiResponse::ok(InteractiveMap { map, layers }).noted(&state))
}
