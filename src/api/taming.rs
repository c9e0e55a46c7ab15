//! Taming endpoints
//!
//! - GET  /api/taming
//! - GET  /api/taming/{slug}
//! - POST /api/taming/calculate

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::creatures::non_empty;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::{Creature, TamingData, TamingEntry};
use crate::pagination::PageRequest;
use crate::storage::repository::TamingFilter;
use crate::storage::CatalogReader;
use crate::taming::{self as calculator, TamingRequirements};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/api/taming", get(list_taming))
        .route("/api/taming/calculate", post(calculate))
        .route("/api/taming/{slug}", get(get_taming))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TamingListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    /// Creature slug or name
    pub creature: String,
    pub level: u32,
    pub food: Option<String>,
    pub taming_speed: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreatureTaming {
    pub creature: Creature,
    pub taming: TamingData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub creature: CreatureRef,
    pub level: u32,
    pub taming_speed: f64,
    pub method: String,
    pub kibble_type: Option<String>,
    pub preferred_foods: Vec<String>,
    pub requirements: TamingRequirements,
}

#[derive(Debug, Serialize)]
pub struct CreatureRef {
    pub name: String,
    pub slug: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_taming(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<TamingListQuery>,
) -> ApiResult<ApiResponse<Vec<TamingEntry>>> {
    let filter = TamingFilter {
        method: non_empty(&query.method),
    };
    let page = PageRequest::new(query.page, query.limit);
    let result = state.catalog.list_taming(&filter, page).await?;
    Ok(ApiResponse::paged(result, page).noted(&state))
}

async fn find_taming(state: &ApiState, creature: &str) -> ApiResult<(Creature, TamingData)> {
    state
        .catalog
        .get_taming(creature)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Taming data not found for creature: {}", creature)))
}

async fn get_taming(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse<CreatureTaming>> {
    let (creature, taming) = find_taming(&state, &slug).await?;
    Ok(ApiResponse::ok(CreatureTaming { creature, taming }).noted(&state))
}

async fn calculate(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<CalculateRequest>,
) -> ApiResult<ApiResponse<CalculateResponse>> {
    let creature = req.creature.trim();
    if creature.is_empty() {
        return Err(ApiError::Validation("creature is required".to_string()));
    }

    let taming_speed = req.taming_speed.unwrap_or(1.0);
    let (creature, taming) = find_taming(&state, creature).await?;
    let requirements = calculator::calculate(&taming, req.level, req.food.as_deref(), taming_speed)?;

    Ok(ApiResponse::ok(CalculateResponse {
        creature: CreatureRef {
            name: creature.name,
            slug: creature.slug,
        },
        level: req.level,
        taming_speed,
        method: taming.method,
        kibble_type: taming.kibble_type,
        preferred_foods: taming.preferred_foods.0,
        requirements,
    })
    .noted(&state))
}
