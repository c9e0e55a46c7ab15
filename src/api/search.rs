//! Cross-resource search
//!
//! - GET /api/search?q=&type=all|creatures|maps|regions&limit=

use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

use super::extract::{search_term, ApiQuery};
use super::{ApiResponse, ApiState};
use crate::error::{ApiError, ApiResult};
use crate::models::{Creature, Map, MapRegion};
use crate::storage::CatalogReader;

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const MAX_SEARCH_LIMIT: u32 = 50;

pub fn routes() -> Router<ApiState> {
    Router::new().route("/api/search", get(search))
}

#[derive(Debug, Deserialize)]
pub struct GlobalSearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Creatures,
    Maps,
    Regions,
}

impl Scope {
    fn parse(raw: Option<&str>) -> ApiResult<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("all") => Ok(Self::All),
            Some("creatures" | "creature") => Ok(Self::Creatures),
            Some("maps" | "map") => Ok(Self::Maps),
            Some("regions" | "region") => Ok(Self::Regions),
            Some(other) => Err(ApiError::Validation(format!(
                "Invalid search type: {} (expected all, creatures, maps or regions)",
                other
            ))),
        }
    }

    fn includes(self, other: Scope) -> bool {
        self == Scope::All || self == other
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Creature(Creature),
    Map(Map),
    Region(MapRegion),
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total: usize,
}

async fn search(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<GlobalSearchQuery>,
) -> ApiResult<ApiResponse<SearchResults>> {
    let term = search_term(query.q.as_deref())?;
    let scope = Scope::parse(query.kind.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);

    let mut results = Vec::new();
    if scope.includes(Scope::Creatures) {
        results.extend(
            state
                .catalog
                .search_creatures(&term, limit)
                .await?
                .into_iter()
                .map(SearchHit::Creature),
        );
    }
    if scope.includes(Scope::Maps) {
        results.extend(state.catalog.search_maps(&term, limit).await?.into_iter().map(SearchHit::Map));
    }
    if scope.includes(Scope::Regions) {
        results.extend(
            state
                .catalog
                .search_regions(&term, limit)
                .await?
                .into_iter()
                .map(SearchHit::Region),
        );
    }

    let total = results.len();
    Ok(ApiResponse::ok(SearchResults {
        query: term,
        results,
        total,
    })
    .noted(&state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse(None).unwrap(), Scope::All);
        assert_eq!(Scope::parse(Some("Maps")).unwrap(), Scope::Maps);
        assert!(Scope::parse(Some("items")).is_err());
        assert!(Scope::All.includes(Scope::Regions));
        assert!(!Scope::Maps.includes(Scope::Regions));
    }
}
