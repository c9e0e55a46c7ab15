//! API Smoke Tests
//!
//! Drives the full router against the in-memory mock catalog, so no
//! PostgreSQL is needed.

use std::sync::Arc;
use std::time::Duration;

use ark_db_server::api::{self, ApiState, MOCK_MESSAGE};
use ark_db_server::rate_limit::RateLimiter;
use ark_db_server::storage::MemoryStore;
use axum::body::Body;
use http::Request;
use serde_json::{json, Value};
use tower::ServiceExt;

fn mock_state() -> ApiState {
    ApiState::new(Arc::new(MemoryStore::with_mock_data()), None)
}

fn create_test_router() -> axum::Router {
    api::build_router(mock_state())
}

async fn send(router: &axum::Router, req: Request<Body>) -> (u16, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(router: &axum::Router, uri: &str) -> (u16, Value) {
    let req = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
    send(router, req).await
}

async fn post_json(router: &axum::Router, uri: &str, body: Value) -> (u16, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, req).await
}

// ============================================================================
// Health & docs
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/health").await;
    assert_eq!(status, 200);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "mock");
    assert!(!json["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_docs_lists_endpoints() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/docs").await;
    assert_eq!(status, 200);
    let endpoints = json["data"]["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e["path"] == "/api/taming/calculate"));
}

#[tokio::test]
async fn test_metrics_endpoints() {
    let router = create_test_router();
    get(&router, "/api/health").await;

    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("ark_requests_total"));
    assert!(text.contains("ark_mock_mode 1"));

    let (status, json) = get(&router, "/metrics/json").await;
    assert_eq!(status, 200);
    assert!(json["total_requests"].as_u64().unwrap() >= 2);
}

// ============================================================================
// Maps
// ============================================================================

#[tokio::test]
async fn test_every_map_slug_round_trips() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/maps?limit=100").await;
    assert_eq!(status, 200);
    let maps = json["data"].as_array().unwrap();
    assert_eq!(maps.len(), 12);

    for map in maps {
        let slug = map["slug"].as_str().unwrap();
        let (status, json) = get(&router, &format!("/api/maps/{}", slug)).await;
        assert_eq!(status, 200, "map {}", slug);
        assert_eq!(json["data"]["slug"], slug);
    }
}

#[tokio::test]
async fn test_unknown_map_is_404() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/maps/atlantis").await;
    assert_eq!(status, 404);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("atlantis"));

    let (status, _) = get(&router, "/api/maps/atlantis/caves").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_map_type_filter() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/maps?type=official").await;
    assert_eq!(status, 200);
    for map in json["data"].as_array().unwrap() {
        assert_eq!(map["is_official"], true);
        assert_eq!(map["is_expansion"], false);
    }

    let (status, _) = get(&router, "/api/maps?type=modded").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_map_sub_resources() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/maps/the-island/regions").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["map"]["slug"], "the-island");
    assert!(json["count"].as_u64().unwrap() >= 6);

    let (status, json) = get(&router, "/api/maps/the-island/supply-drops").await;
    assert_eq!(status, 200);
    assert_eq!(json["count"], 6);

    for layer in ["caves", "resources", "obelisks", "base-spots"] {
        let (status, _) = get(&router, &format!("/api/maps/the-island/{}", layer)).await;
        assert_eq!(status, 200, "layer {}", layer);
    }
}

// ============================================================================
// Creatures & pagination
// ============================================================================

#[tokio::test]
async fn test_mock_responses_carry_message() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/creatures").await;
    assert_eq!(status, 200);
    assert_eq!(json["message"], MOCK_MESSAGE);
    assert!(json["message"].as_str().unwrap().starts_with("Using mock data"));
}

#[tokio::test]
async fn test_creature_pagination() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/creatures?limit=5&page=1").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(
        json["pagination"],
        json!({ "page": 1, "limit": 5, "total": 11, "pages": 3, "hasNext": true, "hasPrev": false })
    );

    let (_, last) = get(&router, "/api/creatures?limit=5&page=3").await;
    assert_eq!(last["data"].as_array().unwrap().len(), 1);
    assert_eq!(last["pagination"]["hasNext"], false);
    assert_eq!(last["pagination"]["hasPrev"], true);

    // Out-of-range limits are clamped
    let (_, clamped) = get(&router, "/api/creatures?limit=1000").await;
    assert_eq!(clamped["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_creature_filters() {
    let router = create_test_router();
    let (_, json) = get(&router, "/api/creatures?tameable=false").await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["slug"], "titanoboa");

    let (_, json) = get(&router, "/api/creatures?diet=herb").await;
    for row in json["data"].as_array().unwrap() {
        assert_eq!(row["diet"], "Herbivore");
    }

    let (status, _) = get(&router, "/api/creatures?tameable=sometimes").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_creature_detail_includes_stats_and_taming() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/creatures/rex").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["name"], "Rex");
    assert!(!json["data"]["stats"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["taming"]["base_food_quantity"], 27);

    let (status, _) = get(&router, "/api/creatures/nessie").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_creature_search_requires_two_chars() {
    let router = create_test_router();
    let (status, _) = get(&router, "/api/creatures/search?q=r").await;
    assert_eq!(status, 400);

    let (status, json) = get(&router, "/api/creatures/search?q=rex").await;
    assert_eq!(status, 200);
    assert!(json["data"].as_array().unwrap().iter().any(|c| c["slug"] == "rex"));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_query_length() {
    let router = create_test_router();

    let (status, json) = get(&router, "/api/search?q=").await;
    assert_eq!(status, 400);
    assert_eq!(json["success"], false);

    let (status, _) = get(&router, "/api/search").await;
    assert_eq!(status, 400);

    let (status, _) = get(&router, "/api/search?q=a").await;
    assert_eq!(status, 400);

    let (status, json) = get(&router, "/api/search?q=re").await;
    assert_eq!(status, 200);
    assert!(json["data"]["results"].is_array());

    let (status, json) = get(&router, "/api/search?q=zzzz").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["results"], json!([]));
}

#[tokio::test]
async fn test_search_scoped_by_type() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/search?q=island&type=maps").await;
    assert_eq!(status, 200);
    let results = json["data"]["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r["type"] == "map"));

    let (status, _) = get(&router, "/api/search?q=island&type=items").await;
    assert_eq!(status, 400);
}

// ============================================================================
// Regions
// ============================================================================

#[tokio::test]
async fn test_region_filters_and_lookup() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/regions?map=the-island&biome=forest").await;
    assert_eq!(status, 200);
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Redwood Forest");

    let id = rows[0]["id"].as_i64().unwrap();
    let (status, json) = get(&router, &format!("/api/regions/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["name"], "Redwood Forest");

    let (status, _) = get(&router, "/api/regions/999999").await;
    assert_eq!(status, 404);

    let (status, _) = get(&router, "/api/regions/not-a-number").await;
    assert_eq!(status, 400);

    let (_, json) = get(&router, "/api/regions?map=atlantis").await;
    assert_eq!(json["data"], json!([]));
}

// ============================================================================
// Taming
// ============================================================================

#[tokio::test]
async fn test_taming_calculate_level_30_multiplier_is_one() {
    let router = create_test_router();
    let (status, json) = post_json(
        &router,
        "/api/taming/calculate",
        json!({ "creature": "rex", "level": 30, "food": "Prime Meat" }),
    )
    .await;
    assert_eq!(status, 200);

    let req = &json["data"]["requirements"];
    assert_eq!(req["multiplier"], 1.0);
    assert_eq!(req["quantity"], req["baseQuantity"]);
    assert_eq!(req["baseQuantity"], 54);
    assert_eq!(json["data"]["creature"]["slug"], "rex");
}

#[tokio::test]
async fn test_taming_calculate_by_name_and_speed() {
    let router = create_test_router();
    let (status, json) = post_json(
        &router,
        "/api/taming/calculate",
        json!({ "creature": "Raptor", "level": 150, "tamingSpeed": 2.0 }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["tamingSpeed"], 2.0);
    assert!(json["data"]["requirements"]["quantity"].as_u64().unwrap() > 9);
}

#[tokio::test]
async fn test_taming_calculate_validation() {
    let router = create_test_router();

    let (status, _) = post_json(&router, "/api/taming/calculate", json!({ "creature": "rex", "level": 0 })).await;
    assert_eq!(status, 400);

    let (status, _) = post_json(&router, "/api/taming/calculate", json!({ "creature": "rex" })).await;
    assert_eq!(status, 400);

    let (status, _) = post_json(&router, "/api/taming/calculate", json!({ "creature": "", "level": 10 })).await;
    assert_eq!(status, 400);

    let (status, _) = post_json(&router, "/api/taming/calculate", json!({ "creature": "titanoboa", "level": 10 })).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_taming_list_and_lookup() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/taming?method=passive").await;
    assert_eq!(status, 200);
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["creature_slug"], "basilosaurus");

    let (status, json) = get(&router, "/api/taming/dodo").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["creature"]["slug"], "dodo");
}

// ============================================================================
// Interactive maps
// ============================================================================

#[tokio::test]
async fn test_interactive_maps() {
    let router = create_test_router();
    let (status, json) = get(&router, "/api/interactive-maps").await;
    assert_eq!(status, 200);
    let island = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["slug"] == "the-island")
        .cloned()
        .unwrap();
    assert_eq!(island["layers"]["supplyDrops"], 6);
    assert!(island["layers"].get("mapId").is_none());

    let (_, regions) = get(&router, "/api/maps/the-island/regions").await;
    let listed = regions["data"].as_array().unwrap().len() as u64;
    assert_eq!(island["layers"]["regions"].as_u64(), Some(listed));

    let (status, json) = get(&router, "/api/interactive-maps/the-island?layers=caves").await;
    assert_eq!(status, 200);
    assert!(json["data"]["layers"]["caves"].is_array());
    assert!(json["data"]["layers"].get("regions").is_none());

    let (status, _) = get(&router, "/api/interactive-maps/the-island?layers=dungeons").await;
    assert_eq!(status, 400);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_jobs_unavailable_in_mock_mode() {
    let router = create_test_router();
    for path in ["/api/admin/populate-data", "/api/admin/sync-data", "/api/admin/reset-database"] {
        let (status, json) = post_json(&router, path, json!({})).await;
        assert_eq!(status, 503, "{}", path);
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn test_admin_validate_and_status_in_mock_mode() {
    let router = create_test_router();
    let (status, json) = post_json(&router, "/api/admin/validate-database", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["counts"]["maps"], 12);
    assert_eq!(json["data"]["tameable_without_taming"], 0);

    let (status, json) = get(&router, "/api/admin/status").await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["mode"], "mock");

    let (status, _) = get(&router, "/api/admin/jobs/not-a-uuid").await;
    assert_eq!(status, 400);
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let state = mock_state().with_rate_limiter(RateLimiter::new(Duration::from_secs(60), 2));
    let router = api::build_router(state);

    let req = || {
        Request::builder()
            .uri("/api/maps")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(router.clone().oneshot(req()).await.unwrap().status(), 200);
    assert_eq!(router.clone().oneshot(req()).await.unwrap().status(), 200);

    let limited = router.clone().oneshot(req()).await.unwrap();
    assert_eq!(limited.status(), 429);
    assert!(limited.headers().contains_key("retry-after"));

    // Non-API paths are not limited
    let metrics = Request::builder()
        .uri("/metrics/json")
        .header("x-forwarded-for", "198.51.100.4")
        .body(Body::empty())
        .unwrap();
    assert_eq!(router.clone().oneshot(metrics).await.unwrap().status(), 200);

    // A different client has its own window
    let other = Request::builder()
        .uri("/api/maps")
        .header("x-forwarded-for", "198.51.100.5")
        .body(Body::empty())
        .unwrap();
    assert_eq!(router.clone().oneshot(other).await.unwrap().status(), 200);
}
