//! Population pipeline against canned pages and the in-memory store

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use http::Request;
use serde_json::Value;
use tower::ServiceExt;

use ark_db_server::api::{self, ApiState};
use ark_db_server::population::{DataPopulationService, PopulationConfig, POPULATION_STATUS_KEY};
use ark_db_server::scraper::{PageSource, ScrapeError, TamingSiteScraper, WikiScraper};
use ark_db_server::models::*;
use ark_db_server::pagination::{PageRequest, Paged};
use ark_db_server::storage::repository::{CreatureFilter, MapFilter, RegionFilter, TamingFilter};
use ark_db_server::storage::{Catalog, CatalogReader, CatalogWriter, MemoryStore, StoreError, StoreResult};
use ark_db_server::JobQueue;

const WIKI: &str = "https://wiki.test/wiki/";
const TAMING: &str = "https://taming.test/";

/// Serves fixed pages; anything else is a 404
#[derive(Default)]
struct CannedPages {
    pages: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl CannedPages {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl PageSource for CannedPages {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

const INDEX: &str = r#"<div class="mw-parser-output"><table class="wikitable">
    <tr><th>Name</th><th>Diet</th></tr>
    <tr><td><a href="/wiki/Rex">Rex</a></td><td>Carnivore</td></tr>
    <tr><td><a href="/wiki/Dodo">Dodo</a></td><td>Herbivore</td></tr>
    <tr><td><a href="/wiki/Ghost_Rex">Ghost Rex</a></td><td>Carnivore</td></tr>
</table></div>"#;

fn creature_page(tameable: &str, diet: &str, health: f64) -> String {
    format!(
        r#"<div class="mw-parser-output">
        <table class="infobox">
            <tr><th>Diet</th><td>{diet}</td></tr>
            <tr><th>Temperament</th><td>Aggressive</td></tr>
            <tr><th>Tameable</th><td>{tameable}</td></tr>
        </table>
        <h2>Base Stats</h2>
        <table class="wikitable">
            <tr><th>Attribute</th><th>Base Value</th><th>Wild Level-Up</th><th>Tamed Level-Up</th></tr>
            <tr><td>Health</td><td>{health}</td><td>+220</td><td>5.4%</td></tr>
            <tr><td>Stamina</td><td>420</td><td>+42</td><td>10%</td></tr>
        </table></div>"#
    )
}

const REX_TAMING: &str = r#"<body><p>Knock out the Rex.</p>
    <ul><li>27 x Kibble (Exceptional Kibble) 2h 28m</li><li>Raw Prime Meat</li><li>Raw Mutton</li></ul>
    <p>Torpor: 1,550</p></body>"#;

const ISLAND_PAGE: &str = r#"<div class="mw-parser-output">
    <h2>Regions</h2>
    <table class="wikitable">
        <tr><th>Name</th><th>Description</th></tr>
        <tr><td>Redwood Forest</td><td>Tall trees</td></tr>
        <tr><td>Southern Islets</td><td>Starter beaches</td></tr>
    </table>
    <h2>Caves</h2>
    <table class="wikitable">
        <tr><th>Name</th><th>Location</th><th>Notes</th></tr>
        <tr><td>Central Cave</td><td>41.5, 46.9</td><td>Medium, Artifact of the Hunter</td></tr>
    </table>
</div>"#;

fn fixture_pages() -> CannedPages {
    CannedPages::default()
        .with(&format!("{}Creatures", WIKI), INDEX)
        .with(&format!("{}Rex", WIKI), &creature_page("Yes", "Carnivore", 1100.0))
        .with(&format!("{}Dodo", WIKI), &creature_page("Yes", "Herbivore", 40.0))
        .with(&format!("{}rex", TAMING), REX_TAMING)
        .with(&format!("{}The_Island", WIKI), ISLAND_PAGE)
}

fn fast_config() -> PopulationConfig {
    PopulationConfig {
        creature_limit: 150,
        creature_delay: Duration::ZERO,
        map_delay: Duration::ZERO,
    }
}

fn service_over(store: Arc<MemoryStore>, pages: Arc<CannedPages>) -> DataPopulationService {
    let wiki = WikiScraper::new(pages.clone(), WIKI);
    let taming = TamingSiteScraper::new(pages, TAMING);
    let catalog: Arc<dyn Catalog> = store;
    DataPopulationService::new(catalog, wiki, taming, fast_config())
}

#[tokio::test]
async fn test_populate_maps_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(CannedPages::default()));

    let first = service.populate_maps().await.unwrap();
    assert_eq!(first.processed, 12);
    let before = store.get_map("the-island").await.unwrap().unwrap();

    let second = service.populate_maps().await.unwrap();
    assert_eq!(second.processed, 12);
    assert_eq!(second.failed, 0);

    let counts = store.table_counts().await.unwrap();
    assert_eq!(counts.maps, 12);

    let after = store.get_map("the-island").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_populate_creatures_counts_failures() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(fixture_pages()));

    let outcome = service.populate_creatures().await.unwrap();
    // Ghost Rex has no page
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.failed, 1);

    let rex = store.get_creature("rex").await.unwrap().unwrap();
    assert_eq!(rex.creature.base_health, Some(1100.0));
    assert_eq!(rex.stats.len(), 2);
    let taming = rex.taming.expect("rex taming");
    assert_eq!(taming.base_food_quantity, 27);
    assert_eq!(taming.base_taming_time, 148.0);

    // No taming page for the dodo: the creature stays, without taming
    let dodo = store.get_creature("dodo").await.unwrap().unwrap();
    assert!(dodo.creature.is_tameable);
    assert!(dodo.taming.is_none());
}

#[tokio::test]
async fn test_missing_creature_index_aborts_step() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store, Arc::new(CannedPages::default()));
    assert!(service.populate_creatures().await.is_err());
}

#[tokio::test]
async fn test_populate_regions_and_caves_per_map() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(fixture_pages()));
    service.populate_maps().await.unwrap();

    let regions = service.populate_regions().await.unwrap();
    assert_eq!(regions.processed, 2);
    // Every other map page is missing
    assert_eq!(regions.failed, 11);

    let island = store.get_map("the-island").await.unwrap().unwrap();
    let rows = store.map_regions(island.id).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"Redwood Forest"));
    assert!(names.contains(&"Southern Islets"));

    let caves = service.populate_caves().await.unwrap();
    assert_eq!(caves.processed, 1);
    let cave = &store.map_caves(island.id).await.unwrap()[0];
    assert_eq!(cave.name, "Central Cave");
    assert_eq!(cave.artifact.as_deref(), Some("Artifact of the Hunter"));
    assert_eq!(cave.latitude, Some(41.5));

    // Re-running does not duplicate
    service.populate_regions().await.unwrap();
    assert_eq!(store.map_regions(island.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_populate_all_records_sync_and_status() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(fixture_pages()));

    let report = service.populate_all().await.unwrap();
    assert_eq!(report.sync_type, "full_population");
    assert_eq!(report.steps.len(), 8);
    assert_eq!(report.step("maps").map(|s| s.processed), Some(12));
    assert_eq!(report.step("supply_drops").map(|s| s.processed), Some(12 * 6));

    let counts = store.table_counts().await.unwrap();
    assert_eq!(counts.maps, 12);
    assert_eq!(counts.creatures, 2);
    assert!(counts.obelisks > 0);
    assert!(counts.base_spots > 0);

    let logs = store.recent_sync_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].sync_type, "full_population");
    assert_eq!(logs[0].status, "completed");
    assert_eq!(logs[0].records_processed as u32, report.processed());

    let status = store.system_status().await.unwrap();
    let row = status.iter().find(|s| s.key == POPULATION_STATUS_KEY).unwrap();
    assert_eq!(row.status, "completed");
}

#[tokio::test]
async fn test_failed_run_records_error_status() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(CannedPages::default()));

    assert!(service.populate_all().await.is_err());

    let logs = store.recent_sync_logs(5).await.unwrap();
    assert_eq!(logs[0].status, "error");
    let status = store.system_status().await.unwrap();
    assert_eq!(status.iter().find(|s| s.key == POPULATION_STATUS_KEY).unwrap().status, "error");
}

#[tokio::test]
async fn test_sync_data_skips_static_steps() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(store.clone(), Arc::new(fixture_pages()));
    service.populate_maps().await.unwrap();

    let report = service.sync_data().await.unwrap();
    assert_eq!(report.sync_type, "sync");
    let steps: Vec<&str> = report.steps.iter().map(|s| s.step.as_str()).collect();
    assert_eq!(steps, vec!["creatures", "regions"]);
    assert_eq!(store.table_counts().await.unwrap().resources, 0);
}

#[tokio::test]
async fn test_reset_database_repopulates() {
    let store = Arc::new(MemoryStore::new());
    store.upsert_map(&ark_db_server::reference::official_maps()[0]).await.unwrap();
    let service = service_over(store.clone(), Arc::new(fixture_pages()));

    service.reset_database().await.unwrap();
    assert_eq!(store.table_counts().await.unwrap().maps, 12);
}

/// Memory store whose schema cannot be dropped
struct LockedSchema(MemoryStore);

#[async_trait]
impl CatalogReader for LockedSchema {
    fn is_mock(&self) -> bool {
        self.0.is_mock()
    }
    async fn list_creatures(&self, filter: &CreatureFilter, page: PageRequest) -> StoreResult<Paged<Creature>> {
        self.0.list_creatures(filter, page).await
    }
    async fn search_creatures(&self, query: &str, limit: u32) -> StoreResult<Vec<Creature>> {
        self.0.search_creatures(query, limit).await
    }
    async fn get_creature(&self, slug: &str) -> StoreResult<Option<CreatureDetail>> {
        self.0.get_creature(slug).await
    }
    async fn list_maps(&self, filter: &MapFilter, page: PageRequest) -> StoreResult<Paged<Map>> {
        self.0.list_maps(filter, page).await
    }
    async fn search_maps(&self, query: &str, limit: u32) -> StoreResult<Vec<Map>> {
        self.0.search_maps(query, limit).await
    }
    async fn get_map(&self, slug: &str) -> StoreResult<Option<Map>> {
        self.0.get_map(slug).await
    }
    async fn map_regions(&self, map_id: i64) -> StoreResult<Vec<MapRegion>> {
        self.0.map_regions(map_id).await
    }
    async fn map_caves(&self, map_id: i64) -> StoreResult<Vec<Cave>> {
        self.0.map_caves(map_id).await
    }
    async fn map_resources(&self, map_id: i64) -> StoreResult<Vec<Resource>> {
        self.0.map_resources(map_id).await
    }
    async fn map_obelisks(&self, map_id: i64) -> StoreResult<Vec<Obelisk>> {
        self.0.map_obelisks(map_id).await
    }
    async fn map_supply_drops(&self, map_id: i64) -> StoreResult<Vec<SupplyDrop>> {
        self.0.map_supply_drops(map_id).await
    }
    async fn map_base_spots(&self, map_id: i64) -> StoreResult<Vec<BaseSpot>> {
        self.0.map_base_spots(map_id).await
    }
    async fn list_regions(&self, filter: &RegionFilter, page: PageRequest) -> StoreResult<Paged<MapRegion>> {
        self.0.list_regions(filter, page).await
    }
    async fn search_regions(&self, query: &str, limit: u32) -> StoreResult<Vec<MapRegion>> {
        self.0.search_regions(query, limit).await
    }
    async fn get_region(&self, id: i64) -> StoreResult<Option<MapRegion>> {
        self.0.get_region(id).await
    }
    async fn list_taming(&self, filter: &TamingFilter, page: PageRequest) -> StoreResult<Paged<TamingEntry>> {
        self.0.list_taming(filter, page).await
    }
    async fn get_taming(&self, creature: &str) -> StoreResult<Option<(Creature, TamingData)>> {
        self.0.get_taming(creature).await
    }
    async fn table_counts(&self) -> StoreResult<TableCounts> {
        self.0.table_counts().await
    }
    async fn layer_counts(&self) -> StoreResult<Vec<MapLayerCounts>> {
        self.0.layer_counts().await
    }
    async fn integrity_report(&self) -> StoreResult<IntegrityReport> {
        self.0.integrity_report().await
    }
    async fn system_status(&self) -> StoreResult<Vec<SystemStatus>> {
        self.0.system_status().await
    }
    async fn recent_sync_logs(&self, limit: u32) -> StoreResult<Vec<DataSyncLog>> {
        self.0.recent_sync_logs(limit).await
    }
}

#[async_trait]
impl CatalogWriter for LockedSchema {
    async fn upsert_map(&self, map: &MapRecord) -> StoreResult<i64> {
        self.0.upsert_map(map).await
    }
    async fn upsert_creature(&self, creature: &CreatureRecord) -> StoreResult<i64> {
        self.0.upsert_creature(creature).await
    }
    async fn upsert_creature_stat(&self, creature_id: i64, stat: &StatRecord) -> StoreResult<()> {
        self.0.upsert_creature_stat(creature_id, stat).await
    }
    async fn upsert_taming(&self, creature_id: i64, taming: &TamingRecord) -> StoreResult<()> {
        self.0.upsert_taming(creature_id, taming).await
    }
    async fn upsert_region(&self, map_id: i64, region: &RegionRecord) -> StoreResult<()> {
        self.0.upsert_region(map_id, region).await
    }
    async fn upsert_cave(&self, map_id: i64, cave: &CaveRecord) -> StoreResult<()> {
        self.0.upsert_cave(map_id, cave).await
    }
    async fn upsert_resource(&self, map_id: i64, resource: &ResourceRecord) -> StoreResult<()> {
        self.0.upsert_resource(map_id, resource).await
    }
    async fn upsert_obelisk(&self, map_id: i64, obelisk: &ObeliskRecord) -> StoreResult<()> {
        self.0.upsert_obelisk(map_id, obelisk).await
    }
    async fn upsert_supply_drop(&self, map_id: i64, drop: &SupplyDropRecord) -> StoreResult<()> {
        self.0.upsert_supply_drop(map_id, drop).await
    }
    async fn upsert_base_spot(&self, map_id: i64, spot: &BaseSpotRecord) -> StoreResult<()> {
        self.0.upsert_base_spot(map_id, spot).await
    }
    async fn map_refs(&self) -> StoreResult<Vec<MapRef>> {
        self.0.map_refs().await
    }
    async fn set_status(&self, key: &str, status: &str, message: Option<&str>) -> StoreResult<()> {
        self.0.set_status(key, status, message).await
    }
    async fn log_sync(&self, entry: &SyncLogRecord) -> StoreResult<()> {
        self.0.log_sync(entry).await
    }
    async fn log_wiki_update(&self, page_title: &str, status: &str, records: i32, message: Option<&str>) -> StoreResult<()> {
        self.0.log_wiki_update(page_title, status, records, message).await
    }
    async fn reset_schema(&self) -> StoreResult<()> {
        Err(StoreError::Unavailable("permission denied to drop schema".into()))
    }
}

#[tokio::test]
async fn test_failed_reset_records_error_status() {
    let locked = Arc::new(LockedSchema(MemoryStore::new()));
    locked.set_status(POPULATION_STATUS_KEY, "completed", None).await.unwrap();

    let pages = Arc::new(fixture_pages());
    let catalog: Arc<dyn Catalog> = locked.clone();
    let service = DataPopulationService::new(
        catalog,
        WikiScraper::new(pages.clone(), WIKI),
        TamingSiteScraper::new(pages, TAMING),
        fast_config(),
    );

    let err = service.reset_database().await.unwrap_err();
    assert!(err.to_string().contains("permission denied"));

    let status = locked.system_status().await.unwrap();
    let row = status.iter().find(|s| s.key == POPULATION_STATUS_KEY).unwrap();
    assert_eq!(row.status, "error");

    let logs = locked.recent_sync_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].sync_type, "reset");
    assert_eq!(logs[0].status, "error");
    assert_eq!(locked.table_counts().await.unwrap().maps, 0, "no population after a failed reset");
}

// ============================================================================
// Admin flow through the job queue
// ============================================================================

async fn json_of(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_admin_populate_runs_in_background() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(service_over(store.clone(), Arc::new(fixture_pages())));
    let queue = JobQueue::start(service.job_runner(), 4);
    let catalog: Arc<dyn Catalog> = store.clone();
    let router = api::build_router(ApiState::new(catalog, Some(queue)));

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/populate-data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let json = json_of(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["deduplicated"], false);
    let id = json["data"]["job"]["id"].as_str().unwrap().to_string();

    let mut status = String::new();
    for _ in 0..200 {
        let resp = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/admin/jobs/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        status = json_of(resp).await["data"]["status"].as_str().unwrap().to_string();
        if status == "completed" || status == "failed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, "completed");
    assert_eq!(store.table_counts().await.unwrap().maps, 12);

    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/api/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = json_of(resp).await;
    assert_eq!(json["data"]["mode"], "database");
    assert!(json.get("message").is_none());
}
