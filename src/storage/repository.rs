//! Repository traits - abstraction layer for data access
//!
//! API handlers read through `CatalogReader`; the population pipeline writes
//! through `CatalogWriter`. Both the PostgreSQL store and the in-memory mock
//! store implement the pair, so either can back the router.

use async_trait::async_trait;

use crate::models::*;
use crate::pagination::{PageRequest, Paged};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CreatureFilter {
    pub tameable: Option<bool>,
    pub rideable: Option<bool>,
    pub breedable: Option<bool>,
    pub temperament: Option<String>,
    pub diet: Option<String>,
}

/// Map category selected by `?type=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Studio-built base maps (The Island)
    Official,
    /// Story expansions (Scorched Earth, Aberration, ...)
    Expansion,
    /// Community-built maps released as free DLC
    Community,
}

impl MapKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "official" => Some(Self::Official),
            "expansion" | "dlc" => Some(Self::Expansion),
            "community" | "unofficial" => Some(Self::Community),
            _ => None,
        }
    }

    pub fn matches(&self, map: &Map) -> bool {
        match self {
            Self::Official => map.is_official && !map.is_expansion,
            Self::Expansion => map.is_expansion,
            Self::Community => !map.is_official,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapFilter {
    pub kind: Option<MapKind>,
    pub official: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    /// Map slug
    pub map: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TamingFilter {
    pub method: Option<String>,
}

// ============================================================================
// Read side
// ============================================================================

#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// True when serving the built-in mock dataset instead of a database
    fn is_mock(&self) -> bool;

    async fn list_creatures(&self, filter: &CreatureFilter, page: PageRequest) -> StoreResult<Paged<Creature>>;
    async fn search_creatures(&self, query: &str, limit: u32) -> StoreResult<Vec<Creature>>;
    async fn get_creature(&self, slug: &str) -> StoreResult<Option<CreatureDetail>>;

    async fn list_maps(&self, filter: &MapFilter, page: PageRequest) -> StoreResult<Paged<Map>>;
    async fn search_maps(&self, query: &str, limit: u32) -> StoreResult<Vec<Map>>;
    async fn get_map(&self, slug: &str) -> StoreResult<Option<Map>>;

    async fn map_regions(&self, map_id: i64) -> StoreResult<Vec<MapRegion>>;
    async fn map_caves(&self, map_id: i64) -> StoreResult<Vec<Cave>>;
    async fn map_resources(&self, map_id: i64) -> StoreResult<Vec<Resource>>;
    async fn map_obelisks(&self, map_id: i64) -> StoreResult<Vec<Obelisk>>;
    async fn map_supply_drops(&self, map_id: i64) -> StoreResult<Vec<SupplyDrop>>;
    async fn map_base_spots(&self, map_id: i64) -> StoreResult<Vec<BaseSpot>>;

    async fn list_regions(&self, filter: &RegionFilter, page: PageRequest) -> StoreResult<Paged<MapRegion>>;
    async fn search_regions(&self, query: &str, limit: u32) -> StoreResult<Vec<MapRegion>>;
    async fn get_region(&self, id: i64) -> StoreResult<Option<MapRegion>>;

    async fn list_taming(&self, filter: &TamingFilter, page: PageRequest) -> StoreResult<Paged<TamingEntry>>;
    /// Look up by creature slug, falling back to a case-insensitive name match
    async fn get_taming(&self, creature: &str) -> StoreResult<Option<(Creature, TamingData)>>;

    async fn table_counts(&self) -> StoreResult<TableCounts>;
    /// Layer sizes for every map, in one pass
    async fn layer_counts(&self) -> StoreResult<Vec<MapLayerCounts>>;
    async fn integrity_report(&self) -> StoreResult<IntegrityReport>;
    async fn system_status(&self) -> StoreResult<Vec<SystemStatus>>;
    async fn recent_sync_logs(&self, limit: u32) -> StoreResult<Vec<DataSyncLog>>;
}

// ============================================================================
// Write side (population pipeline + admin)
// ============================================================================

/// Every upsert is idempotent: re-running with the same record converges on
/// one row per unique key and only advances `updated_at`.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn upsert_map(&self, map: &MapRecord) -> StoreResult<i64>;
    async fn upsert_creature(&self, creature: &CreatureRecord) -> StoreResult<i64>;
    async fn upsert_creature_stat(&self, creature_id: i64, stat: &StatRecord) -> StoreResult<()>;
    async fn upsert_taming(&self, creature_id: i64, taming: &TamingRecord) -> StoreResult<()>;
    async fn upsert_region(&self, map_id: i64, region: &RegionRecord) -> StoreResult<()>;
    async fn upsert_cave(&self, map_id: i64, cave: &CaveRecord) -> StoreResult<()>;
    async fn upsert_resource(&self, map_id: i64, resource: &ResourceRecord) -> StoreResult<()>;
    async fn upsert_obelisk(&self, map_id: i64, obelisk: &ObeliskRecord) -> StoreResult<()>;
    async fn upsert_supply_drop(&self, map_id: i64, drop: &SupplyDropRecord) -> StoreResult<()>;
    async fn upsert_base_spot(&self, map_id: i64, spot: &BaseSpotRecord) -> StoreResult<()>;

    async fn map_refs(&self) -> StoreResult<Vec<MapRef>>;

    async fn set_status(&self, key: &str, status: &str, message: Option<&str>) -> StoreResult<()>;
    async fn log_sync(&self, entry: &SyncLogRecord) -> StoreResult<()>;
    async fn log_wiki_update(&self, page_title: &str, status: &str, records: i32, message: Option<&str>) -> StoreResult<()>;

    /// Drop every table and recreate the empty schema
    async fn reset_schema(&self) -> StoreResult<()>;

    async fn refresh_search_indexes(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Full read/write catalog, the type held by the API state
pub trait Catalog: CatalogReader + CatalogWriter {}

impl<T: CatalogReader + CatalogWriter> Catalog for T {}
