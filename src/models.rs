//! Domain rows and write records
//!
//! Row types map 1:1 onto the PostgreSQL tables (sqlx `FromRow`) and are
//! serialized as-is in API responses. `*Record` types are the row-shaped
//! inputs produced by the reference data and the scrapers; the storage
//! layer upserts them keyed by their natural unique key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

pub type Timestamp = Option<DateTime<Utc>>;

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Map {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_official: bool,
    pub is_expansion: bool,
    pub release_date: Option<NaiveDate>,
    pub size_km2: Option<f64>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Creature {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub temperament: Option<String>,
    pub diet: Option<String>,
    pub is_tameable: bool,
    pub is_rideable: bool,
    pub is_breedable: bool,
    pub base_health: Option<f64>,
    pub base_stamina: Option<f64>,
    pub base_food: Option<f64>,
    pub base_weight: Option<f64>,
    pub base_damage: Option<f64>,
    pub base_speed: Option<f64>,
    pub wiki_url: Option<String>,
    pub dododex_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CreatureStat {
    pub id: i64,
    pub creature_id: i64,
    pub stat_name: String,
    pub base_value: f64,
    pub wild_per_level: Option<f64>,
    pub tamed_per_level: Option<f64>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TamingData {
    pub id: i64,
    pub creature_id: i64,
    pub method: String,
    pub preferred_foods: Json<Vec<String>>,
    pub kibble_type: Option<String>,
    /// Units of the first preferred food needed at level 30
    pub base_food_quantity: i32,
    /// Minutes at level 30 with the first preferred food
    pub base_taming_time: f64,
    pub torpor_depletion_rate: Option<f64>,
    pub base_torpor: Option<f64>,
    pub feeding_interval: Option<f64>,
    pub updated_at: Timestamp,
}

/// Taming row joined with its creature, as listed by `/api/taming`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TamingEntry {
    pub creature_name: String,
    pub creature_slug: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub taming: TamingData,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MapRegion {
    pub id: i64,
    pub map_id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub wiki_url: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Cave {
    pub id: i64,
    pub map_id: i64,
    pub name: String,
    pub difficulty: Option<String>,
    pub artifact: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Resource {
    pub id: i64,
    pub map_id: i64,
    pub name: String,
    pub resource_type: String,
    pub abundance: Option<String>,
    pub description: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Obelisk {
    pub id: i64,
    pub map_id: i64,
    pub color: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SupplyDrop {
    pub id: i64,
    pub map_id: i64,
    pub tier: String,
    pub min_level: i32,
    pub quality: Option<String>,
    pub description: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct BaseSpot {
    pub id: i64,
    pub map_id: i64,
    pub name: String,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SystemStatus {
    pub key: String,
    pub status: String,
    pub message: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DataSyncLog {
    pub id: i64,
    pub sync_type: String,
    pub status: String,
    pub message: Option<String>,
    pub records_processed: i32,
    pub records_failed: i32,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct WikiUpdateLog {
    pub id: i64,
    pub page_title: String,
    pub status: String,
    pub records: i32,
    pub message: Option<String>,
    pub updated_at: Timestamp,
}

/// Creature with its owned rows, as returned by `GET /api/creatures/{slug}`
#[derive(Debug, Clone, Serialize)]
pub struct CreatureDetail {
    #[serde(flatten)]
    pub creature: Creature,
    pub stats: Vec<CreatureStat>,
    pub taming: Option<TamingData>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct TableCounts {
    pub maps: i64,
    pub creatures: i64,
    pub creature_stats: i64,
    pub taming_data: i64,
    pub map_regions: i64,
    pub caves: i64,
    pub resources: i64,
    pub obelisks: i64,
    pub supply_drops: i64,
    pub base_spots: i64,
}

/// Rows per interactive-map layer for one map
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MapLayerCounts {
    #[serde(skip)]
    pub map_id: i64,
    pub regions: i64,
    pub caves: i64,
    pub resources: i64,
    pub obelisks: i64,
    pub supply_drops: i64,
    pub base_spots: i64,
}

/// Result of `POST /api/admin/validate-database`
#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub counts: TableCounts,
    pub creatures_without_stats: i64,
    pub tameable_without_taming: i64,
    pub maps_without_regions: i64,
    pub healthy: bool,
}

impl IntegrityReport {
    pub fn new(
        counts: TableCounts,
        creatures_without_stats: i64,
        tameable_without_taming: i64,
        maps_without_regions: i64,
    ) -> Self {
        let healthy = counts.maps > 0
            && counts.creatures > 0
            && creatures_without_stats == 0
            && tameable_without_taming == 0;
        Self {
            counts,
            creatures_without_stats,
            tameable_without_taming,
            maps_without_regions,
            healthy,
        }
    }
}

/// (id, slug, name) of a stored map, used to attach child rows
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct MapRef {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

// ============================================================================
// Write records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub name: String,
    pub slug: String,
    pub is_official: bool,
    pub is_expansion: bool,
    pub release_date: Option<NaiveDate>,
    pub size_km2: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatureRecord {
    pub name: String,
    pub slug: String,
    pub temperament: Option<String>,
    pub diet: Option<String>,
    pub is_tameable: bool,
    pub is_rideable: bool,
    pub is_breedable: bool,
    pub base_health: Option<f64>,
    pub base_stamina: Option<f64>,
    pub base_food: Option<f64>,
    pub base_weight: Option<f64>,
    pub base_damage: Option<f64>,
    pub base_speed: Option<f64>,
    pub wiki_url: Option<String>,
    pub dododex_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub stat_name: String,
    pub base_value: f64,
    pub wild_per_level: Option<f64>,
    pub tamed_per_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TamingRecord {
    pub method: String,
    pub preferred_foods: Vec<String>,
    pub kibble_type: Option<String>,
    pub base_food_quantity: i32,
    pub base_taming_time: f64,
    pub torpor_depletion_rate: Option<f64>,
    pub base_torpor: Option<f64>,
    pub feeding_interval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub wiki_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaveRecord {
    pub name: String,
    pub difficulty: Option<String>,
    pub artifact: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub name: String,
    pub resource_type: String,
    pub abundance: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObeliskRecord {
    pub color: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyDropRecord {
    pub tier: String,
    pub min_level: i32,
    pub quality: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpotRecord {
    pub name: String,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncLogRecord {
    pub sync_type: String,
    pub status: String,
    pub message: Option<String>,
    pub records_processed: i32,
    pub records_failed: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
