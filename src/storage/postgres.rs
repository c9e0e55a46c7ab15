//! PostgreSQL Storage - reference data persistence
//!
//! Uses `sqlx` with runtime-built queries. List endpoints assemble their
//! `WHERE` clause with `QueryBuilder` and positional binds; every write is an
//! `INSERT ... ON CONFLICT ... DO UPDATE` so population runs converge.
//!
//! ## Tables
//! - maps, creatures, creature_stats, taming_data
//! - map_regions, caves, resources, obelisks, supply_drops, base_spots
//! - system_status, data_sync_log, wiki_update_log

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info, warn};

use super::migrations;
use super::repository::*;
use crate::models::*;
use crate::pagination::{PageRequest, Paged};

const MAP_COLUMNS: &str =
    "id, name, slug, is_official, is_expansion, release_date, size_km2, description, created_at, updated_at";

pub(crate) const CREATURE_COLUMNS: &str = "id, name, slug, temperament, diet, is_tameable, is_rideable, is_breedable, \
     base_health, base_stamina, base_food, base_weight, base_damage, base_speed, \
     wiki_url, dododex_id, created_at, updated_at";

const STAT_COLUMNS: &str = "id, creature_id, stat_name, base_value, wild_per_level, tamed_per_level, updated_at";

const TAMING_COLUMNS: &str = "t.id, t.creature_id, t.method, t.preferred_foods, t.kibble_type, \
     t.base_food_quantity, t.base_taming_time, t.torpor_depletion_rate, t.base_torpor, \
     t.feeding_interval, t.updated_at";

const REGION_COLUMNS: &str = "id, map_id, name, category, description, image_url, wiki_url, updated_at";

/// PostgreSQL connection pool wrapper
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL (schema setup is left to the initializer)
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connected (max_connections={})", max_connections);
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests, initializer)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }

    // ========================================================================
    // Schema management
    // ========================================================================

    /// True when every core table exists in the public schema
    pub async fn core_tables_exist(&self) -> Result<bool, StoreError> {
        let names: Vec<String> = migrations::CORE_TABLES.iter().map(|t| t.to_string()).collect();
        let found: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables
             WHERE table_schema = 'public' AND table_name = ANY($1)",
        )
        .bind(&names)
        .fetch_one(&self.pool)
        .await?;

        Ok(found as usize == migrations::CORE_TABLES.len())
    }

    /// Create the schema unless the core tables already exist
    pub async fn create_schema(&self) -> Result<bool, StoreError> {
        if self.core_tables_exist().await? {
            debug!("Core tables present, skipping schema creation");
            return Ok(false);
        }

        info!("Creating database schema");
        sqlx::raw_sql(migrations::SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(format!("schema: {}", e)))?;
        Ok(true)
    }

    /// Apply incremental migrations; a failing migration is logged and skipped
    pub async fn apply_migrations(&self) -> usize {
        let mut applied = 0;
        for (name, sql) in migrations::INCREMENTAL_MIGRATIONS {
            match sqlx::raw_sql(sql).execute(&self.pool).await {
                Ok(_) => {
                    debug!("Migration applied: {}", name);
                    applied += 1;
                }
                Err(e) => warn!("Migration {} failed (continuing): {}", name, e),
            }
        }
        applied
    }

    pub async fn drop_schema(&self) -> Result<(), StoreError> {
        let sql = migrations::ALL_TABLES
            .iter()
            .map(|t| format!("DROP TABLE IF EXISTS {} CASCADE;", t))
            .collect::<Vec<_>>()
            .join("\n");

        sqlx::raw_sql(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(format!("drop schema: {}", e)))?;
        warn!("Dropped all tables");
        Ok(())
    }

    pub async fn write_schema_version(&self) -> Result<(), StoreError> {
        self.set_status("schema_version", migrations::SCHEMA_VERSION, None).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn fetch_by_map<T>(&self, table: &str, columns: &str, order: &str, map_id: i64) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT {} FROM {} WHERE map_id = $1 ORDER BY {}", columns, table, order);
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(map_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_where(&self, sql: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

fn like_pattern(text: &str) -> String {
    format!("%{}%", text.trim())
}

fn push_creature_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CreatureFilter) {
    if let Some(v) = filter.tameable {
        qb.push(" AND is_tameable = ").push_bind(v);
    }
    if let Some(v) = filter.rideable {
        qb.push(" AND is_rideable = ").push_bind(v);
    }
    if let Some(v) = filter.breedable {
        qb.push(" AND is_breedable = ").push_bind(v);
    }
    if let Some(t) = &filter.temperament {
        qb.push(" AND temperament ILIKE ").push_bind(like_pattern(t));
    }
    if let Some(d) = &filter.diet {
        qb.push(" AND diet ILIKE ").push_bind(like_pattern(d));
    }
}

fn push_map_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MapFilter) {
    match filter.kind {
        Some(MapKind::Official) => {
            qb.push(" AND is_official AND NOT is_expansion");
        }
        Some(MapKind::Expansion) => {
            qb.push(" AND is_expansion");
        }
        Some(MapKind::Community) => {
            qb.push(" AND NOT is_official");
        }
        None => {}
    }
    if let Some(v) = filter.official {
        qb.push(" AND is_official = ").push_bind(v);
    }
}

fn push_region_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &RegionFilter) {
    if let Some(slug) = &filter.map {
        qb.push(" AND map_id = (SELECT id FROM maps WHERE slug = ")
            .push_bind(slug.clone())
            .push(")");
    }
    if let Some(category) = &filter.category {
        qb.push(" AND LOWER(category) = LOWER(").push_bind(category.clone()).push(")");
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

// ============================================================================
// Read side
// ============================================================================

#[async_trait]
impl CatalogReader for PostgresStore {
    fn is_mock(&self) -> bool {
        false
    }

    async fn list_creatures(&self, filter: &CreatureFilter, page: PageRequest) -> StoreResult<Paged<Creature>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM creatures WHERE TRUE");
        push_creature_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM creatures WHERE TRUE", CREATURE_COLUMNS));
        push_creature_filters(&mut qb, filter);
        qb.push(" ORDER BY name");
        push_page(&mut qb, page);
        let items = qb.build_query_as::<Creature>().fetch_all(&self.pool).await?;

        Ok(Paged { items, total })
    }

    async fn search_creatures(&self, query: &str, limit: u32) -> StoreResult<Vec<Creature>> {
        let sql = format!(
            "SELECT {} FROM creatures
             WHERE name ILIKE $1 OR slug ILIKE $1 OR temperament ILIKE $1
             ORDER BY name LIMIT $2",
            CREATURE_COLUMNS
        );
        let rows = sqlx::query_as::<_, Creature>(&sql)
            .bind(like_pattern(query))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_creature(&self, slug: &str) -> StoreResult<Option<CreatureDetail>> {
        let sql = format!("SELECT {} FROM creatures WHERE slug = $1", CREATURE_COLUMNS);
        let Some(creature) = sqlx::query_as::<_, Creature>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let stats_sql = format!(
            "SELECT {} FROM creature_stats WHERE creature_id = $1 ORDER BY stat_name",
            STAT_COLUMNS
        );
        let stats = sqlx::query_as::<_, CreatureStat>(&stats_sql)
            .bind(creature.id)
            .fetch_all(&self.pool)
            .await?;

        let taming_sql = format!("SELECT {} FROM taming_data t WHERE t.creature_id = $1", TAMING_COLUMNS);
        let taming = sqlx::query_as::<_, TamingData>(&taming_sql)
            .bind(creature.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(Some(CreatureDetail { creature, stats, taming }))
    }

    async fn list_maps(&self, filter: &MapFilter, page: PageRequest) -> StoreResult<Paged<Map>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM maps WHERE TRUE");
        push_map_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM maps WHERE TRUE", MAP_COLUMNS));
        push_map_filters(&mut qb, filter);
        qb.push(" ORDER BY name");
        push_page(&mut qb, page);
        let items = qb.build_query_as::<Map>().fetch_all(&self.pool).await?;

        Ok(Paged { items, total })
    }

    async fn search_maps(&self, query: &str, limit: u32) -> StoreResult<Vec<Map>> {
        let sql = format!(
            "SELECT {} FROM maps WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY name LIMIT $2",
            MAP_COLUMNS
        );
        let rows = sqlx::query_as::<_, Map>(&sql)
            .bind(like_pattern(query))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_map(&self, slug: &str) -> StoreResult<Option<Map>> {
        let sql = format!("SELECT {} FROM maps WHERE slug = $1", MAP_COLUMNS);
        let row = sqlx::query_as::<_, Map>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn map_regions(&self, map_id: i64) -> StoreResult<Vec<MapRegion>> {
        self.fetch_by_map("map_regions", REGION_COLUMNS, "name", map_id).await
    }

    async fn map_caves(&self, map_id: i64) -> StoreResult<Vec<Cave>> {
        self.fetch_by_map(
            "caves",
            "id, map_id, name, difficulty, artifact, description, latitude, longitude, updated_at",
            "name",
            map_id,
        )
        .await
    }

    async fn map_resources(&self, map_id: i64) -> StoreResult<Vec<Resource>> {
        self.fetch_by_map(
            "resources",
            "id, map_id, name, resource_type, abundance, description, updated_at",
            "name",
            map_id,
        )
        .await
    }

    async fn map_obelisks(&self, map_id: i64) -> StoreResult<Vec<Obelisk>> {
        self.fetch_by_map(
            "obelisks",
            "id, map_id, color, latitude, longitude, description, updated_at",
            "color",
            map_id,
        )
        .await
    }

    async fn map_supply_drops(&self, map_id: i64) -> StoreResult<Vec<SupplyDrop>> {
        self.fetch_by_map(
            "supply_drops",
            "id, map_id, tier, min_level, quality, description, updated_at",
            "min_level",
            map_id,
        )
        .await
    }

    async fn map_base_spots(&self, map_id: i64) -> StoreResult<Vec<BaseSpot>> {
        self.fetch_by_map(
            "base_spots",
            "id, map_id, name, difficulty, description, latitude, longitude, updated_at",
            "name",
            map_id,
        )
        .await
    }

    async fn list_regions(&self, filter: &RegionFilter, page: PageRequest) -> StoreResult<Paged<MapRegion>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM map_regions WHERE TRUE");
        push_region_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM map_regions WHERE TRUE", REGION_COLUMNS));
        push_region_filters(&mut qb, filter);
        qb.push(" ORDER BY name");
        push_page(&mut qb, page);
        let items = qb.build_query_as::<MapRegion>().fetch_all(&self.pool).await?;

        Ok(Paged { items, total })
    }

    async fn search_regions(&self, query: &str, limit: u32) -> StoreResult<Vec<MapRegion>> {
        let sql = format!(
            "SELECT {} FROM map_regions WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY name LIMIT $2",
            REGION_COLUMNS
        );
        let rows = sqlx::query_as::<_, MapRegion>(&sql)
            .bind(like_pattern(query))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_region(&self, id: i64) -> StoreResult<Option<MapRegion>> {
        let sql = format!("SELECT {} FROM map_regions WHERE id = $1", REGION_COLUMNS);
        let row = sqlx::query_as::<_, MapRegion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_taming(&self, filter: &TamingFilter, page: PageRequest) -> StoreResult<Paged<TamingEntry>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM taming_data t WHERE TRUE");
        if let Some(method) = &filter.method {
            count.push(" AND t.method ILIKE ").push_bind(method.clone());
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT c.name AS creature_name, c.slug AS creature_slug, {}
             FROM taming_data t JOIN creatures c ON c.id = t.creature_id WHERE TRUE",
            TAMING_COLUMNS
        ));
        if let Some(method) = &filter.method {
            qb.push(" AND t.method ILIKE ").push_bind(method.clone());
        }
        qb.push(" ORDER BY c.name");
        push_page(&mut qb, page);
        let items = qb.build_query_as::<TamingEntry>().fetch_all(&self.pool).await?;

        Ok(Paged { items, total })
    }

    async fn get_taming(&self, creature: &str) -> StoreResult<Option<(Creature, TamingData)>> {
        let sql = format!(
            "SELECT {} FROM creatures WHERE slug = $1 OR LOWER(name) = LOWER($1) ORDER BY (slug = $1) DESC LIMIT 1",
            CREATURE_COLUMNS
        );
        let Some(row) = sqlx::query_as::<_, Creature>(&sql)
            .bind(creature.trim())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let taming_sql = format!("SELECT {} FROM taming_data t WHERE t.creature_id = $1", TAMING_COLUMNS);
        let taming = sqlx::query_as::<_, TamingData>(&taming_sql)
            .bind(row.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(taming.map(|t| (row, t)))
    }

    async fn table_counts(&self) -> StoreResult<TableCounts> {
        let counts = sqlx::query_as::<_, TableCounts>(
            "SELECT
                (SELECT COUNT(*) FROM maps) AS maps,
                (SELECT COUNT(*) FROM creatures) AS creatures,
                (SELECT COUNT(*) FROM creature_stats) AS creature_stats,
                (SELECT COUNT(*) FROM taming_data) AS taming_data,
                (SELECT COUNT(*) FROM map_regions) AS map_regions,
                (SELECT COUNT(*) FROM caves) AS caves,
                (SELECT COUNT(*) FROM resources) AS resources,
                (SELECT COUNT(*) FROM obelisks) AS obelisks,
                (SELECT COUNT(*) FROM supply_drops) AS supply_drops,
                (SELECT COUNT(*) FROM base_spots) AS base_spots",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn layer_counts(&self) -> StoreResult<Vec<MapLayerCounts>> {
        let rows = sqlx::query_as::<_, MapLayerCounts>(
            "SELECT m.id AS map_id,
                COALESCE(r.n, 0) AS regions,
                COALESCE(c.n, 0) AS caves,
                COALESCE(res.n, 0) AS resources,
                COALESCE(o.n, 0) AS obelisks,
                COALESCE(s.n, 0) AS supply_drops,
                COALESCE(b.n, 0) AS base_spots
             FROM maps m
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM map_regions GROUP BY map_id) r ON r.map_id = m.id
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM caves GROUP BY map_id) c ON c.map_id = m.id
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM resources GROUP BY map_id) res ON res.map_id = m.id
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM obelisks GROUP BY map_id) o ON o.map_id = m.id
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM supply_drops GROUP BY map_id) s ON s.map_id = m.id
             LEFT JOIN (SELECT map_id, COUNT(*) AS n FROM base_spots GROUP BY map_id) b ON b.map_id = m.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn integrity_report(&self) -> StoreResult<IntegrityReport> {
        let counts = self.table_counts().await?;
        let without_stats = self
            .count_where(
                "SELECT COUNT(*) FROM creatures c
                 WHERE NOT EXISTS (SELECT 1 FROM creature_stats s WHERE s.creature_id = c.id)",
            )
            .await?;
        let without_taming = self
            .count_where(
                "SELECT COUNT(*) FROM creatures c
                 WHERE c.is_tameable AND NOT EXISTS (SELECT 1 FROM taming_data t WHERE t.creature_id = c.id)",
            )
            .await?;
        let without_regions = self
            .count_where(
                "SELECT COUNT(*) FROM maps m
                 WHERE NOT EXISTS (SELECT 1 FROM map_regions r WHERE r.map_id = m.id)",
            )
            .await?;

        Ok(IntegrityReport::new(counts, without_stats, without_taming, without_regions))
    }

    async fn system_status(&self) -> StoreResult<Vec<SystemStatus>> {
        let rows = sqlx::query_as::<_, SystemStatus>(
            "SELECT key, status, message, updated_at FROM system_status ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_sync_logs(&self, limit: u32) -> StoreResult<Vec<DataSyncLog>> {
        let rows = sqlx::query_as::<_, DataSyncLog>(
            "SELECT id, sync_type, status, message, records_processed, records_failed, started_at, finished_at
             FROM data_sync_log ORDER BY id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Write side
// ============================================================================

#[async_trait]
impl CatalogWriter for PostgresStore {
    async fn upsert_map(&self, map: &MapRecord) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO maps (name, slug, is_official, is_expansion, release_date, size_km2, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                is_official = EXCLUDED.is_official,
                is_expansion = EXCLUDED.is_expansion,
                release_date = EXCLUDED.release_date,
                size_km2 = EXCLUDED.size_km2,
                description = EXCLUDED.description,
                updated_at = NOW()
             RETURNING id",
        )
        .bind(&map.name)
        .bind(&map.slug)
        .bind(map.is_official)
        .bind(map.is_expansion)
        .bind(map.release_date)
        .bind(map.size_km2)
        .bind(&map.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn upsert_creature(&self, c: &CreatureRecord) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO creatures (name, slug, temperament, diet, is_tameable, is_rideable, is_breedable,
                                    base_health, base_stamina, base_food, base_weight, base_damage, base_speed,
                                    wiki_url, dododex_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                temperament = EXCLUDED.temperament,
                diet = EXCLUDED.diet,
                is_tameable = EXCLUDED.is_tameable,
                is_rideable = EXCLUDED.is_rideable,
                is_breedable = EXCLUDED.is_breedable,
                base_health = EXCLUDED.base_health,
                base_stamina = EXCLUDED.base_stamina,
                base_food = EXCLUDED.base_food,
                base_weight = EXCLUDED.base_weight,
                base_damage = EXCLUDED.base_damage,
                base_speed = EXCLUDED.base_speed,
                wiki_url = EXCLUDED.wiki_url,
                dododex_id = EXCLUDED.dododex_id,
                updated_at = NOW()
             RETURNING id",
        )
        .bind(&c.name)
        .bind(&c.slug)
        .bind(&c.temperament)
        .bind(&c.diet)
        .bind(c.is_tameable)
        .bind(c.is_rideable)
        .bind(c.is_breedable)
        .bind(c.base_health)
        .bind(c.base_stamina)
        .bind(c.base_food)
        .bind(c.base_weight)
        .bind(c.base_damage)
        .bind(c.base_speed)
        .bind(&c.wiki_url)
        .bind(&c.dododex_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn upsert_creature_stat(&self, creature_id: i64, stat: &StatRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO creature_stats (creature_id, stat_name, base_value, wild_per_level, tamed_per_level)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (creature_id, stat_name) DO UPDATE SET
                base_value = EXCLUDED.base_value,
                wild_per_level = EXCLUDED.wild_per_level,
                tamed_per_level = EXCLUDED.tamed_per_level,
                updated_at = NOW()",
        )
        .bind(creature_id)
        .bind(&stat.stat_name)
        .bind(stat.base_value)
        .bind(stat.wild_per_level)
        .bind(stat.tamed_per_level)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_taming(&self, creature_id: i64, t: &TamingRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO taming_data (creature_id, method, preferred_foods, kibble_type, base_food_quantity,
                                      base_taming_time, torpor_depletion_rate, base_torpor, feeding_interval)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (creature_id) DO UPDATE SET
                method = EXCLUDED.method,
                preferred_foods = EXCLUDED.preferred_foods,
                kibble_type = EXCLUDED.kibble_type,
                base_food_quantity = EXCLUDED.base_food_quantity,
                base_taming_time = EXCLUDED.base_taming_time,
                torpor_depletion_rate = EXCLUDED.torpor_depletion_rate,
                base_torpor = EXCLUDED.base_torpor,
                feeding_interval = EXCLUDED.feeding_interval,
                updated_at = NOW()",
        )
        .bind(creature_id)
        .bind(&t.method)
        .bind(Json(t.preferred_foods.clone()))
        .bind(&t.kibble_type)
        .bind(t.base_food_quantity)
        .bind(t.base_taming_time)
        .bind(t.torpor_depletion_rate)
        .bind(t.base_torpor)
        .bind(t.feeding_interval)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_region(&self, map_id: i64, r: &RegionRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO map_regions (map_id, name, category, description, image_url, wiki_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (map_id, name) DO UPDATE SET
                category = EXCLUDED.category,
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url,
                wiki_url = EXCLUDED.wiki_url,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&r.name)
        .bind(&r.category)
        .bind(&r.description)
        .bind(&r.image_url)
        .bind(&r.wiki_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_cave(&self, map_id: i64, c: &CaveRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO caves (map_id, name, difficulty, artifact, description, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (map_id, name) DO UPDATE SET
                difficulty = EXCLUDED.difficulty,
                artifact = EXCLUDED.artifact,
                description = EXCLUDED.description,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&c.name)
        .bind(&c.difficulty)
        .bind(&c.artifact)
        .bind(&c.description)
        .bind(c.latitude)
        .bind(c.longitude)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_resource(&self, map_id: i64, r: &ResourceRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO resources (map_id, name, resource_type, abundance, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (map_id, name) DO UPDATE SET
                resource_type = EXCLUDED.resource_type,
                abundance = EXCLUDED.abundance,
                description = EXCLUDED.description,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&r.name)
        .bind(&r.resource_type)
        .bind(&r.abundance)
        .bind(&r.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_obelisk(&self, map_id: i64, o: &ObeliskRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO obelisks (map_id, color, latitude, longitude, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (map_id, color) DO UPDATE SET
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                description = EXCLUDED.description,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&o.color)
        .bind(o.latitude)
        .bind(o.longitude)
        .bind(&o.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_supply_drop(&self, map_id: i64, d: &SupplyDropRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO supply_drops (map_id, tier, min_level, quality, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (map_id, tier) DO UPDATE SET
                min_level = EXCLUDED.min_level,
                quality = EXCLUDED.quality,
                description = EXCLUDED.description,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&d.tier)
        .bind(d.min_level)
        .bind(&d.quality)
        .bind(&d.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_base_spot(&self, map_id: i64, s: &BaseSpotRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO base_spots (map_id, name, difficulty, description, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (map_id, name) DO UPDATE SET
                difficulty = EXCLUDED.difficulty,
                description = EXCLUDED.description,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()",
        )
        .bind(map_id)
        .bind(&s.name)
        .bind(&s.difficulty)
        .bind(&s.description)
        .bind(s.latitude)
        .bind(s.longitude)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn map_refs(&self) -> StoreResult<Vec<MapRef>> {
        let rows = sqlx::query_as::<_, MapRef>("SELECT id, slug, name FROM maps ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn set_status(&self, key: &str, status: &str, message: Option<&str>) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO system_status (key, status, message, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (key) DO UPDATE SET
                status = EXCLUDED.status,
                message = EXCLUDED.message,
                updated_at = NOW()",
        )
        .bind(key)
        .bind(status)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn log_sync(&self, entry: &SyncLogRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO data_sync_log (sync_type, status, message, records_processed, records_failed, started_at, finished_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&entry.sync_type)
        .bind(&entry.status)
        .bind(&entry.message)
        .bind(entry.records_processed)
        .bind(entry.records_failed)
        .bind(entry.started_at)
        .bind(entry.finished_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn log_wiki_update(&self, page_title: &str, status: &str, records: i32, message: Option<&str>) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO wiki_update_log (page_title, status, records, message) VALUES ($1, $2, $3, $4)",
        )
        .bind(page_title)
        .bind(status)
        .bind(records)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_schema(&self) -> StoreResult<()> {
        self.drop_schema().await?;
        self.create_schema().await?;
        self.apply_migrations().await;
        self.write_schema_version().await
    }

    async fn refresh_search_indexes(&self) -> StoreResult<()> {
        sqlx::raw_sql("ANALYZE creatures; ANALYZE maps; ANALYZE map_regions;")
            .execute(&self.pool)
            .await?;
        debug!("Search statistics refreshed");
        Ok(())
    }
}
