//! In-memory catalog
//!
//! Backs the API when `SKIP_DATABASE` is set and doubles as the writer in
//! population tests. Rows are keyed exactly like the SQL unique keys, so a
//! repeated upsert updates in place and only advances `updated_at`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sqlx::types::Json;
use tracing::info;

use super::mock_data;
use super::repository::*;
use crate::models::*;
use crate::pagination::{PageRequest, Paged};
use crate::reference;

#[derive(Default)]
struct Tables {
    next_id: i64,
    maps: Vec<Map>,
    creatures: Vec<Creature>,
    stats: Vec<CreatureStat>,
    taming: Vec<TamingData>,
    regions: Vec<MapRegion>,
    caves: Vec<Cave>,
    resources: Vec<Resource>,
    obelisks: Vec<Obelisk>,
    supply_drops: Vec<SupplyDrop>,
    base_spots: Vec<BaseSpot>,
    status: BTreeMap<String, SystemStatus>,
    sync_log: Vec<DataSyncLog>,
    wiki_log: Vec<WikiUpdateLog>,
}

/// Update the row matching `key`, or append a new one. Returns the row index.
fn upsert_by<T>(rows: &mut Vec<T>, key: impl Fn(&T) -> bool, update: impl FnOnce(&mut T), create: impl FnOnce() -> T) -> usize {
    match rows.iter().position(key) {
        Some(idx) => {
            update(&mut rows[idx]);
            idx
        }
        None => {
            rows.push(create());
            rows.len() - 1
        }
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.trim().to_lowercase()))
}

fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn page_of<T: Clone>(rows: Vec<T>, page: PageRequest) -> Paged<T> {
    Paged {
        total: rows.len() as i64,
        items: page.slice(&rows),
    }
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn map_id_for(&self, slug: &str) -> Option<i64> {
        self.maps.iter().find(|m| m.slug == slug).map(|m| m.id)
    }

    fn upsert_map(&mut self, rec: &MapRecord) -> i64 {
        let now = Some(Utc::now());
        let id = self.next_id();
        let idx = upsert_by(
            &mut self.maps,
            |m| m.slug == rec.slug,
            |m| {
                m.name = rec.name.clone();
                m.is_official = rec.is_official;
                m.is_expansion = rec.is_expansion;
                m.release_date = rec.release_date;
                m.size_km2 = rec.size_km2;
                m.description = rec.description.clone();
                m.updated_at = now;
            },
            || Map {
                id,
                name: rec.name.clone(),
                slug: rec.slug.clone(),
                is_official: rec.is_official,
                is_expansion: rec.is_expansion,
                release_date: rec.release_date,
                size_km2: rec.size_km2,
                description: rec.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        self.maps[idx].id
    }

    fn upsert_creature(&mut self, rec: &CreatureRecord) -> i64 {
        let now = Some(Utc::now());
        let id = self.next_id();
        let build = |id: i64, created_at| Creature {
            id,
            name: rec.name.clone(),
            slug: rec.slug.clone(),
            temperament: rec.temperament.clone(),
            diet: rec.diet.clone(),
            is_tameable: rec.is_tameable,
            is_rideable: rec.is_rideable,
            is_breedable: rec.is_breedable,
            base_health: rec.base_health,
            base_stamina: rec.base_stamina,
            base_food: rec.base_food,
            base_weight: rec.base_weight,
            base_damage: rec.base_damage,
            base_speed: rec.base_speed,
            wiki_url: rec.wiki_url.clone(),
            dododex_id: rec.dododex_id.clone(),
            created_at,
            updated_at: now,
        };
        let idx = upsert_by(
            &mut self.creatures,
            |c| c.slug == rec.slug,
            |c| *c = build(c.id, c.created_at),
            || build(id, now),
        );
        self.creatures[idx].id
    }

    fn upsert_stat(&mut self, creature_id: i64, rec: &StatRecord) {
        let now = Some(Utc::now());
        let id = self.next_id();
        upsert_by(
            &mut self.stats,
            |s| s.creature_id == creature_id && s.stat_name == rec.stat_name,
            |s| {
                s.base_value = rec.base_value;
                s.wild_per_level = rec.wild_per_level;
                s.tamed_per_level = rec.tamed_per_level;
                s.updated_at = now;
            },
            || CreatureStat {
                id,
                creature_id,
                stat_name: rec.stat_name.clone(),
                base_value: rec.base_value,
                wild_per_level: rec.wild_per_level,
                tamed_per_level: rec.tamed_per_level,
                updated_at: now,
            },
        );
    }

    fn upsert_taming(&mut self, creature_id: i64, rec: &TamingRecord) {
        let id = self.next_id();
        let build = |id: i64| TamingData {
            id,
            creature_id,
            method: rec.method.clone(),
            preferred_foods: Json(rec.preferred_foods.clone()),
            kibble_type: rec.kibble_type.clone(),
            base_food_quantity: rec.base_food_quantity,
            base_taming_time: rec.base_taming_time,
            torpor_depletion_rate: rec.torpor_depletion_rate,
            base_torpor: rec.base_torpor,
            feeding_interval: rec.feeding_interval,
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.taming,
            |t| t.creature_id == creature_id,
            |t| *t = build(t.id),
            || build(id),
        );
    }

    fn upsert_region(&mut self, map_id: i64, rec: &RegionRecord) {
        let id = self.next_id();
        let build = |id: i64| MapRegion {
            id,
            map_id,
            name: rec.name.clone(),
            category: rec.category.clone(),
            description: rec.description.clone(),
            image_url: rec.image_url.clone(),
            wiki_url: rec.wiki_url.clone(),
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.regions,
            |r| r.map_id == map_id && r.name == rec.name,
            |r| *r = build(r.id),
            || build(id),
        );
    }

    fn upsert_cave(&mut self, map_id: i64, rec: &CaveRecord) {
        let id = self.next_id();
        let build = |id: i64| Cave {
            id,
            map_id,
            name: rec.name.clone(),
            difficulty: rec.difficulty.clone(),
            artifact: rec.artifact.clone(),
            description: rec.description.clone(),
            latitude: rec.latitude,
            longitude: rec.longitude,
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.caves,
            |c| c.map_id == map_id && c.name == rec.name,
            |c| *c = build(c.id),
            || build(id),
        );
    }

    fn upsert_resource(&mut self, map_id: i64, rec: &ResourceRecord) {
        let id = self.next_id();
        let build = |id: i64| Resource {
            id,
            map_id,
            name: rec.name.clone(),
            resource_type: rec.resource_type.clone(),
            abundance: rec.abundance.clone(),
            description: rec.description.clone(),
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.resources,
            |r| r.map_id == map_id && r.name == rec.name,
            |r| *r = build(r.id),
            || build(id),
        );
    }

    fn upsert_obelisk(&mut self, map_id: i64, rec: &ObeliskRecord) {
        let id = self.next_id();
        let build = |id: i64| Obelisk {
            id,
            map_id,
            color: rec.color.clone(),
            latitude: rec.latitude,
            longitude: rec.longitude,
            description: rec.description.clone(),
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.obelisks,
            |o| o.map_id == map_id && o.color == rec.color,
            |o| *o = build(o.id),
            || build(id),
        );
    }

    fn upsert_supply_drop(&mut self, map_id: i64, rec: &SupplyDropRecord) {
        let id = self.next_id();
        let build = |id: i64| SupplyDrop {
            id,
            map_id,
            tier: rec.tier.clone(),
            min_level: rec.min_level,
            quality: rec.quality.clone(),
            description: rec.description.clone(),
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.supply_drops,
            |d| d.map_id == map_id && d.tier == rec.tier,
            |d| *d = build(d.id),
            || build(id),
        );
    }

    fn upsert_base_spot(&mut self, map_id: i64, rec: &BaseSpotRecord) {
        let id = self.next_id();
        let build = |id: i64| BaseSpot {
            id,
            map_id,
            name: rec.name.clone(),
            difficulty: rec.difficulty.clone(),
            description: rec.description.clone(),
            latitude: rec.latitude,
            longitude: rec.longitude,
            updated_at: Some(Utc::now()),
        };
        upsert_by(
            &mut self.base_spots,
            |s| s.map_id == map_id && s.name == rec.name,
            |s| *s = build(s.id),
            || build(id),
        );
    }

    fn counts(&self) -> TableCounts {
        TableCounts {
            maps: self.maps.len() as i64,
            creatures: self.creatures.len() as i64,
            creature_stats: self.stats.len() as i64,
            taming_data: self.taming.len() as i64,
            map_regions: self.regions.len() as i64,
            caves: self.caves.len() as i64,
            resources: self.resources.len() as i64,
            obelisks: self.obelisks.len() as i64,
            supply_drops: self.supply_drops.len() as i64,
            base_spots: self.base_spots.len() as i64,
        }
    }

    fn sorted_by_map<T: Clone>(rows: &[T], map_id: i64, map_of: impl Fn(&T) -> i64, cmp: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
        let mut out: Vec<T> = rows.iter().filter(|r| map_of(r) == map_id).cloned().collect();
        out.sort_by(cmp);
        out
    }
}

/// Catalog held entirely in memory
pub struct MemoryStore {
    tables: RwLock<Tables>,
    mock: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store, reported as a real backend
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            mock: false,
        }
    }

    /// Store seeded with the built-in mock dataset
    pub fn with_mock_data() -> Self {
        let mut tables = Tables::default();

        for map in reference::official_maps() {
            let map_id = tables.upsert_map(&map);
            for r in reference::resources_for(&map.slug) {
                tables.upsert_resource(map_id, &r);
            }
            for o in reference::obelisks_for(&map.slug) {
                tables.upsert_obelisk(map_id, &o);
            }
            for d in reference::supply_drops_for(&map.slug) {
                tables.upsert_supply_drop(map_id, &d);
            }
            for s in reference::base_spots_for(&map.slug) {
                tables.upsert_base_spot(map_id, &s);
            }
        }

        for mock in mock_data::creatures() {
            let creature_id = tables.upsert_creature(&mock.creature);
            for stat in &mock.stats {
                tables.upsert_stat(creature_id, stat);
            }
            if let Some(taming) = &mock.taming {
                tables.upsert_taming(creature_id, taming);
            }
        }

        for (slug, region) in mock_data::regions() {
            if let Some(map_id) = tables.map_id_for(slug) {
                tables.upsert_region(map_id, &region);
            }
        }
        for (slug, cave) in mock_data::caves() {
            if let Some(map_id) = tables.map_id_for(slug) {
                tables.upsert_cave(map_id, &cave);
            }
        }

        let counts = tables.counts();
        info!(
            "Mock catalog ready: {} maps, {} creatures, {} regions",
            counts.maps, counts.creatures, counts.map_regions
        );

        Self {
            tables: RwLock::new(tables),
            mock: true,
        }
    }
}

// ============================================================================
// Read side
// ============================================================================

#[async_trait]
impl CatalogReader for MemoryStore {
    fn is_mock(&self) -> bool {
        self.mock
    }

    async fn list_creatures(&self, filter: &CreatureFilter, page: PageRequest) -> StoreResult<Paged<Creature>> {
        let t = self.tables.read();
        let mut rows: Vec<Creature> = t
            .creatures
            .iter()
            .filter(|c| filter.tameable.map_or(true, |v| c.is_tameable == v))
            .filter(|c| filter.rideable.map_or(true, |v| c.is_rideable == v))
            .filter(|c| filter.breedable.map_or(true, |v| c.is_breedable == v))
            .filter(|c| filter.temperament.as_deref().map_or(true, |q| contains_ci(c.temperament.as_deref(), q)))
            .filter(|c| filter.diet.as_deref().map_or(true, |q| contains_ci(c.diet.as_deref(), q)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        Ok(page_of(rows, page))
    }

    async fn search_creatures(&self, query: &str, limit: u32) -> StoreResult<Vec<Creature>> {
        let t = self.tables.read();
        let mut rows: Vec<Creature> = t
            .creatures
            .iter()
            .filter(|c| {
                contains_ci(Some(&c.name), query)
                    || contains_ci(Some(&c.slug), query)
                    || contains_ci(c.temperament.as_deref(), query)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn get_creature(&self, slug: &str) -> StoreResult<Option<CreatureDetail>> {
        let t = self.tables.read();
        let Some(creature) = t.creatures.iter().find(|c| c.slug == slug).cloned() else {
            return Ok(None);
        };
        let mut stats: Vec<CreatureStat> = t.stats.iter().filter(|s| s.creature_id == creature.id).cloned().collect();
        stats.sort_by(|a, b| a.stat_name.cmp(&b.stat_name));
        let taming = t.taming.iter().find(|x| x.creature_id == creature.id).cloned();
        Ok(Some(CreatureDetail { creature, stats, taming }))
    }

    async fn list_maps(&self, filter: &MapFilter, page: PageRequest) -> StoreResult<Paged<Map>> {
        let t = self.tables.read();
        let mut rows: Vec<Map> = t
            .maps
            .iter()
            .filter(|m| filter.kind.map_or(true, |k| k.matches(m)))
            .filter(|m| filter.official.map_or(true, |v| m.is_official == v))
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        Ok(page_of(rows, page))
    }

    async fn search_maps(&self, query: &str, limit: u32) -> StoreResult<Vec<Map>> {
        let t = self.tables.read();
        let mut rows: Vec<Map> = t
            .maps
            .iter()
            .filter(|m| contains_ci(Some(&m.name), query) || contains_ci(m.description.as_deref(), query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn get_map(&self, slug: &str) -> StoreResult<Option<Map>> {
        Ok(self.tables.read().maps.iter().find(|m| m.slug == slug).cloned())
    }

    async fn map_regions(&self, map_id: i64) -> StoreResult<Vec<MapRegion>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.regions, map_id, |r| r.map_id, |a, b| by_name(&a.name, &b.name)))
    }

    async fn map_caves(&self, map_id: i64) -> StoreResult<Vec<Cave>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.caves, map_id, |c| c.map_id, |a, b| by_name(&a.name, &b.name)))
    }

    async fn map_resources(&self, map_id: i64) -> StoreResult<Vec<Resource>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.resources, map_id, |r| r.map_id, |a, b| by_name(&a.name, &b.name)))
    }

    async fn map_obelisks(&self, map_id: i64) -> StoreResult<Vec<Obelisk>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.obelisks, map_id, |o| o.map_id, |a, b| a.color.cmp(&b.color)))
    }

    async fn map_supply_drops(&self, map_id: i64) -> StoreResult<Vec<SupplyDrop>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.supply_drops, map_id, |d| d.map_id, |a, b| a.min_level.cmp(&b.min_level)))
    }

    async fn map_base_spots(&self, map_id: i64) -> StoreResult<Vec<BaseSpot>> {
        let t = self.tables.read();
        Ok(Tables::sorted_by_map(&t.base_spots, map_id, |s| s.map_id, |a, b| by_name(&a.name, &b.name)))
    }

    async fn list_regions(&self, filter: &RegionFilter, page: PageRequest) -> StoreResult<Paged<MapRegion>> {
        let t = self.tables.read();
        let map_id = match &filter.map {
            Some(slug) => match t.map_id_for(slug) {
                Some(id) => Some(id),
                None => return Ok(Paged { items: Vec::new(), total: 0 }),
            },
            None => None,
        };
        let mut rows: Vec<MapRegion> = t
            .regions
            .iter()
            .filter(|r| map_id.map_or(true, |id| r.map_id == id))
            .filter(|r| filter.category.as_deref().map_or(true, |c| r.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        Ok(page_of(rows, page))
    }

    async fn search_regions(&self, query: &str, limit: u32) -> StoreResult<Vec<MapRegion>> {
        let t = self.tables.read();
        let mut rows: Vec<MapRegion> = t
            .regions
            .iter()
            .filter(|r| contains_ci(Some(&r.name), query) || contains_ci(r.description.as_deref(), query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| by_name(&a.name, &b.name));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn get_region(&self, id: i64) -> StoreResult<Option<MapRegion>> {
        Ok(self.tables.read().regions.iter().find(|r| r.id == id).cloned())
    }

    async fn list_taming(&self, filter: &TamingFilter, page: PageRequest) -> StoreResult<Paged<TamingEntry>> {
        let t = self.tables.read();
        let mut rows: Vec<TamingEntry> = t
            .taming
            .iter()
            .filter(|x| filter.method.as_deref().map_or(true, |m| x.method.eq_ignore_ascii_case(m)))
            .filter_map(|x| {
                t.creatures.iter().find(|c| c.id == x.creature_id).map(|c| TamingEntry {
                    creature_name: c.name.clone(),
                    creature_slug: c.slug.clone(),
                    taming: x.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| by_name(&a.creature_name, &b.creature_name));
        Ok(page_of(rows, page))
    }

    async fn get_taming(&self, creature: &str) -> StoreResult<Option<(Creature, TamingData)>> {
        let t = self.tables.read();
        let key = creature.trim();
        let found = t
            .creatures
            .iter()
            .find(|c| c.slug == key)
            .or_else(|| t.creatures.iter().find(|c| c.name.eq_ignore_ascii_case(key)));
        let Some(c) = found else {
            return Ok(None);
        };
        Ok(t
            .taming
            .iter()
            .find(|x| x.creature_id == c.id)
            .map(|x| (c.clone(), x.clone())))
    }

    async fn table_counts(&self) -> StoreResult<TableCounts> {
        Ok(self.tables.read().counts())
    }

    async fn layer_counts(&self) -> StoreResult<Vec<MapLayerCounts>> {
        let t = self.tables.read();
        let mut counts: BTreeMap<i64, MapLayerCounts> = t
            .maps
            .iter()
            .map(|m| {
                let row = MapLayerCounts {
                    map_id: m.id,
                    ..Default::default()
                };
                (m.id, row)
            })
            .collect();
        let mut bump = |map_id: i64, f: fn(&mut MapLayerCounts)| {
            if let Some(row) = counts.get_mut(&map_id) {
                f(row);
            }
        };
        t.regions.iter().for_each(|x| bump(x.map_id, |c| c.regions += 1));
        t.caves.iter().for_each(|x| bump(x.map_id, |c| c.caves += 1));
        t.resources.iter().for_each(|x| bump(x.map_id, |c| c.resources += 1));
        t.obelisks.iter().for_each(|x| bump(x.map_id, |c| c.obelisks += 1));
        t.supply_drops.iter().for_each(|x| bump(x.map_id, |c| c.supply_drops += 1));
        t.base_spots.iter().for_each(|x| bump(x.map_id, |c| c.base_spots += 1));
        Ok(counts.into_values().collect())
    }

    async fn integrity_report(&self) -> StoreResult<IntegrityReport> {
        let t = self.tables.read();
        let without_stats = t
            .creatures
            .iter()
            .filter(|c| !t.stats.iter().any(|s| s.creature_id == c.id))
            .count() as i64;
        let without_taming = t
            .creatures
            .iter()
            .filter(|c| c.is_tameable && !t.taming.iter().any(|x| x.creature_id == c.id))
            .count() as i64;
        let without_regions = t
            .maps
            .iter()
            .filter(|m| !t.regions.iter().any(|r| r.map_id == m.id))
            .count() as i64;
        Ok(IntegrityReport::new(t.counts(), without_stats, without_taming, without_regions))
    }

    async fn system_status(&self) -> StoreResult<Vec<SystemStatus>> {
        Ok(self.tables.read().status.values().cloned().collect())
    }

    async fn recent_sync_logs(&self, limit: u32) -> StoreResult<Vec<DataSyncLog>> {
        let t = self.tables.read();
        Ok(t.sync_log.iter().rev().take(limit as usize).cloned().collect())
    }
}

// ============================================================================
// Write side
// ============================================================================

#[async_trait]
impl CatalogWriter for MemoryStore {
    async fn upsert_map(&self, map: &MapRecord) -> StoreResult<i64> {
        Ok(self.tables.write().upsert_map(map))
    }

    async fn upsert_creature(&self, creature: &CreatureRecord) -> StoreResult<i64> {
        Ok(self.tables.write().upsert_creature(creature))
    }

    async fn upsert_creature_stat(&self, creature_id: i64, stat: &StatRecord) -> StoreResult<()> {
        self.tables.write().upsert_stat(creature_id, stat);
        Ok(())
    }

    async fn upsert_taming(&self, creature_id: i64, taming: &TamingRecord) -> StoreResult<()> {
        self.tables.write().upsert_taming(creature_id, taming);
        Ok(())
    }

    async fn upsert_region(&self, map_id: i64, region: &RegionRecord) -> StoreResult<()> {
        self.tables.write().upsert_region(map_id, region);
        Ok(())
    }

    async fn upsert_cave(&self, map_id: i64, cave: &CaveRecord) -> StoreResult<()> {
        self.tables.write().upsert_cave(map_id, cave);
        Ok(())
    }

    async fn upsert_resource(&self, map_id: i64, resource: &ResourceRecord) -> StoreResult<()> {
        self.tables.write().upsert_resource(map_id, resource);
        Ok(())
    }

    async fn upsert_obelisk(&self, map_id: i64, obelisk: &ObeliskRecord) -> StoreResult<()> {
        self.tables.write().upsert_obelisk(map_id, obelisk);
        Ok(())
    }

    async fn upsert_supply_drop(&self, map_id: i64, drop: &SupplyDropRecord) -> StoreResult<()> {
        self.tables.write().upsert_supply_drop(map_id, drop);
        Ok(())
    }

    async fn upsert_base_spot(&self, map_id: i64, spot: &BaseSpotRecord) -> StoreResult<()> {
        self.tables.write().upsert_base_spot(map_id, spot);
        Ok(())
    }

    async fn map_refs(&self) -> StoreResult<Vec<MapRef>> {
        let t = self.tables.read();
        Ok(t.maps
            .iter()
            .map(|m| MapRef {
                id: m.id,
                slug: m.slug.clone(),
                name: m.name.clone(),
            })
            .collect())
    }

    async fn set_status(&self, key: &str, status: &str, message: Option<&str>) -> StoreResult<()> {
        self.tables.write().status.insert(
            key.to_string(),
            SystemStatus {
                key: key.to_string(),
                status: status.to_string(),
                message: message.map(String::from),
                updated_at: Some(Utc::now()),
            },
        );
        Ok(())
    }

    async fn log_sync(&self, entry: &SyncLogRecord) -> StoreResult<()> {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.sync_log.push(DataSyncLog {
            id,
            sync_type: entry.sync_type.clone(),
            status: entry.status.clone(),
            message: entry.message.clone(),
            records_processed: entry.records_processed,
            records_failed: entry.records_failed,
            started_at: Some(entry.started_at),
            finished_at: Some(entry.finished_at),
        });
        Ok(())
    }

    async fn log_wiki_update(&self, page_title: &str, status: &str, records: i32, message: Option<&str>) -> StoreResult<()> {
        let mut t = self.tables.write();
        let id = t.next_id();
        t.wiki_log.push(WikiUpdateLog {
            id,
            page_title: page_title.to_string(),
            status: status.to_string(),
            records,
            message: message.map(String::from),
            updated_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn reset_schema(&self) -> StoreResult<()> {
        *self.tables.write() = Tables::default();
        Ok(())
    }
}
