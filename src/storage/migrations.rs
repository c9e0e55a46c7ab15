//! Database schema for the ARK reference database
//!
//! `SCHEMA_SQL` is applied once when the core tables are missing.
//! `INCREMENTAL_MIGRATIONS` run on every startup; each statement is written
//! to be re-runnable and failures are tolerated (logged, not fatal).

pub const SCHEMA_VERSION: &str = "3";

/// Tables whose presence means the schema already exists
pub const CORE_TABLES: &[&str] = &["maps", "creatures", "map_regions"];

pub const SCHEMA_SQL: &str = r#"
-- ============================================================================
-- 1. Maps
-- ============================================================================

CREATE TABLE IF NOT EXISTS maps (
    id              BIGSERIAL PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    slug            VARCHAR(100) UNIQUE NOT NULL,
    is_official     BOOLEAN NOT NULL DEFAULT TRUE,
    is_expansion    BOOLEAN NOT NULL DEFAULT FALSE,
    release_date    DATE,
    size_km2        DOUBLE PRECISION,
    description     TEXT,
    created_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

-- ============================================================================
-- 2. Creatures, stats and taming data
-- ============================================================================

CREATE TABLE IF NOT EXISTS creatures (
    id              BIGSERIAL PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    slug            VARCHAR(100) UNIQUE NOT NULL,
    temperament     VARCHAR(50),
    diet            VARCHAR(50),
    is_tameable     BOOLEAN NOT NULL DEFAULT FALSE,
    is_rideable     BOOLEAN NOT NULL DEFAULT FALSE,
    is_breedable    BOOLEAN NOT NULL DEFAULT FALSE,
    base_health     DOUBLE PRECISION,
    base_stamina    DOUBLE PRECISION,
    base_food       DOUBLE PRECISION,
    base_weight     DOUBLE PRECISION,
    base_damage     DOUBLE PRECISION,
    base_speed      DOUBLE PRECISION,
    wiki_url        TEXT,
    dododex_id      VARCHAR(100),
    created_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_creatures_tameable ON creatures(is_tameable);

CREATE TABLE IF NOT EXISTS creature_stats (
    id              BIGSERIAL PRIMARY KEY,
    creature_id     BIGINT NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
    stat_name       VARCHAR(50) NOT NULL,
    base_value      DOUBLE PRECISION NOT NULL,
    wild_per_level  DOUBLE PRECISION,
    tamed_per_level DOUBLE PRECISION,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (creature_id, stat_name)
);

CREATE TABLE IF NOT EXISTS taming_data (
    id                    BIGSERIAL PRIMARY KEY,
    creature_id           BIGINT UNIQUE NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
    method                VARCHAR(30) NOT NULL DEFAULT 'knockout',
    preferred_foods       JSONB NOT NULL DEFAULT '[]',
    kibble_type           VARCHAR(50),
    base_food_quantity    INTEGER NOT NULL DEFAULT 0,
    base_taming_time      DOUBLE PRECISION NOT NULL DEFAULT 0,
    torpor_depletion_rate DOUBLE PRECISION,
    base_torpor           DOUBLE PRECISION,
    feeding_interval      DOUBLE PRECISION,
    updated_at            TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

-- ============================================================================
-- 3. Per-map points of interest
-- ============================================================================

CREATE TABLE IF NOT EXISTS map_regions (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    name            VARCHAR(150) NOT NULL,
    category        VARCHAR(30) NOT NULL DEFAULT 'other',
    description     TEXT,
    image_url       TEXT,
    wiki_url        TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, name)
);

CREATE INDEX IF NOT EXISTS idx_regions_map ON map_regions(map_id);

CREATE TABLE IF NOT EXISTS caves (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    name            VARCHAR(150) NOT NULL,
    difficulty      VARCHAR(20),
    artifact        VARCHAR(100),
    description     TEXT,
    latitude        DOUBLE PRECISION,
    longitude       DOUBLE PRECISION,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, name)
);

CREATE TABLE IF NOT EXISTS resources (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    name            VARCHAR(100) NOT NULL,
    resource_type   VARCHAR(30) NOT NULL,
    abundance       VARCHAR(20),
    description     TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, name)
);

CREATE TABLE IF NOT EXISTS obelisks (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    color           VARCHAR(20) NOT NULL,
    latitude        DOUBLE PRECISION,
    longitude       DOUBLE PRECISION,
    description     TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, color)
);

CREATE TABLE IF NOT EXISTS supply_drops (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    tier            VARCHAR(20) NOT NULL,
    min_level       INTEGER NOT NULL DEFAULT 0,
    quality         VARCHAR(30),
    description     TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, tier)
);

CREATE TABLE IF NOT EXISTS base_spots (
    id              BIGSERIAL PRIMARY KEY,
    map_id          BIGINT NOT NULL REFERENCES maps(id) ON DELETE CASCADE,
    name            VARCHAR(150) NOT NULL,
    difficulty      VARCHAR(20),
    description     TEXT,
    latitude        DOUBLE PRECISION,
    longitude       DOUBLE PRECISION,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW(),

    UNIQUE (map_id, name)
);

-- ============================================================================
-- 4. Bookkeeping
-- ============================================================================

CREATE TABLE IF NOT EXISTS system_status (
    key             VARCHAR(50) PRIMARY KEY,
    status          VARCHAR(30) NOT NULL,
    message         TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS data_sync_log (
    id                BIGSERIAL PRIMARY KEY,
    sync_type         VARCHAR(50) NOT NULL,
    status            VARCHAR(20) NOT NULL,
    message           TEXT,
    records_processed INTEGER NOT NULL DEFAULT 0,
    records_failed    INTEGER NOT NULL DEFAULT 0,
    started_at        TIMESTAMP WITH TIME ZONE,
    finished_at       TIMESTAMP WITH TIME ZONE
);

CREATE TABLE IF NOT EXISTS wiki_update_log (
    id              BIGSERIAL PRIMARY KEY,
    page_title      VARCHAR(200) NOT NULL,
    status          VARCHAR(20) NOT NULL,
    records         INTEGER NOT NULL DEFAULT 0,
    message         TEXT,
    updated_at      TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);
"#;

/// Applied on every startup, in order
pub const INCREMENTAL_MIGRATIONS: &[(&str, &str)] = &[
    // No-op on fresh schemas; backfills databases created before `diet`
    (
        "002_creature_diet",
        "ALTER TABLE creatures ADD COLUMN IF NOT EXISTS diet VARCHAR(50)",
    ),
    (
        "003_search_indexes",
        r#"
CREATE INDEX IF NOT EXISTS idx_creatures_name_lower ON creatures (LOWER(name));
CREATE INDEX IF NOT EXISTS idx_maps_name_lower ON maps (LOWER(name));
CREATE INDEX IF NOT EXISTS idx_regions_name_lower ON map_regions (LOWER(name));
CREATE INDEX IF NOT EXISTS idx_creatures_name_fts ON creatures USING GIN (to_tsvector('simple', name));
"#,
    ),
];

/// Tables in dependency order (children first), for resets
pub const ALL_TABLES: &[&str] = &[
    "wiki_update_log",
    "data_sync_log",
    "system_status",
    "base_spots",
    "supply_drops",
    "obelisks",
    "resources",
    "caves",
    "map_regions",
    "taming_data",
    "creature_stats",
    "creatures",
    "maps",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_every_table() {
        for table in ALL_TABLES {
            let needle = format!("CREATE TABLE IF NOT EXISTS {} (", table);
            assert!(SCHEMA_SQL.contains(&needle), "missing table {}", table);
        }
    }

    #[test]
    fn test_schema_has_every_creature_column() {
        let start = SCHEMA_SQL.find("CREATE TABLE IF NOT EXISTS creatures (").unwrap();
        let end = start + SCHEMA_SQL[start..].find(");").unwrap();
        let table = &SCHEMA_SQL[start..end];
        for column in crate::storage::postgres::CREATURE_COLUMNS.split(',').map(str::trim) {
            assert!(table.contains(&format!("\n    {} ", column)), "creatures lacks {}", column);
        }
    }

    #[test]
    fn test_core_tables_are_known() {
        assert!(CORE_TABLES.iter().all(|t| ALL_TABLES.contains(t)));
    }
}
