//! Database Initializer
//!
//! Linear startup sequence for the PostgreSQL backend:
//!
//! ```text
//! connect (create database on 3D000)
//!   → [drop schema if requested]
//!   → create schema (skipped when core tables exist)
//!   → incremental migrations (failures tolerated)
//!   → schema_version row
//!   → check existing data
//!   → refresh search indexes
//! ```
//!
//! Whether to enqueue a population run is left to the caller, which owns
//! the job queue.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{info, warn};

use super::postgres::PostgresStore;
use super::repository::{CatalogReader, CatalogWriter, StoreError};
use crate::models::TableCounts;

/// Postgres SQLSTATE for "database does not exist"
const INVALID_CATALOG_NAME: &str = "3D000";

/// Result of a successful initialization
pub struct InitOutcome {
    pub store: PostgresStore,
    pub schema_created: bool,
    pub migrations_applied: usize,
    /// True when maps, creatures and regions all hold rows
    pub has_data: bool,
}

pub struct DatabaseInitializer {
    database_url: String,
    max_connections: u32,
    drop_existing: bool,
}

impl DatabaseInitializer {
    pub fn new(database_url: impl Into<String>, max_connections: u32, drop_existing: bool) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections,
            drop_existing,
        }
    }

    pub async fn run(&self) -> Result<InitOutcome, StoreError> {
        let store = self.connect().await?;

        if self.drop_existing {
            warn!("DROP_EXISTING_DB set, dropping existing schema");
            store.drop_schema().await?;
        }

        let schema_created = store.create_schema().await?;
        let migrations_applied = store.apply_migrations().await;
        store.write_schema_version().await?;

        let counts = store.table_counts().await?;
        let has_data = is_populated(&counts);
        info!(
            "Database ready (schema_created={}, migrations={}, maps={}, creatures={}, regions={})",
            schema_created, migrations_applied, counts.maps, counts.creatures, counts.map_regions
        );

        if let Err(e) = store.refresh_search_indexes().await {
            warn!("Search index refresh failed: {}", e);
        }

        Ok(InitOutcome {
            store,
            schema_created,
            migrations_applied,
            has_data,
        })
    }

    async fn connect(&self) -> Result<PostgresStore, StoreError> {
        match PostgresStore::connect(&self.database_url, self.max_connections).await {
            Ok(store) => Ok(store),
            Err(StoreError::Sqlx(ref e)) if is_missing_database(e) => {
                info!("Database does not exist, creating it");
                create_database(&self.database_url).await?;
                PostgresStore::connect(&self.database_url, self.max_connections).await
            }
            Err(e) => Err(e),
        }
    }
}

/// The catalog counts as populated only when every core table has rows
pub fn is_populated(counts: &TableCounts) -> bool {
    counts.maps > 0 && counts.creatures > 0 && counts.map_regions > 0
}

fn is_missing_database(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(INVALID_CATALOG_NAME),
        _ => false,
    }
}

/// Connect to the maintenance database and issue `CREATE DATABASE`
async fn create_database(database_url: &str) -> Result<(), StoreError> {
    let options = PgConnectOptions::from_str(database_url)?;
    let name = options
        .get_database()
        .ok_or_else(|| StoreError::Migration("DATABASE_URL has no database name".into()))?
        .to_string();

    let mut conn = PgConnection::connect_with(&options.database("postgres")).await?;
    let sql = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));
    sqlx::query(&sql).execute(&mut conn).await?;
    conn.close().await?;

    info!("Created database {}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populated_requires_all_core_tables() {
        let mut counts = TableCounts {
            maps: 12,
            creatures: 100,
            ..Default::default()
        };
        assert!(!is_populated(&counts));
        counts.map_regions = 40;
        assert!(is_populated(&counts));
        counts.creatures = 0;
        assert!(!is_populated(&counts));
    }

    #[test]
    fn test_non_database_error_is_not_missing_database() {
        assert!(!is_missing_database(&sqlx::Error::PoolTimedOut));
    }
}
