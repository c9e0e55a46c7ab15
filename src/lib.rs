//! ARK Database Server Library
//!
//! Core modules for the ARK: Survival Ascended reference database:
//! - PostgreSQL catalog with an in-memory mock fallback
//! - Wiki and taming-site scrapers feeding an idempotent population pipeline
//! - Background job queue for population runs
//! - Taming calculator
//! - HTTP/JSON API with metrics and rate limiting

pub mod api;  // HTTP/JSON API endpoints
pub mod config;  // CLI flags + environment
pub mod error;  // API error envelope
pub mod jobs;  // Background job queue
pub mod logging;  // tracing subscriber setup
pub mod metrics;  // Server metrics (Prometheus + JSON export)
pub mod models;  // Table rows and write records
pub mod pagination;
pub mod population;  // Data population service
pub mod rate_limit;
pub mod reference;  // Static reference data (maps, placeholders)
pub mod scraper;  // Wiki + taming site scrapers
pub mod storage;  // Catalog traits, PostgreSQL, mock store
pub mod taming;  // Taming calculator

// Re-export commonly used types
pub use api::{build_router, ApiState};
pub use config::Config;
pub use jobs::{JobKind, JobQueue, JobStatus};
pub use population::{DataPopulationService, PopulationConfig};
pub use storage::{Catalog, MemoryStore, PostgresStore};
