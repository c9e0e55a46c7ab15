//! Storage Layer - data access for the ARK reference catalog
//!
//! Implements the Repository pattern over two backends:
//! - **PostgreSQL**: the real catalog, written by the population pipeline
//! - **Memory**: mock dataset served when `SKIP_DATABASE` is set
//!
//! ## Architecture
//! ```text
//! [API handlers]        [Population pipeline]
//!       ↓                        ↓
//! [CatalogReader]          [CatalogWriter]
//!       ↓                        ↓
//! ┌────────────────┬─────────────────┐
//! │ PostgresStore  │ MemoryStore     │
//! │ (sqlx pool)    │ (mock fallback) │
//! └────────────────┴─────────────────┘
//! ```

pub mod init;
pub mod memory;
pub mod migrations;
pub mod mock_data;
pub mod postgres;
pub mod repository;

pub use init::{DatabaseInitializer, InitOutcome};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use repository::{Catalog, CatalogReader, CatalogWriter, StoreError, StoreResult};
