use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use ark_db_server::{
    api, jobs::JobQueue, logging, population::DataPopulationService, rate_limit::RateLimiter, scraper,
    storage::{self, Catalog, CatalogReader, DatabaseInitializer, MemoryStore},
    Config, JobKind,
};

/// Pending jobs beyond the running one
const JOB_QUEUE_CAPACITY: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let _log_guard = logging::init_logging(&config.log_level, config.is_production(), config.log_file.as_deref())?;

    info!("Starting ARK database server v{} ({})", env!("CARGO_PKG_VERSION"), config.environment);

    if let Err(e) = run(config).await {
        error!("Server failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    // ========================================================================
    // 1. Storage: PostgreSQL through the initializer, or the mock store
    // ========================================================================
    let mut pg: Option<Arc<storage::PostgresStore>> = None;
    let mut has_data = true;

    let catalog: Arc<dyn Catalog> = if config.skip_database {
        warn!("SKIP_DATABASE set, serving mock data");
        Arc::new(MemoryStore::with_mock_data())
    } else {
        let url = config.resolved_database_url();
        info!("Connecting to PostgreSQL at {}:{}/{}", config.db_host, config.db_port, config.db_name);
        let outcome = DatabaseInitializer::new(url, config.db_max_connections, config.drop_existing_db)
            .run()
            .await
            .context("Database initialization failed")?;
        has_data = outcome.has_data;
        let store = Arc::new(outcome.store);
        pg = Some(store.clone());
        store
    };

    // ========================================================================
    // 2. Background jobs (database mode only)
    // ========================================================================
    let jobs = if catalog.is_mock() {
        None
    } else {
        let (wiki, taming) = scraper::http_scrapers(&config.wiki_base_url, &config.dododex_base_url, config.scrape_timeout())
            .context("Failed to build HTTP scrapers")?;
        let service = Arc::new(DataPopulationService::new(catalog.clone(), wiki, taming, config.population_config()));
        let queue = JobQueue::start(service.job_runner(), JOB_QUEUE_CAPACITY);

        if !has_data && !config.skip_data_sync {
            info!("Database is empty, queueing initial population");
            queue.submit(JobKind::PopulateAll).context("Failed to queue initial population")?;
        } else if !has_data {
            warn!("Database is empty and SKIP_DATA_SYNC is set; run POST /api/admin/populate-data");
        }
        Some(queue)
    };

    // ========================================================================
    // 3. HTTP API
    // ========================================================================
    let state = api::ApiState::new(catalog, jobs)
        .with_rate_limiter(RateLimiter::new(config.rate_limit_window(), config.rate_limit_max_requests))
        .with_environment(config.environment.clone())
        .with_cors_origin(config.cors_origin.clone());
    let router = api::with_static_files(api::build_router(state), &config.static_dir);

    api::serve(router, config.port, shutdown_signal()).await.context("API server error")?;

    if let Some(pg) = pg {
        pg.close().await;
    }
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
