//! Data Population Service
//!
//! Fills the reference tables from static literals and the scrapers. Every
//! write is an upsert, so any step can be re-run. Failures come in two
//! kinds:
//!
//! - **Per-row**: one creature page or one map page fails. Logged, counted
//!   in the step outcome, and the step moves on.
//! - **Outer**: the creature index cannot be fetched or the store rejects a
//!   bookkeeping query. The run aborts with a `PopulationError`.
//!
//! ```text
//! populate_all
//!   maps → creatures (+stats, +taming) → regions → caves
//!   → resources → obelisks → supply drops → base spots
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::jobs::{JobFuture, JobKind, JobRunner};
use crate::models::{MapRef, SyncLogRecord};
use crate::reference;
use crate::scraper::{ScrapeError, TamingSiteScraper, WikiScraper};
use crate::storage::{Catalog, CatalogWriter, StoreError};

pub const POPULATION_STATUS_KEY: &str = "data_population";

#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

#[derive(Debug, Clone)]
pub struct PopulationConfig {
    /// Max creatures taken from the index
    pub creature_limit: usize,
    /// Pause between creature pages
    pub creature_delay: Duration,
    /// Pause between map pages
    pub map_delay: Duration,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            creature_limit: 150,
            creature_delay: Duration::from_millis(200),
            map_delay: Duration::from_millis(1000),
        }
    }
}

/// Rows written and rows lost by one step
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: String,
    pub processed: u32,
    pub failed: u32,
}

impl StepOutcome {
    fn new(step: &str) -> Self {
        Self {
            step: step.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationReport {
    pub sync_type: String,
    pub steps: Vec<StepOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PopulationReport {
    pub fn processed(&self) -> u32 {
        self.steps.iter().map(|s| s.processed).sum()
    }

    pub fn failed(&self) -> u32 {
        self.steps.iter().map(|s| s.failed).sum()
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == name)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub struct DataPopulationService {
    store: Arc<dyn Catalog>,
    wiki: WikiScraper,
    taming: TamingSiteScraper,
    config: PopulationConfig,
}

impl DataPopulationService {
    pub fn new(store: Arc<dyn Catalog>, wiki: WikiScraper, taming: TamingSiteScraper, config: PopulationConfig) -> Self {
        Self {
            store,
            wiki,
            taming,
            config,
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    /// Seed the 12 maps from literals
    pub async fn populate_maps(&self) -> Result<StepOutcome, PopulationError> {
        let mut outcome = StepOutcome::new("maps");
        for map in reference::official_maps() {
            match self.store.upsert_map(&map).await {
                Ok(_) => outcome.processed += 1,
                Err(e) => {
                    warn!("Failed to upsert map {}: {}", map.slug, e);
                    outcome.failed += 1;
                }
            }
        }
        info!("Maps populated: {} ok, {} failed", outcome.processed, outcome.failed);
        Ok(outcome)
    }

    /// Scrape the creature index, then each creature page and its taming page
    pub async fn populate_creatures(&self) -> Result<StepOutcome, PopulationError> {
        let mut outcome = StepOutcome::new("creatures");
        let links = self.wiki.creature_index(self.config.creature_limit).await?;
        self.note_wiki_page("Creatures", "success", links.len(), None).await;
        info!("Populating {} creatures", links.len());

        for (i, link) in links.iter().enumerate() {
            if i > 0 {
                pause(self.config.creature_delay).await;
            }

            let scraped = match self.wiki.creature(link).await {
                Ok(scraped) => scraped,
                Err(e) => {
                    warn!("Creature {} skipped: {}", link.slug, e);
                    outcome.failed += 1;
                    continue;
                }
            };

            let creature_id = match self.store.upsert_creature(&scraped.creature).await {
                Ok(id) => id,
                Err(e) => {
                    warn!("Failed to upsert creature {}: {}", link.slug, e);
                    outcome.failed += 1;
                    continue;
                }
            };

            for stat in &scraped.stats {
                if let Err(e) = self.store.upsert_creature_stat(creature_id, stat).await {
                    warn!("Failed to upsert {} stat {}: {}", link.slug, stat.stat_name, e);
                }
            }

            if scraped.creature.is_tameable {
                match self.taming.taming(&link.slug).await {
                    Ok(taming) => {
                        if let Err(e) = self.store.upsert_taming(creature_id, &taming).await {
                            warn!("Failed to upsert taming for {}: {}", link.slug, e);
                        }
                    }
                    Err(e) => debug!("No taming data for {}: {}", link.slug, e),
                }
            }

            outcome.processed += 1;
        }

        info!("Creatures populated: {} ok, {} failed", outcome.processed, outcome.failed);
        Ok(outcome)
    }

    pub async fn populate_regions(&self) -> Result<StepOutcome, PopulationError> {
        let mut outcome = StepOutcome::new("regions");
        let maps = self.store.map_refs().await?;

        for (i, map) in maps.iter().enumerate() {
            if i > 0 {
                pause(self.config.map_delay).await;
            }
            let page = reference::wiki_page_for(&map.name);
            match self.wiki.map_regions(map).await {
                Ok(regions) => {
                    let mut written = 0;
                    for region in &regions {
                        match self.store.upsert_region(map.id, region).await {
                            Ok(()) => written += 1,
                            Err(e) => {
                                warn!("Failed to upsert region {} on {}: {}", region.name, map.slug, e);
                                outcome.failed += 1;
                            }
                        }
                    }
                    outcome.processed += written;
                    self.note_wiki_page(&page, "success", written as usize, None).await;
                }
                Err(e) => {
                    warn!("Regions for {} skipped: {}", map.slug, e);
                    outcome.failed += 1;
                    self.note_wiki_page(&page, "error", 0, Some(&e.to_string())).await;
                }
            }
        }

        info!("Regions populated: {} ok, {} failed", outcome.processed, outcome.failed);
        Ok(outcome)
    }

    pub async fn populate_caves(&self) -> Result<StepOutcome, PopulationError> {
        let mut outcome = StepOutcome::new("caves");
        let maps = self.store.map_refs().await?;

        for (i, map) in maps.iter().enumerate() {
            if i > 0 {
                pause(self.config.map_delay).await;
            }
            match self.wiki.map_caves(map).await {
                Ok(caves) => {
                    for cave in &caves {
                        match self.store.upsert_cave(map.id, cave).await {
                            Ok(()) => outcome.processed += 1,
                            Err(e) => {
                                warn!("Failed to upsert cave {} on {}: {}", cave.name, map.slug, e);
                                outcome.failed += 1;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Caves for {} skipped: {}", map.slug, e);
                    outcome.failed += 1;
                }
            }
        }

        info!("Caves populated: {} ok, {} failed", outcome.processed, outcome.failed);
        Ok(outcome)
    }

    pub async fn populate_resources(&self) -> Result<StepOutcome, PopulationError> {
        self.per_map_placeholders("resources", |store, map| async move {
            let mut n = (0, 0);
            for r in reference::resources_for(&map.slug) {
                let result = store.upsert_resource(map.id, &r).await;
                tally(&mut n, result, &map, &r.name);
            }
            n
        })
        .await
    }

    pub async fn populate_obelisks(&self) -> Result<StepOutcome, PopulationError> {
        self.per_map_placeholders("obelisks", |store, map| async move {
            let mut n = (0, 0);
            for o in reference::obelisks_for(&map.slug) {
                let result = store.upsert_obelisk(map.id, &o).await;
                tally(&mut n, result, &map, &o.color);
            }
            n
        })
        .await
    }

    pub async fn populate_supply_drops(&self) -> Result<StepOutcome, PopulationError> {
        self.per_map_placeholders("supply_drops", |store, map| async move {
            let mut n = (0, 0);
            for d in reference::supply_drops_for(&map.slug) {
                let result = store.upsert_supply_drop(map.id, &d).await;
                tally(&mut n, result, &map, &d.tier);
            }
            n
        })
        .await
    }

    pub async fn populate_base_spots(&self) -> Result<StepOutcome, PopulationError> {
        self.per_map_placeholders("base_spots", |store, map| async move {
            let mut n = (0, 0);
            for s in reference::base_spots_for(&map.slug) {
                let result = store.upsert_base_spot(map.id, &s).await;
                tally(&mut n, result, &map, &s.name);
            }
            n
        })
        .await
    }

    async fn per_map_placeholders<F, Fut>(&self, step: &str, write: F) -> Result<StepOutcome, PopulationError>
    where
        F: Fn(Arc<dyn Catalog>, MapRef) -> Fut,
        Fut: std::future::Future<Output = (u32, u32)>,
    {
        let mut outcome = StepOutcome::new(step);
        for map in self.store.map_refs().await? {
            let (ok, failed) = write(self.store.clone(), map).await;
            outcome.processed += ok;
            outcome.failed += failed;
        }
        debug!("{} populated: {} ok, {} failed", step, outcome.processed, outcome.failed);
        Ok(outcome)
    }

    // ========================================================================
    // Runs
    // ========================================================================

    /// Every step in order, bracketed by status and sync-log bookkeeping
    pub async fn populate_all(&self) -> Result<PopulationReport, PopulationError> {
        let started_at = Utc::now();
        self.set_status("running", Some("Data population in progress")).await?;
        info!("Starting full data population");

        let result = self.run_all_steps().await;
        self.finish("full_population", started_at, result).await
    }

    async fn run_all_steps(&self) -> Result<Vec<StepOutcome>, PopulationError> {
        let steps = vec![
            self.populate_maps().await?,
            self.populate_creatures().await?,
            self.populate_regions().await?,
            self.populate_caves().await?,
            self.populate_resources().await?,
            self.populate_obelisks().await?,
            self.populate_supply_drops().await?,
            self.populate_base_spots().await?,
        ];
        self.store.refresh_search_indexes().await?;
        Ok(steps)
    }

    /// Re-scrape creatures and regions only
    pub async fn sync_data(&self) -> Result<PopulationReport, PopulationError> {
        let started_at = Utc::now();
        self.set_status("running", Some("Data sync in progress")).await?;
        info!("Starting data sync");

        let result = self.run_sync_steps().await;
        self.finish("sync", started_at, result).await
    }

    async fn run_sync_steps(&self) -> Result<Vec<StepOutcome>, PopulationError> {
        Ok(vec![self.populate_creatures().await?, self.populate_regions().await?])
    }

    /// Drop and recreate the schema, then populate from scratch
    pub async fn reset_database(&self) -> Result<PopulationReport, PopulationError> {
        warn!("Resetting database");
        let started_at = Utc::now();
        if let Err(e) = self.store.reset_schema().await {
            return self.finish("reset", started_at, Err(e.into())).await;
        }
        self.populate_all().await
    }

    async fn finish(
        &self,
        sync_type: &str,
        started_at: DateTime<Utc>,
        result: Result<Vec<StepOutcome>, PopulationError>,
    ) -> Result<PopulationReport, PopulationError> {
        let finished_at = Utc::now();
        match result {
            Ok(steps) => {
                let report = PopulationReport {
                    sync_type: sync_type.to_string(),
                    steps,
                    started_at,
                    finished_at,
                };
                let message = format!("{} records processed, {} failed", report.processed(), report.failed());
                self.log_sync(sync_type, "completed", &message, &report, started_at, finished_at).await;
                self.set_status("completed", Some(&message)).await?;
                info!("{} finished: {}", sync_type, message);
                Ok(report)
            }
            Err(e) => {
                error!("{} aborted: {}", sync_type, e);
                let message = e.to_string();
                let empty = PopulationReport {
                    sync_type: sync_type.to_string(),
                    steps: Vec::new(),
                    started_at,
                    finished_at,
                };
                self.log_sync(sync_type, "error", &message, &empty, started_at, finished_at).await;
                if let Err(status_err) = self.set_status("error", Some(&message)).await {
                    warn!("Could not record population error: {}", status_err);
                }
                Err(e)
            }
        }
    }

    /// Job runner dispatching each job kind to its run
    pub fn job_runner(self: Arc<Self>) -> JobRunner {
        Arc::new(move |kind| -> JobFuture {
            let service = self.clone();
            Box::pin(async move {
                let report = match kind {
                    JobKind::PopulateAll => service.populate_all().await?,
                    JobKind::SyncData => service.sync_data().await?,
                    JobKind::ResetDatabase => service.reset_database().await?,
                };
                Ok::<_, anyhow::Error>(serde_json::to_value(report)?)
            })
        })
    }

    // ========================================================================
    // Bookkeeping
    // ========================================================================

    async fn set_status(&self, status: &str, message: Option<&str>) -> Result<(), PopulationError> {
        self.store.set_status(POPULATION_STATUS_KEY, status, message).await?;
        Ok(())
    }

    async fn log_sync(
        &self,
        sync_type: &str,
        status: &str,
        message: &str,
        report: &PopulationReport,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) {
        let entry = SyncLogRecord {
            sync_type: sync_type.to_string(),
            status: status.to_string(),
            message: Some(message.to_string()),
            records_processed: report.processed() as i32,
            records_failed: report.failed() as i32,
            started_at,
            finished_at,
        };
        if let Err(e) = self.store.log_sync(&entry).await {
            warn!("Failed to write sync log: {}", e);
        }
    }

    async fn note_wiki_page(&self, page: &str, status: &str, records: usize, message: Option<&str>) {
        if let Err(e) = self.store.log_wiki_update(page, status, records as i32, message).await {
            warn!("Failed to write wiki update log for {}: {}", page, e);
        }
    }
}

/// Count one placeholder write into (ok, failed)
fn tally(n: &mut (u32, u32), result: Result<(), StoreError>, map: &MapRef, what: &str) {
    match result {
        Ok(()) => n.0 += 1,
        Err(e) => {
            warn!("Failed to upsert {} on {}: {}", what, map.slug, e);
            n.1 += 1;
        }
    }
}
