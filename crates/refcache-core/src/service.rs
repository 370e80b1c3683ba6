//! Cache service facade
//!
//! One explicitly constructed service object per process, owned by the
//! application's composition root and handed to consumers by reference —
//! no hidden global state. Construction fails fast on a missing remote
//! credential, runs the first cache initialization, and optionally starts
//! the refresh scheduler.

use crate::config::CacheConfig;
use crate::engine::CacheEngine;
use crate::scheduler::RefreshScheduler;
use crate::snapshot::SnapshotStore;
use crate::source::{HttpTableSource, TableSource};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Owns the replication engine and its refresh scheduler
pub struct CacheService {
    engine: Arc<CacheEngine>,
    scheduler: RefreshScheduler,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService").finish_non_exhaustive()
    }
}

impl CacheService {
    /// Build and initialize the service against the production HTTP source.
    ///
    /// Fails with a configuration error when no credential is available.
    pub async fn start(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(HttpTableSource::new(&config.endpoint, &config.api_key));
        Self::start_with_source(config, source).await
    }

    /// Build and initialize the service with an explicit table source.
    ///
    /// Seam for tests and alternate transports; skips the credential
    /// check, which belongs to the HTTP source.
    pub async fn start_with_source(
        config: CacheConfig,
        source: Arc<dyn TableSource>,
    ) -> Result<Self> {
        let store = SnapshotStore::new(&config.cache_dir);
        let engine = Arc::new(CacheEngine::new(
            source,
            store,
            config.bases.clone(),
            config.max_age_hours,
        ));

        engine.initialize(false).await?;

        let scheduler = RefreshScheduler::new(Arc::clone(&engine));
        if config.refresh.enabled {
            scheduler.start(&config.refresh.schedule);
        }

        info!("cache service started");
        Ok(Self { engine, scheduler })
    }

    /// The shared engine handle serving all queries
    pub fn engine(&self) -> &Arc<CacheEngine> {
        &self.engine
    }

    /// Whether the refresh scheduler is currently active
    pub fn scheduler_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop background work. Idempotent.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        info!("cache service shut down");
    }
}
