//! Refcache Server entry point
//!
//! Wires configuration, the cache service (replication engine + refresh
//! scheduler), and the HTTP admin surface together, then serves until
//! ctrl-c.

use refcache_server::{api, config::Config, router, AppState};
use refcache_core::CacheService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "refcache_server=info,refcache_core=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    api::health::init();

    let config = Config::from_env();

    // Fails fast on a missing credential; runs the first cache
    // initialization (snapshot reuse or live fetch) before serving
    let service = Arc::new(CacheService::start(config.cache).await?);

    let state = AppState::new(Arc::clone(service.engine()));
    let app = router(state);

    let listener = TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "refcache server listening");

    let shutdown_service = Arc::clone(&service);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_service.shutdown();
        })
        .await?;

    Ok(())
}
