//! Refcache Server - HTTP admin surface for the reference-data cache
//!
//! Provides REST endpoints, all served through the cache engine's
//! read-only facade plus the one admin action that forces a refresh:
//! - GET /health - liveness, uptime, version
//! - GET /cache/status - per-base freshness and record counts
//! - GET /cache/records - paged slice of one table (display cap 100)
//! - POST /cache/refresh - force a live refresh and re-persist

use axum::routing::{get, post};
use axum::Router;
use refcache_core::CacheEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// The replication engine serving all cache queries
    pub engine: Arc<CacheEngine>,
}

impl AppState {
    /// Create server state around an engine handle
    pub fn new(engine: Arc<CacheEngine>) -> Self {
        Self { engine }
    }
}

/// Build the admin router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/cache/status", get(api::cache::status))
        .route("/cache/records", get(api::cache::records))
        .route("/cache/refresh", post(api::cache::refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
