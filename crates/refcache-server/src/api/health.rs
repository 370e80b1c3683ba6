//! Health check endpoint

use axum::Json;
use serde::Serialize;
use std::time::Instant;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: &'static str,
    /// Timestamp of the health check
    pub timestamp: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}

/// Application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the health check system
pub fn init() {
    let _ = START_TIME.set(Instant::now());
}

/// Get health status
pub async fn health_check() -> Json<HealthResponse> {
    let start_time = START_TIME.get().copied().unwrap_or_else(Instant::now);

    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
