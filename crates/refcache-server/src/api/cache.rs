//! Cache administration endpoints
//!
//! - GET /cache/status - freshness and record counts per base/table
//! - GET /cache/records?base=..&table=..&offset=.. - paged table slice
//! - POST /cache/refresh - force a live refresh

use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use refcache_core::{CacheStatus, Record};
use serde::{Deserialize, Serialize};

/// Display cap for one page of records
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for the records endpoint
#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    /// Base name
    pub base: String,
    /// Table name
    pub table: String,
    /// Zero-based record offset for paging
    #[serde(default)]
    pub offset: usize,
}

/// One page of a cached table
#[derive(Debug, Serialize)]
pub struct RecordsPageResponse {
    /// Base name
    pub base: String,
    /// Table name
    pub table: String,
    /// Total number of cached records in the table
    pub total: usize,
    /// Offset of the first record in this page
    pub offset: usize,
    /// At most [`MAX_PAGE_SIZE`] records
    pub records: Vec<Record>,
}

/// Result of a forced refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Whether the refresh completed
    pub refreshed: bool,
    /// Cache status after the refresh
    pub status: CacheStatus,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Get cache status for all bases
pub async fn status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.engine.status())
}

/// Get a paged slice of a cached table.
///
/// Unknown base/table names yield an empty page, never an error —
/// mirroring the engine's query contract.
pub async fn records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Json<RecordsPageResponse> {
    let all = state.engine.all_records(&query.base, &query.table);
    let total = all.len();
    let offset = query.offset.min(total);
    let end = offset.saturating_add(MAX_PAGE_SIZE).min(total);

    Json(RecordsPageResponse {
        base: query.base,
        table: query.table,
        total,
        offset,
        records: all[offset..end].to_vec(),
    })
}

/// Force a live refresh and re-persist.
///
/// This is the one path where a refresh failure surfaces to the caller;
/// steady-state degradation is otherwise absorbed by the engine.
pub async fn refresh(State(state): State<AppState>) -> Response {
    match state.engine.initialize(true).await {
        Ok(()) => Json(RefreshResponse {
            refreshed: true,
            status: state.engine.status(),
        })
        .into_response(),
        Err(err) => {
            tracing::error!(%err, "forced cache refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use refcache_core::{
        BaseConfig, CacheEngine, Record as CoreRecord, Result, SnapshotStore, TableConfig,
        TableSource,
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    struct StubSource {
        count: usize,
    }

    #[async_trait]
    impl TableSource for StubSource {
        async fn fetch_all(&self, _base_id: &str, _table_id: &str) -> Result<Vec<CoreRecord>> {
            Ok((0..self.count)
                .map(|i| CoreRecord::new(format!("rec{}", i)))
                .collect())
        }
    }

    async fn state_with_records(dir: &TempDir, count: usize) -> AppState {
        let engine = Arc::new(CacheEngine::new(
            Arc::new(StubSource { count }),
            SnapshotStore::new(dir.path()),
            vec![BaseConfig::new(
                "deltaDocuments",
                "appDelta",
                vec![TableConfig::new("tblDoc", "documentTypes")],
            )],
            25,
        ));
        engine.initialize(false).await.unwrap();
        AppState::new(engine)
    }

    async fn get_json(state: AppState, uri: &str) -> serde_json::Value {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let dir = TempDir::new().unwrap();
        let state = state_with_records(&dir, 3).await;
        let json = get_json(state, "/cache/status").await;
        assert_eq!(
            json["deltaDocuments"]["tables"]["documentTypes"]["recordCount"],
            3
        );
    }

    #[tokio::test]
    async fn test_records_page_is_capped_at_100() {
        let dir = TempDir::new().unwrap();
        let state = state_with_records(&dir, 250).await;
        let json = get_json(
            state,
            "/cache/records?base=deltaDocuments&table=documentTypes",
        )
        .await;
        assert_eq!(json["total"], 250);
        assert_eq!(json["records"].as_array().unwrap().len(), MAX_PAGE_SIZE);
        assert_eq!(json["records"][0]["id"], "rec0");
    }

    #[tokio::test]
    async fn test_records_paging_offset() {
        let dir = TempDir::new().unwrap();
        let state = state_with_records(&dir, 250).await;
        let json = get_json(
            state,
            "/cache/records?base=deltaDocuments&table=documentTypes&offset=200",
        )
        .await;
        assert_eq!(json["offset"], 200);
        assert_eq!(json["records"].as_array().unwrap().len(), 50);
        assert_eq!(json["records"][0]["id"], "rec200");
    }

    #[tokio::test]
    async fn test_records_unknown_table_is_empty_page() {
        let dir = TempDir::new().unwrap();
        let state = state_with_records(&dir, 3).await;
        let json = get_json(state, "/cache/records?base=nope&table=nothing").await;
        assert_eq!(json["total"], 0);
        assert!(json["records"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_endpoint() {
        let dir = TempDir::new().unwrap();
        let state = state_with_records(&dir, 2).await;
        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["refreshed"], true);
        assert_eq!(
            json["status"]["deltaDocuments"]["tables"]["documentTypes"]["recordCount"],
            2
        );
    }
}
