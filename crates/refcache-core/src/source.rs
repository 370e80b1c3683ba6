//! Remote table source
//!
//! The engine talks to the remote tabular store through the
//! [`TableSource`] trait: given a base identifier and a table identifier,
//! return the complete record set for that table, handling pagination
//! internally. [`HttpTableSource`] is the production implementation.

use crate::record::Record;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Source of complete table record sets.
///
/// Implementations raise a transport/API error on failure; the engine
/// isolates those failures per table.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch every record of `table_id` within `base_id`, in source order.
    async fn fetch_all(&self, base_id: &str, table_id: &str) -> Result<Vec<Record>>;
}

/// One page of records as returned by the remote API
#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
    /// Opaque cursor; present when more pages follow
    offset: Option<String>,
}

/// HTTP implementation of [`TableSource`].
///
/// Speaks the remote store's REST contract:
/// `GET {endpoint}/{base_id}/{table_id}[?offset=..]` with bearer-token
/// auth, response `{ "records": [..], "offset": "..." }`. Pages are
/// fetched sequentially until no offset cursor is returned.
///
/// Rate-limit responses (429) and server errors are retried with bounded
/// exponential backoff before the fetch is reported as failed.
pub struct HttpTableSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl HttpTableSource {
    /// Create a source for the given endpoint and credential
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }

    /// Override the retry budget for transient failures
    pub fn with_retries(mut self, max_attempts: u32, initial_backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.initial_backoff = initial_backoff;
        self
    }

    /// Fetch one page, retrying transient failures with backoff
    async fn fetch_page(
        &self,
        base_id: &str,
        table_id: &str,
        offset: Option<&str>,
    ) -> Result<RecordPage> {
        let url = format!("{}/{}/{}", self.endpoint, base_id, table_id);
        let mut backoff = self.initial_backoff;

        for attempt in 1..=self.max_attempts {
            let mut request = self.client.get(&url).bearer_auth(&self.api_key);
            if let Some(cursor) = offset {
                request = request.query(&[("offset", cursor)]);
            }

            let transient = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.json::<RecordPage>().await?);
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        format!("HTTP {} from {}", status, url)
                    } else {
                        // Client errors (bad credential, unknown table) won't
                        // heal on retry
                        return Err(Error::source(format!("HTTP {} from {}", status, url)));
                    }
                }
                Err(err) => format!("request to {} failed: {}", url, err),
            };

            if attempt < self.max_attempts {
                tracing::warn!(
                    attempt,
                    max_attempts = self.max_attempts,
                    "{}, retrying in {:?}",
                    transient,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            } else {
                return Err(Error::source(format!(
                    "{} (after {} attempts)",
                    transient, self.max_attempts
                )));
            }
        }

        // Loop always returns; max_attempts is clamped to >= 1
        unreachable!("retry loop exited without a result")
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch_all(&self, base_id: &str, table_id: &str) -> Result<Vec<Record>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .fetch_page(base_id, table_id, cursor.as_deref())
                .await?;
            all.extend(page.records);
            match page.offset {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(base_id, table_id, count = all.len(), "fetched table records");
        Ok(all)
    }
}
