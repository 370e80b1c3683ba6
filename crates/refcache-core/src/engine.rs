//! Replication engine
//!
//! Maintains the two-tier (in-memory + on-disk) replica of the configured
//! bases:
//! - decides per base whether the persisted snapshot is usable or a live
//!   fetch is needed,
//! - rebuilds the in-memory table snapshots and their lookup indices,
//! - persists refreshed bases back to disk,
//! - serves all read-only queries from memory, with no network round trip.
//!
//! Failure policy: one broken table must not block reference data for
//! sibling tables in the same base. A table whose fetch fails keeps its
//! previous snapshot (stale or empty); the base's `lastFetched` still
//! advances and the partial result is persisted.

use crate::config::{BaseConfig, DELTA_DOCUMENTS, DOCUMENT_TYPES_TABLE};
use crate::record::{KeyStrategy, Record};
use crate::snapshot::{PersistedBase, SnapshotStore};
use crate::source::TableSource;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// In-memory snapshot of one table: the full ordered record list plus a
/// derived primary-key index.
///
/// The index maps each derived key to a position in `all` and is rebuilt
/// wholesale every time the table is (re)populated, so `all` and `by_id`
/// are always consistent with each other. Records whose key rule yields
/// no key are present in `all` but absent from the index. Key collisions
/// are last-write-wins in fetch order.
#[derive(Debug)]
pub struct TableSnapshot {
    all: Vec<Record>,
    by_id: HashMap<String, usize>,
}

impl TableSnapshot {
    /// An empty snapshot, used before the first successful population
    pub fn empty() -> Self {
        Self {
            all: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Build a snapshot from fetched records under the given key rule
    pub fn build(records: Vec<Record>, key: &KeyStrategy) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if let Some(key) = key.key_of(record) {
                by_id.insert(key, index);
            }
        }
        Self {
            all: records,
            by_id,
        }
    }

    /// Number of records in the table
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// O(1) lookup by derived primary key
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.by_id.get(key).map(|&index| &self.all[index])
    }

    /// The full ordered record list
    pub fn records(&self) -> &[Record] {
        &self.all
    }
}

/// In-memory state of one base
#[derive(Debug, Default)]
struct BaseState {
    /// Absent before the first successful population
    last_fetched: Option<DateTime<Utc>>,
    /// Snapshots are swapped as whole `Arc`s so readers always observe a
    /// consistent `all`/`by_id` pair
    tables: HashMap<String, Arc<TableSnapshot>>,
}

/// Cache health summary: per base, `lastFetched` and per-table record counts
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CacheStatus {
    /// Status per base name
    pub bases: BTreeMap<String, BaseStatus>,
}

/// Status of one base
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStatus {
    /// When the base was last fetched, if ever
    pub last_fetched: Option<DateTime<Utc>>,
    /// Per-table status keyed by local table name
    pub tables: BTreeMap<String, TableStatus>,
}

/// Status of one table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatus {
    /// Number of records currently cached
    pub record_count: usize,
}

/// The replication engine: orchestrates snapshot reuse vs. live fetch,
/// owns the in-memory cache, and serves all read queries.
pub struct CacheEngine {
    source: Arc<dyn TableSource>,
    store: SnapshotStore,
    bases: Vec<BaseConfig>,
    max_age: Duration,
    cache: RwLock<HashMap<String, BaseState>>,
    initialized: AtomicBool,
}

impl CacheEngine {
    /// Create an engine over the given source, store, and base configuration
    pub fn new(
        source: Arc<dyn TableSource>,
        store: SnapshotStore,
        bases: Vec<BaseConfig>,
        max_age_hours: u64,
    ) -> Self {
        Self {
            source,
            store,
            bases,
            max_age: Duration::hours(max_age_hours as i64),
            cache: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Whether initialization has completed at least once
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Initialize (or force-refresh) the cache for every configured base.
    ///
    /// Idempotent unless forced: a second call with the cache already
    /// initialized is a pure no-op. Otherwise each base is processed
    /// independently: its persisted snapshot is reused when present and
    /// fresh, and a live refresh runs on any miss (absent, corrupt, or
    /// stale file) or when `force` is set.
    ///
    /// Per-table fetch failures are absorbed (see module docs); the only
    /// error surfaced here is a failure to create the cache directory.
    ///
    /// Callers must not run concurrent forced refreshes against the same
    /// engine; the scheduler and the admin surface are the only expected
    /// producers and are serialized externally.
    pub async fn initialize(&self, force: bool) -> Result<()> {
        if self.is_initialized() && !force {
            debug!("cache already initialized");
            return Ok(());
        }

        info!(force, "initializing reference data cache");
        self.store.ensure_dir()?;

        for base in &self.bases {
            // Accessors must never observe a missing table key, even
            // before the first successful fetch
            self.ensure_base_tables(base);

            let restored = if force { false } else { self.restore_from_disk(base) };
            if !restored {
                self.refresh_base(base).await;
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
        info!("cache initialization complete");
        Ok(())
    }

    /// Make sure every configured table of `base` has at least an empty
    /// snapshot
    fn ensure_base_tables(&self, base: &BaseConfig) {
        let mut cache = self.cache.write();
        let state = cache.entry(base.name.clone()).or_default();
        for table in &base.tables {
            state
                .tables
                .entry(table.name.clone())
                .or_insert_with(|| Arc::new(TableSnapshot::empty()));
        }
    }

    /// Try to populate `base` from its persisted snapshot file.
    ///
    /// Returns false on any miss — absent, unreadable, corrupt, or stale
    /// (age strictly greater than the threshold; a snapshot exactly at the
    /// threshold is still accepted).
    fn restore_from_disk(&self, base: &BaseConfig) -> bool {
        let Some(persisted) = self.store.load(&base.base_id) else {
            return false;
        };

        let age = Utc::now().signed_duration_since(persisted.last_fetched);
        if age > self.max_age {
            info!(
                base = %base.name,
                age_hours = age.num_hours(),
                max_age_hours = self.max_age.num_hours(),
                "persisted snapshot is stale, will fetch live"
            );
            return false;
        }

        let PersistedBase {
            last_fetched,
            mut tables,
        } = persisted;

        let mut cache = self.cache.write();
        let state = cache.entry(base.name.clone()).or_default();
        for table in &base.tables {
            // Tables absent from the file keep their initialized snapshot
            if let Some(records) = tables.remove(&table.name) {
                state.tables.insert(
                    table.name.clone(),
                    Arc::new(TableSnapshot::build(records, &table.key)),
                );
            }
        }
        state.last_fetched = Some(last_fetched);

        info!(base = %base.name, "populated cache from persisted snapshot");
        true
    }

    /// Live refresh of every table in `base`, best effort.
    ///
    /// Tables are fetched sequentially to bound load on the rate-limited
    /// remote source. `lastFetched` advances and the base is persisted
    /// even when some tables failed — the goal is "best available
    /// snapshot", not all-or-nothing.
    async fn refresh_base(&self, base: &BaseConfig) {
        info!(base = %base.name, base_id = %base.base_id, "live refresh of all tables");

        for table in &base.tables {
            match self.source.fetch_all(&base.base_id, &table.table_id).await {
                Ok(records) => {
                    debug!(
                        base = %base.name,
                        table = %table.name,
                        count = records.len(),
                        "table fetched"
                    );
                    let snapshot = Arc::new(TableSnapshot::build(records, &table.key));
                    self.cache
                        .write()
                        .entry(base.name.clone())
                        .or_default()
                        .tables
                        .insert(table.name.clone(), snapshot);
                }
                Err(err) => {
                    error!(
                        base = %base.name,
                        table = %table.name,
                        %err,
                        "table fetch failed, keeping previous snapshot"
                    );
                }
            }
        }

        let now = Utc::now();
        let tables = {
            let mut cache = self.cache.write();
            let state = cache.entry(base.name.clone()).or_default();
            state.last_fetched = Some(now);

            let mut tables = BTreeMap::new();
            for table in &base.tables {
                let records = state
                    .tables
                    .get(&table.name)
                    .map(|snapshot| snapshot.records().to_vec())
                    .unwrap_or_default();
                tables.insert(table.name.clone(), records);
            }
            tables
        };

        let persisted = PersistedBase {
            last_fetched: now,
            tables,
        };
        if let Err(err) = self.store.save(&base.base_id, &persisted) {
            warn!(
                base = %base.name,
                %err,
                "failed to persist snapshot, in-memory cache remains usable"
            );
        }
    }

    /// O(1) lookup by primary key. Never raises; unknown base, table, or
    /// key all return `None`.
    pub fn record_by_id(&self, base: &str, table: &str, key: &str) -> Option<Record> {
        let cache = self.cache.read();
        cache
            .get(base)?
            .tables
            .get(table)?
            .get(key)
            .cloned()
    }

    /// All records of a table in fetch order; empty for unknown base/table
    pub fn all_records(&self, base: &str, table: &str) -> Vec<Record> {
        let cache = self.cache.read();
        cache
            .get(base)
            .and_then(|state| state.tables.get(table))
            .map(|snapshot| snapshot.records().to_vec())
            .unwrap_or_default()
    }

    /// Look up a document type by its `doc_type_id` — the classification
    /// hot path
    pub fn document_type(&self, doc_type_id: &str) -> Option<Record> {
        self.record_by_id(DELTA_DOCUMENTS, DOCUMENT_TYPES_TABLE, doc_type_id)
    }

    /// Health summary for every base currently in the cache. Pure read;
    /// triggers no fetch.
    pub fn status(&self) -> CacheStatus {
        let cache = self.cache.read();
        let bases = cache
            .iter()
            .map(|(name, state)| {
                let tables = state
                    .tables
                    .iter()
                    .map(|(table, snapshot)| {
                        (
                            table.clone(),
                            TableStatus {
                                record_count: snapshot.len(),
                            },
                        )
                    })
                    .collect();
                (
                    name.clone(),
                    BaseStatus {
                        last_fetched: state.last_fetched,
                        tables,
                    },
                )
            })
            .collect();
        CacheStatus { bases }
    }
}
