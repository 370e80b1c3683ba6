//! Refcache Core - Reference Data Replication Engine
//!
//! Maintains a local, queryable replica of a small number of tables
//! living in a remote, rate-limited tabular store, so that lookups by
//! primary key cost no network round trip:
//! - two-tier representation: in-memory table snapshots with derived
//!   lookup indices, backed by one JSON snapshot file per base
//! - snapshot-vs-live policy: a persisted snapshot is reused when present
//!   and younger than the staleness threshold; anything else (absent,
//!   corrupt, stale, or a forced refresh) triggers a live fetch
//! - partial-failure tolerance: a table whose fetch fails keeps its
//!   previous snapshot while sibling tables refresh normally
//! - a daily scheduler that forces a live refresh and re-persist
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Query Facade (CacheService)        │
//! │   record_by_id / all_records / status       │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴──────────────────────────────┐
//! │        Replication Engine (CacheEngine)     │
//! │  snapshot-vs-live policy, index rebuilds    │
//! └───────┬───────────────────────────┬─────────┘
//!         │                           │
//! ┌───────┴────────────┐   ┌──────────┴─────────┐
//! │  SnapshotStore     │   │  TableSource       │
//! │  cache_<id>.json   │   │  (HTTP, paginated) │
//! └────────────────────┘   └────────────────────┘
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod scheduler;
pub mod service;
pub mod snapshot;
pub mod source;

pub use config::{default_bases, BaseConfig, CacheConfig, RefreshConfig, TableConfig};
pub use engine::{BaseStatus, CacheEngine, CacheStatus, TableSnapshot, TableStatus};
pub use error::{Error, Result};
pub use record::{KeyStrategy, Record};
pub use scheduler::{RefreshScheduler, ScheduleSpec};
pub use service::CacheService;
pub use snapshot::{PersistedBase, SnapshotStore};
pub use source::{HttpTableSource, TableSource};
