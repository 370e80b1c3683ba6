//! Persistent snapshot store
//!
//! One pretty-printed JSON document per base on local disk:
//! `{ "lastFetched": <RFC 3339>, "tables": { <name>: [Record, ..] } }`,
//! named `cache_<base_id>.json` in a configurable directory created on
//! demand. Lookup indices are never persisted; they are rebuilt from the
//! flat record lists on every load.

use crate::record::Record;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk snapshot of one base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedBase {
    /// When the base was last fetched from the remote source
    pub last_fetched: DateTime<Utc>,
    /// Flat record lists keyed by local table name
    pub tables: BTreeMap<String, Vec<Record>>,
}

/// Reads and writes per-base snapshot files.
///
/// Load failures other than "file does not exist" are logged and reported
/// as a miss — the engine always degrades to a live fetch rather than
/// propagating storage errors upward. Staleness is judged by the engine,
/// not here.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snapshot file path for a base
    pub fn file_path(&self, base_id: &str) -> PathBuf {
        self.dir.join(format!("cache_{}.json", base_id))
    }

    /// The directory snapshots live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recursively create the snapshot directory
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Persist a base snapshot, creating the directory if needed.
    ///
    /// The caller treats failures as non-fatal (a freshly fetched
    /// in-memory snapshot is still useful until the next restart).
    pub fn save(&self, base_id: &str, snapshot: &PersistedBase) -> Result<()> {
        self.ensure_dir()?;
        let path = self.file_path(base_id);
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)?;
        info!(base_id, path = %path.display(), "persisted base snapshot");
        Ok(())
    }

    /// Load a base snapshot.
    ///
    /// Returns `None` when the file does not exist, fails to read, or
    /// fails to parse — all three are the same "fetch live" outcome, with
    /// the reason logged.
    pub fn load(&self, base_id: &str) -> Option<PersistedBase> {
        let path = self.file_path(base_id);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(base_id, path = %path.display(), "no snapshot file, will fetch live");
                return None;
            }
            Err(err) => {
                warn!(base_id, path = %path.display(), %err, "failed to read snapshot file");
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(base_id, path = %path.display(), %err, "corrupt snapshot file, will fetch live");
                None
            }
        }
    }
}
