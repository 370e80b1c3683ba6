//! Static cache configuration
//!
//! The engine replicates exactly two bases, each with a small fixed list
//! of tables. Base and table identifiers are configuration data, not
//! discovered at runtime.

use crate::record::KeyStrategy;
use crate::{Error, Result};
use std::path::PathBuf;

/// Base name for the product registration tracking base
pub const PRODUCT_REGISTRATION_TRACKING: &str = "productRegistrationTracking";

/// Base name for the delta documents base
pub const DELTA_DOCUMENTS: &str = "deltaDocuments";

/// Local name of the document types table within `deltaDocuments`
pub const DOCUMENT_TYPES_TABLE: &str = "documentTypes";

/// Configuration for one replicated table within a base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Remote table identifier
    pub table_id: String,
    /// Local display name, used as the cache and snapshot-file key
    pub name: String,
    /// Primary-key extraction rule for the `by_id` index
    pub key: KeyStrategy,
}

impl TableConfig {
    /// Create a table keyed by the record's own identifier
    pub fn new(table_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            name: name.into(),
            key: KeyStrategy::RecordId,
        }
    }

    /// Create a table keyed by the named field's string value
    pub fn keyed_by_field(
        table_id: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            name: name.into(),
            key: KeyStrategy::Field(field.into()),
        }
    }
}

/// Configuration for one replicated base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConfig {
    /// Local base name
    pub name: String,
    /// Remote base identifier
    pub base_id: String,
    /// Tables replicated from this base
    pub tables: Vec<TableConfig>,
}

impl BaseConfig {
    /// Create a base configuration
    pub fn new(name: impl Into<String>, base_id: impl Into<String>, tables: Vec<TableConfig>) -> Self {
        Self {
            name: name.into(),
            base_id: base_id.into(),
            tables,
        }
    }
}

/// The two production bases and their table lists
pub fn default_bases() -> Vec<BaseConfig> {
    vec![
        BaseConfig::new(
            PRODUCT_REGISTRATION_TRACKING,
            "appkaXsw8Q6dSltKd",
            vec![
                TableConfig::new("tblyPyT9SZWkGFcoD", "registrationTracking"),
                TableConfig::new("tblYe0DJIkwk758Az", "products"),
                TableConfig::new("tblDSlAkIve4Ap9u8", "clientList"),
                TableConfig::new("tblU5FD7w4hOEAM8k", "states"),
                TableConfig::new("tbl29guRFK9Q2l7CL", "regReqs"),
            ],
        ),
        BaseConfig::new(
            DELTA_DOCUMENTS,
            "appkWl7oSFxka7JEu",
            vec![
                TableConfig::keyed_by_field("tblNYeqUgJBa9l2XD", DOCUMENT_TYPES_TABLE, "doc_type_id"),
                TableConfig::new("tbl6CrMvhmVCf7mdQ", "clients"),
                TableConfig::new("tblD6G1lBmSsGCxfh", "states"),
                TableConfig::new("tblW9piLEHybdSOlT", "products"),
                TableConfig::new("tblImOnbMhtkhQ1Jt", "tags"),
            ],
        ),
    ]
}

/// Scheduled refresh configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Whether the background refresh scheduler runs at all
    pub enabled: bool,
    /// Daily wall-clock trigger, `HH:MM` in UTC
    pub schedule: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            schedule: "02:00".to_string(),
        }
    }
}

/// Configuration consumed by the cache service
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Credential for the remote table source
    pub api_key: String,
    /// Remote table source endpoint (`{endpoint}/{base_id}/{table_id}`)
    pub endpoint: String,
    /// Directory for persisted snapshot files, created on demand
    pub cache_dir: PathBuf,
    /// Maximum age of a persisted snapshot before a live fetch is forced
    pub max_age_hours: u64,
    /// Background refresh scheduling
    pub refresh: RefreshConfig,
    /// Bases to replicate
    pub bases: Vec<BaseConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.airtable.com/v0".to_string(),
            cache_dir: PathBuf::from("./data/cache/refdata"),
            max_age_hours: 25,
            refresh: RefreshConfig::default(),
            bases: default_bases(),
        }
    }
}

impl CacheConfig {
    /// Create a configuration with the given credential and defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the snapshot directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the staleness threshold in hours
    pub fn with_max_age_hours(mut self, hours: u64) -> Self {
        self.max_age_hours = hours;
        self
    }

    /// Enable the background refresh scheduler with the given `HH:MM` schedule
    pub fn with_scheduled_refresh(mut self, schedule: impl Into<String>) -> Self {
        self.refresh = RefreshConfig {
            enabled: true,
            schedule: schedule.into(),
        };
        self
    }

    /// Replace the replicated base configuration
    pub fn with_bases(mut self, bases: Vec<BaseConfig>) -> Self {
        self.bases = bases;
        self
    }

    /// Validate the configuration.
    ///
    /// A missing credential is fatal to service construction. An invalid
    /// schedule expression is deliberately NOT checked here — the
    /// scheduler rejects it at start time without failing the service.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(
                "remote table source API key is not configured",
            ));
        }
        if self.bases.is_empty() {
            return Err(Error::config("no bases configured for replication"));
        }
        if self.max_age_hours == 0 {
            return Err(Error::config("max_age_hours must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bases() {
        let bases = default_bases();
        assert_eq!(bases.len(), 2);
        assert_eq!(bases[0].name, PRODUCT_REGISTRATION_TRACKING);
        assert_eq!(bases[1].name, DELTA_DOCUMENTS);
        assert_eq!(bases[0].tables.len(), 5);
        assert_eq!(bases[1].tables.len(), 5);

        let doc_types = &bases[1].tables[0];
        assert_eq!(doc_types.name, DOCUMENT_TYPES_TABLE);
        assert_eq!(doc_types.key, KeyStrategy::Field("doc_type_id".into()));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = CacheConfig::default();
        assert!(config.validate().is_err());

        let config = CacheConfig::new("key_123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_bases() {
        let config = CacheConfig::new("key_123").with_bases(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = CacheConfig::new("key_123")
            .with_cache_dir("/tmp/refcache")
            .with_max_age_hours(12)
            .with_scheduled_refresh("03:30");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/refcache"));
        assert_eq!(config.max_age_hours, 12);
        assert!(config.refresh.enabled);
        assert_eq!(config.refresh.schedule, "03:30");
    }
}
