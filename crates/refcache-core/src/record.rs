//! Record data model
//!
//! A [`Record`] is one row of remote reference data: an opaque identifier
//! plus a schema-less field mapping. The engine never interprets field
//! contents itself, except through the table's [`KeyStrategy`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of reference data fetched from the remote table source.
///
/// Fields are dynamic JSON values (scalars, lists, or nested objects) —
/// the schema is data, not type. Records are immutable once fetched and
/// replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque record identifier assigned by the remote store
    pub id: String,
    /// Field name → field value mapping
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with an empty field mapping
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Add a field (builder style, mainly for tests and fixtures)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field as a string, if present and a string
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Primary-key extraction strategy for a table.
///
/// Expressed as data rather than a callback so table configuration stays
/// declarative and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStrategy {
    /// Use the record's own identifier (the default)
    RecordId,
    /// Use the named field's string value; records without a usable value
    /// get no key and are left out of the lookup index
    Field(String),
}

impl Default for KeyStrategy {
    fn default() -> Self {
        Self::RecordId
    }
}

impl KeyStrategy {
    /// Derive the primary key for a record.
    ///
    /// Returns `None` when the strategy yields no usable key (missing
    /// field, non-string value, or empty string). Such records stay in the
    /// table's ordered list but are omitted from the `by_id` index.
    pub fn key_of(&self, record: &Record) -> Option<String> {
        let key = match self {
            KeyStrategy::RecordId => Some(record.id.as_str()),
            KeyStrategy::Field(name) => record.field_str(name),
        };
        key.filter(|k| !k.is_empty()).map(str::to_string)
    }
}
