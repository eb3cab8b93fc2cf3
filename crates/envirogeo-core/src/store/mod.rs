//! Document store with pluggable backends
//!
//! Profiles and saved analyses live as JSON documents in named collections.
//!
//! # Architecture
//!
//! - `DocumentStore` trait: a handful of primitive operations each backend
//!   implements, plus the generic CRUD verbs and user-scoped conveniences as
//!   provided methods
//! - `StoreClient` enum: concrete wrapper providing Clone and static dispatch
//! - Backends: `MemoryStore` (process lifetime) and `SqliteStore` (on disk,
//!   optionally encrypted)
//!
//! Documents receive an `_id` (UUID v4) and RFC 3339 `createdAt`/`updatedAt`
//! stamps on insert. Filters are equality matches on top-level fields; an
//! empty filter matches every document.

mod action;
mod memory;
mod sqlite;

pub use action::{StoreAction, StoreRequest, StoreResponse};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Error, Result};

/// A stored JSON object
pub type Document = Map<String, Value>;

/// Top-level field equality filter
pub type Filter = Map<String, Value>;

/// Collection holding user profiles
pub const PROFILES: &str = "profiles";

/// Collection holding saved analyses
pub const ANALYSIS_HISTORY: &str = "analysis_history";

/// Outcome of an upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResult {
    pub modified_count: u64,
    /// Id of the newly created document, if one was inserted
    pub upserted_id: Option<String>,
}

/// Whether a document satisfies a filter
pub fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// Serialize a value that must be a JSON object
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Store(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Current time in the form stored on documents
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn user_filter(user_id: &str) -> Filter {
    let mut filter = Filter::new();
    filter.insert("userId".to_string(), Value::String(user_id.to_string()));
    filter
}

fn created_at(doc: &Document) -> DateTime<Utc> {
    doc.get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Trait for document storage backends
///
/// Implementations provide the primitives; every write primitive must be
/// atomic with respect to other writers on the same store.
pub trait DocumentStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Store a fully stamped document (it must carry an `_id`)
    fn insert(&self, collection: &str, doc: Document) -> Result<()>;

    /// All documents matching `filter`, in insertion order
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Shallow-merge `patch` into the first match; false when nothing matched
    fn update_first(&self, collection: &str, filter: &Filter, patch: &Document) -> Result<bool>;

    /// Remove the first match; false when nothing matched
    fn delete_first(&self, collection: &str, filter: &Filter) -> Result<bool>;

    /// Merge `patch` into the first match, or insert `doc` when there is none,
    /// as a single atomic step. Returns true when `doc` was inserted.
    fn upsert_by(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Document,
        doc: Document,
    ) -> Result<bool>;

    /// Insert a document, returning its generated id
    fn insert_one(&self, collection: &str, data: Document) -> Result<String> {
        let id = new_id();
        let now = timestamp();
        let mut doc = data;
        doc.insert("_id".to_string(), Value::String(id.clone()));
        doc.insert("createdAt".to_string(), Value::String(now.clone()));
        doc.insert("updatedAt".to_string(), Value::String(now));
        self.insert(collection, doc)?;
        Ok(id)
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(collection, filter)?.into_iter().next())
    }

    /// Merge `data` into the first match, refreshing `updatedAt`
    fn update_one(&self, collection: &str, filter: &Filter, data: &Document) -> Result<u64> {
        let mut patch = data.clone();
        // Ids are immutable
        patch.remove("_id");
        patch.insert("updatedAt".to_string(), Value::String(timestamp()));
        Ok(self.update_first(collection, filter, &patch)? as u64)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        Ok(self.delete_first(collection, filter)? as u64)
    }

    /// Create or merge the profile owned by `user_id`
    fn upsert_profile(&self, collection: &str, user_id: &str, data: &Document) -> Result<UpsertResult> {
        let now = timestamp();

        let mut patch = data.clone();
        patch.remove("_id");
        patch.insert("userId".to_string(), Value::String(user_id.to_string()));
        patch.insert("updatedAt".to_string(), Value::String(now.clone()));

        let id = new_id();
        let mut doc = data.clone();
        doc.insert("_id".to_string(), Value::String(id.clone()));
        doc.insert("userId".to_string(), Value::String(user_id.to_string()));
        doc.insert("createdAt".to_string(), Value::String(now.clone()));
        doc.insert("updatedAt".to_string(), Value::String(now));

        let inserted = self.upsert_by(collection, &user_filter(user_id), &patch, doc)?;
        Ok(if inserted {
            UpsertResult {
                modified_count: 0,
                upserted_id: Some(id),
            }
        } else {
            UpsertResult {
                modified_count: 1,
                upserted_id: None,
            }
        })
    }

    fn get_profile(&self, collection: &str, user_id: &str) -> Result<Option<Document>> {
        self.find_one(collection, &user_filter(user_id))
    }

    /// Save an analysis for `user_id`; only `createdAt` is stamped
    fn save_analysis(&self, collection: &str, user_id: &str, data: Document) -> Result<String> {
        let id = new_id();
        let mut doc = data;
        doc.insert("_id".to_string(), Value::String(id.clone()));
        doc.insert("userId".to_string(), Value::String(user_id.to_string()));
        doc.insert("createdAt".to_string(), Value::String(timestamp()));
        self.insert(collection, doc)?;
        Ok(id)
    }

    /// Analyses owned by `user_id`, newest first
    ///
    /// Records sharing a creation time come back newest-inserted first.
    fn get_analysis_history(&self, collection: &str, user_id: &str) -> Result<Vec<Document>> {
        let mut docs = self.find(collection, &user_filter(user_id))?;
        docs.reverse();
        docs.sort_by_key(|doc| std::cmp::Reverse(created_at(doc)));
        Ok(docs)
    }

    /// Delete an analysis only when both its id and owner match
    fn delete_analysis(&self, collection: &str, user_id: &str, analysis_id: &str) -> Result<u64> {
        let mut filter = user_filter(user_id);
        filter.insert("_id".to_string(), Value::String(analysis_id.to_string()));
        self.delete_one(collection, &filter)
    }
}

/// Concrete store enum
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub enum StoreClient {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl StoreClient {
    /// Open the backend selected by configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Memory => Ok(StoreClient::Memory(MemoryStore::new())),
            StoreBackend::Sqlite => {
                let store = match config.db_key.as_deref() {
                    Some(key) => SqliteStore::new_with_key(&config.db_path, Some(key))?,
                    None => {
                        warn!(path = %config.db_path, "Opening unencrypted document store");
                        SqliteStore::new_unencrypted(&config.db_path)?
                    }
                };
                Ok(StoreClient::Sqlite(store))
            }
        }
    }

    pub fn memory() -> Self {
        StoreClient::Memory(MemoryStore::new())
    }
}

impl DocumentStore for StoreClient {
    fn name(&self) -> &str {
        match self {
            StoreClient::Memory(s) => s.name(),
            StoreClient::Sqlite(s) => s.name(),
        }
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<()> {
        match self {
            StoreClient::Memory(s) => s.insert(collection, doc),
            StoreClient::Sqlite(s) => s.insert(collection, doc),
        }
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        match self {
            StoreClient::Memory(s) => s.find(collection, filter),
            StoreClient::Sqlite(s) => s.find(collection, filter),
        }
    }

    fn update_first(&self, collection: &str, filter: &Filter, patch: &Document) -> Result<bool> {
        match self {
            StoreClient::Memory(s) => s.update_first(collection, filter, patch),
            StoreClient::Sqlite(s) => s.update_first(collection, filter, patch),
        }
    }

    fn delete_first(&self, collection: &str, filter: &Filter) -> Result<bool> {
        match self {
            StoreClient::Memory(s) => s.delete_first(collection, filter),
            StoreClient::Sqlite(s) => s.delete_first(collection, filter),
        }
    }

    fn upsert_by(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Document,
        doc: Document,
    ) -> Result<bool> {
        match self {
            StoreClient::Memory(s) => s.upsert_by(collection, filter, patch, doc),
            StoreClient::Sqlite(s) => s.upsert_by(collection, filter, patch, doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_matches_filter() {
        let d = doc(json!({"userId": "u1", "n": 3, "nested": {"a": 1}}));
        assert!(matches_filter(&d, &Filter::new()));
        assert!(matches_filter(&d, &doc(json!({"userId": "u1"}))));
        assert!(matches_filter(&d, &doc(json!({"userId": "u1", "n": 3}))));
        assert!(!matches_filter(&d, &doc(json!({"userId": "u2"}))));
        assert!(!matches_filter(&d, &doc(json!({"missing": null}))));
        assert!(matches_filter(&d, &doc(json!({"nested": {"a": 1}}))));
    }

    #[test]
    fn test_to_document_requires_object() {
        assert!(to_document(&json!({"a": 1})).is_ok());
        let err = to_document(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_history_orders_by_created_at_then_insertion() {
        let store = MemoryStore::new();
        for (id, created) in [
            ("a", "2024-01-01T00:00:00.000Z"),
            ("b", "2024-03-01T00:00:00.000Z"),
            ("c", "2024-03-01T00:00:00.000Z"),
            ("d", "2023-06-01T00:00:00.000Z"),
        ] {
            store
                .insert(
                    ANALYSIS_HISTORY,
                    doc(json!({"_id": id, "userId": "u", "createdAt": created})),
                )
                .unwrap();
        }
        let ids: Vec<_> = store
            .get_analysis_history(ANALYSIS_HISTORY, "u")
            .unwrap()
            .into_iter()
            .map(|d| d["_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_client_memory_backend() {
        let client = StoreClient::from_config(&StoreConfig::default()).unwrap();
        assert_eq!(client.name(), "memory");
        let id = client.insert_one("things", doc(json!({"x": 1}))).unwrap();
        let found = client.find_one("things", &Filter::new()).unwrap().unwrap();
        assert_eq!(found["_id"], json!(id));
    }
}
