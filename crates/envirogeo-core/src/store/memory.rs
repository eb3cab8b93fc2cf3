//! In-process document store

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

use super::{matches_filter, Document, DocumentStore, Filter};

type Collections = HashMap<String, Vec<Document>>;

/// Document store held in memory for the life of the process
///
/// Each instance owns its own data; clones share it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| Error::Store("Failed to acquire store lock".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| Error::Store("Failed to acquire store lock".into()))
    }
}

fn merge(target: &mut Document, patch: &Document) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<()> {
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .read()?
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_filter(d, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update_first(&self, collection: &str, filter: &Filter, patch: &Document) -> Result<bool> {
        let mut guard = self.write()?;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter_mut().find(|d| matches_filter(d, filter)) {
            Some(doc) => {
                merge(doc, patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_first(&self, collection: &str, filter: &Filter) -> Result<bool> {
        let mut guard = self.write()?;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| matches_filter(d, filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn upsert_by(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Document,
        doc: Document,
    ) -> Result<bool> {
        let mut guard = self.write()?;
        let docs = guard.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| matches_filter(d, filter)) {
            Some(existing) => {
                merge(existing, patch);
                Ok(false)
            }
            None => {
                docs.push(doc);
                Ok(true)
            }
        }
    }
}
