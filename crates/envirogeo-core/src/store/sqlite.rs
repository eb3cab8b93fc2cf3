//! SQLite document store with connection pooling and optional encryption
//!
//! Documents are kept as JSON text in a single `documents` table keyed by
//! collection. Filtering happens after load, so every backend shares the same
//! matching rules.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, TransactionBehavior};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::{matches_filter, Document, DocumentStore, Filter};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted store
    const APP_SALT: &[u8; 16] = b"envirogeo-salt-1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Document store backed by a SQLite file
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open an unencrypted store
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a store, encrypting it with a key derived from `passphrase`
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection needs the key before first use
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let store = Self { pool };
        store.run_migrations()?;

        info!(path = %path, encrypted = passphrase.is_some(), "Opened document store");
        Ok(store)
    }

    fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                body TEXT NOT NULL,
                UNIQUE(collection, doc_id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
            "#,
        )?;

        Ok(())
    }
}

fn load(conn: &Connection, collection: &str) -> Result<Vec<(i64, Document)>> {
    let mut stmt =
        conn.prepare("SELECT seq, body FROM documents WHERE collection = ?1 ORDER BY seq")?;
    let rows = stmt
        .query_map(params![collection], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(seq, body)| Ok((seq, serde_json::from_str::<Document>(&body)?)))
        .collect()
}

fn doc_id(doc: &Document) -> Result<&str> {
    doc.get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Store("document has no _id".to_string()))
}

fn insert_row(conn: &Connection, collection: &str, doc: &Document) -> Result<()> {
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)",
        params![collection, doc_id(doc)?, serde_json::to_string(doc)?],
    )?;
    Ok(())
}

fn merge_row(conn: &Connection, seq: i64, mut doc: Document, patch: &Document) -> Result<()> {
    for (key, value) in patch {
        doc.insert(key.clone(), value.clone());
    }
    conn.execute(
        "UPDATE documents SET body = ?1 WHERE seq = ?2",
        params![serde_json::to_string(&doc)?, seq],
    )?;
    Ok(())
}

impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn insert(&self, collection: &str, doc: Document) -> Result<()> {
        let conn = self.conn()?;
        insert_row(&conn, collection, &doc)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let conn = self.conn()?;
        Ok(load(&conn, collection)?
            .into_iter()
            .map(|(_, doc)| doc)
            .filter(|doc| matches_filter(doc, filter))
            .collect())
    }

    fn update_first(&self, collection: &str, filter: &Filter, patch: &Document) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let found = load(&tx, collection)?
            .into_iter()
            .find(|(_, doc)| matches_filter(doc, filter));
        let updated = match found {
            Some((seq, doc)) => {
                merge_row(&tx, seq, doc, patch)?;
                true
            }
            None => false,
        };
        tx.commit()?;
        Ok(updated)
    }

    fn delete_first(&self, collection: &str, filter: &Filter) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let found = load(&tx, collection)?
            .into_iter()
            .find(|(_, doc)| matches_filter(doc, filter));
        let deleted = match found {
            Some((seq, _)) => {
                tx.execute("DELETE FROM documents WHERE seq = ?1", params![seq])?;
                true
            }
            None => false,
        };
        tx.commit()?;
        Ok(deleted)
    }

    fn upsert_by(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Document,
        doc: Document,
    ) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let found = load(&tx, collection)?
            .into_iter()
            .find(|(_, existing)| matches_filter(existing, filter));
        let inserted = match found {
            Some((seq, existing)) => {
                merge_row(&tx, seq, existing, patch)?;
                false
            }
            None => {
                insert_row(&tx, collection, &doc)?;
                true
            }
        };
        tx.commit()?;
        debug!(collection = %collection, inserted, "Upserted document");
        Ok(inserted)
    }
}
