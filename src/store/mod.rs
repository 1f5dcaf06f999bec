//! Session-owned dataset store.
//!
//! Normalized datasets are cached per report session through an injected
//! [`DatasetStore`] rather than process-wide state. Two backends:
//!
//! - [`MemoryStore`]: a map of JSON values, dropped with the session
//! - [`SqliteStore`]: a single-table SQLite file, versioned and auto-cleared
//!   on version mismatch
//!
//! # Key Format
//!
//! ```text
//! dataset:{name}        -> [record, ...]
//! batch:{sha256}        -> NormalizedBatch
//! ```

mod hash;
pub use hash::compute_hash;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Current store schema version. Bump this when the stored format changes.
const STORE_VERSION: i32 = 1;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine store directory")]
    NoStoreDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key for a named dataset.
pub fn dataset_key(name: &str) -> String {
    format!("dataset:{}", name)
}

/// Key for a normalized batch, derived from the raw payload.
pub fn batch_key(raw: &str) -> String {
    format!("batch:{}", compute_hash(raw))
}

/// Key/value store owned by a report session.
pub trait DatasetStore {
    /// Store a value, replacing any previous value under `key`.
    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> StoreResult<()>;

    /// Fetch a value.
    fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>>;

    /// Remove a value. Returns whether it existed.
    fn delete(&mut self, key: &str) -> StoreResult<bool>;

    /// Remove every value.
    fn clear(&mut self) -> StoreResult<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DatasetStore for MemoryStore {
    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the store at `path`.
    ///
    /// If the stored version doesn't match, the store is cleared.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Default location: `~/.reportsmith/datasets.db`.
    pub fn default_path() -> StoreResult<PathBuf> {
        let base = dirs::home_dir().ok_or(StoreError::NoStoreDir)?;
        Ok(base.join(".reportsmith").join("datasets.db"))
    }

    fn init(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS datasets (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == STORE_VERSION => {}
            Some(v) => {
                tracing::info!(found = v, expected = STORE_VERSION, "store version mismatch, clearing");
                self.conn.execute("DELETE FROM datasets", [])?;
                self.set_version()?;
            }
            None => self.set_version()?,
        }

        Ok(())
    }

    fn set_version(&self) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![STORE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Number of stored entries.
    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM datasets", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl DatasetStore for SqliteStore {
    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO datasets (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM datasets WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM datasets WHERE key = ?", params![key])?;
        Ok(rows > 0)
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM datasets", [])?;
        Ok(())
    }
}
