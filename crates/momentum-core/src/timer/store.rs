//! Key-value stores shared between the app and its extensions.
//!
//! Each operation touches exactly one key. No transaction spans keys.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;

/// File name of the shared store inside the app-group directory.
pub const SHARED_STORE_FILE: &str = "shared.db";

/// Single-key storage reachable from every execution context.
pub trait SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the whole value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove `key` only while it still holds `expected`.
    ///
    /// Returns whether the entry was removed. A value written by another
    /// context after `expected` was read is left in place.
    fn remove_if(&self, key: &str, expected: &str) -> Result<bool, StoreError>;
}

impl<S: SharedStore + ?Sized> SharedStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn remove_if(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        (**self).remove_if(key, expected)
    }
}

/// SQLite-backed store living in the app-group directory.
///
/// Several processes may open the same file. Every write is a single
/// `INSERT OR REPLACE`, so a reader sees either the old blob or the new one.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) `shared.db` inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::open(&dir.join(SHARED_STORE_FILE))
    }

    /// Open (or create) a store at an explicit file path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_millis(250))?;
        // WAL lets a widget read while the app writes.
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Open a private in-memory store (for tests).
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl SharedStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn remove_if(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM kv WHERE key = ?1 AND value = ?2",
            params![key, expected],
        )?;
        Ok(removed > 0)
    }
}

/// In-process store for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn remove_if(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        if entries.get(key).map(String::as_str) == Some(expected) {
            entries.remove(key);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SharedStore) {
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        // Removing a missing key is fine.
        store.remove("a").unwrap();

        store.set("b", "pause").unwrap();
        assert!(!store.remove_if("b", "stop").unwrap());
        assert_eq!(store.get("b").unwrap().as_deref(), Some("pause"));
        assert!(store.remove_if("b", "pause").unwrap());
        assert_eq!(store.get("b").unwrap(), None);
        assert!(!store.remove_if("b", "pause").unwrap());
    }

    #[test]
    fn memory_store_semantics() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn sqlite_store_semantics() {
        exercise(&SqliteStore::open_memory().unwrap());
    }

    #[test]
    fn sqlite_store_is_shared_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SqliteStore::open_in(dir.path()).unwrap();
        let reader = SqliteStore::open_in(dir.path()).unwrap();

        writer.set("focus_timer_command", "pause").unwrap();
        assert_eq!(
            reader.get("focus_timer_command").unwrap().as_deref(),
            Some("pause")
        );
    }
}
