//! SQLite-based persistence adapter

use learnstreak_util::DEFAULT_BLOB_KEY;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{PersistenceAdapter, StoreError, StoreResult};

/// SQLite-based adapter storing the blob in a key/value table
pub struct SqliteAdapter {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteAdapter {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let adapter = Self {
            conn: Mutex::new(conn),
            key: key.into(),
        };
        adapter.init_schema()?;
        Ok(adapter)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let adapter = Self {
            conn: Mutex::new(conn),
            key: DEFAULT_BLOB_KEY.to_string(),
        };
        adapter.init_schema()?;
        Ok(adapter)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            warn!("Store lock poisoned");
            StoreError::Unavailable("sqlite connection lock poisoned".into())
        })
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    /// Check if the database answers queries
    pub fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

impl PersistenceAdapter for SqliteAdapter {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        let conn = self.conn()?;

        let data: Option<Vec<u8>> = conn
            .query_row(
                "SELECT data FROM blobs WHERE key = ?",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(data)
    }

    fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO blobs (key, data, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key)
            DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
            params![self.key.as_str(), bytes],
        )?;

        debug!(key = %self.key, bytes = bytes.len(), "Blob saved");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM blobs WHERE key = ?", [self.key.as_str()])?;
        debug!(key = %self.key, "Blob cleared");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_adapter() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        assert!(adapter.is_healthy());
        assert_eq!(adapter.key(), DEFAULT_BLOB_KEY);
    }

    #[test]
    fn test_load_save_clear() {
        let adapter = SqliteAdapter::in_memory().unwrap();

        // Nothing stored initially
        assert!(adapter.load().unwrap().is_none());

        adapter.save(b"first").unwrap();
        assert_eq!(adapter.load().unwrap().unwrap(), b"first");

        // Save replaces
        adapter.save(b"second").unwrap();
        assert_eq!(adapter.load().unwrap().unwrap(), b"second");

        adapter.clear().unwrap();
        assert!(adapter.load().unwrap().is_none());
    }

    #[test]
    fn test_keys_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streak.db");

        let a = SqliteAdapter::open(&path, "a").unwrap();
        let b = SqliteAdapter::open(&path, "b").unwrap();

        a.save(b"alpha").unwrap();
        assert!(b.load().unwrap().is_none());

        b.save(b"beta").unwrap();
        a.clear().unwrap();
        assert_eq!(b.load().unwrap().unwrap(), b"beta");
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streak.db");

        {
            let adapter = SqliteAdapter::open(&path, DEFAULT_BLOB_KEY).unwrap();
            adapter.save(b"kept").unwrap();
        }

        let reopened = SqliteAdapter::open(&path, DEFAULT_BLOB_KEY).unwrap();
        assert_eq!(reopened.load().unwrap().unwrap(), b"kept");
    }
}
