use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal persistent key-value store for state that outlives a round
pub trait KvStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Write several entries; stores that can should apply all or none
    fn write_all(&mut self, entries: &[(&str, &str)]) -> StoreResult<()> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn write_all(&mut self, entries: &[(&str, &str)]) -> StoreResult<()> {
        (**self).write_all(entries)
    }
}

const UPSERT: &str = r#"
    INSERT INTO kv (key, value, updated_at)
    VALUES (?1, ?2, CURRENT_TIMESTAMP)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
"#;

/// SQLite-backed store under the state directory
#[derive(Debug)]
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Open (or create) the database file, creating parent dirs as needed
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }
}

impl KvStore for SqliteKvStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(UPSERT, params![key, value])?;
        Ok(())
    }

    fn write_all(&mut self, entries: &[(&str, &str)]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Volatile store, used when the database cannot be opened and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sqlite_read_missing_key() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(store.read("nope").unwrap(), None);
    }

    #[test]
    fn sqlite_write_overwrites() {
        let mut store = SqliteKvStore::open_in_memory().unwrap();
        store.write("streak", "1").unwrap();
        store.write("streak", "2").unwrap();
        assert_eq!(store.read("streak").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");
        {
            let mut store = SqliteKvStore::open(&path).unwrap();
            store.write("wordflow_streak", "4").unwrap();
        }
        let store = SqliteKvStore::open(&path).unwrap();
        assert_eq!(store.read("wordflow_streak").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn sqlite_write_all_commits_together() {
        let mut store = SqliteKvStore::open_in_memory().unwrap();
        store.write("a", "old").unwrap();
        store.write_all(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.read("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn boxed_store_delegates() {
        let mut store: Box<dyn KvStore> = Box::new(MemoryKvStore::new());
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("v"));
    }
}
