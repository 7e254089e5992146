//! Durable single-value slots holding the serialized project list.

use crate::StoreError;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

pub const STORAGE_KEY: &str = "ai-animation-projects";

pub trait ProjectSlot: Send + Sync {
    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&self, payload: &str) -> Result<(), StoreError>;
}

pub fn app_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    base.join("animation-studio")
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("studio.sqlite3")
}

/// Key/value table in a local SQLite database.
pub struct SqliteSlot {
    conn: Mutex<Connection>,
    path: PathBuf,
    key: String,
}

impl SqliteSlot {
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            key: STORAGE_KEY.to_string(),
        })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(include_str!("../migrations/V0001__kv_slots.sql"))?;
    conn.execute(
        "INSERT OR IGNORE INTO migrations(name, applied_at) VALUES(?1, strftime('%s','now'))",
        params!["V0001__kv_slots"],
    )?;
    Ok(())
}

impl ProjectSlot for SqliteSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, payload: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv_slots(key, value, updated_at) VALUES(?1, ?2, strftime('%s','now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.key, payload],
        )?;
        Ok(())
    }
}

/// Process-local slot for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(payload.into())),
        }
    }

    pub fn payload(&self) -> Option<String> {
        self.value.lock().clone()
    }
}

impl ProjectSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.lock().clone())
    }

    fn write(&self, payload: &str) -> Result<(), StoreError> {
        *self.value.lock() = Some(payload.to_string());
        Ok(())
    }
}

impl<T: ProjectSlot + ?Sized> ProjectSlot for std::sync::Arc<T> {
    fn read(&self) -> Result<Option<String>, StoreError> {
        (**self).read()
    }

    fn write(&self, payload: &str) -> Result<(), StoreError> {
        (**self).write(payload)
    }
}
