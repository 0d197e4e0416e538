//! SQLite-backed settings store

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use crate::application::errors::StorageError;
use crate::domain::traits::SettingsStore;

/// Per-room module enablement persisted in SQLite.
///
/// No row for a (room, module) pair means the module is enabled; rows are
/// only written when an admin flips the switch.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS module_settings (
                room_id TEXT NOT NULL,
                module TEXT NOT NULL,
                enabled INTEGER NOT NULL,
                PRIMARY KEY (room_id, module)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn is_module_enabled(&self, room: &str, module: &str) -> Result<bool, StorageError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let enabled: Option<bool> = conn
            .query_row(
                "SELECT enabled FROM module_settings WHERE room_id = ?1 AND module = ?2",
                [room, module],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled.unwrap_or(true))
    }

    async fn set_module_enabled(
        &self,
        room: &str,
        module: &str,
        enabled: bool,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO module_settings (room_id, module, enabled) VALUES (?1, ?2, ?3)",
            rusqlite::params![room, module, enabled],
        )?;
        Ok(())
    }
}
