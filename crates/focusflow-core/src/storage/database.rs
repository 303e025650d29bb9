//! SQLite-backed session log.
//!
//! One append-only `sessions` table. Rows use stable encodings: UUID text,
//! RFC 3339 completion time, integer seconds, snake_case phase tag. `seq`
//! preserves insertion order for [`SessionStore::load_all`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{data_dir, SessionStore};
use crate::error::{CoreError, StorageError};
use crate::session::SessionRecord;
use crate::timer::Phase;

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Open the database at `~/.config/focusflow/focusflow.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_default() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focusflow.db");
        Ok(Self::open(&path)?)
    }

    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                seq           INTEGER PRIMARY KEY AUTOINCREMENT,
                id            TEXT NOT NULL UNIQUE,
                completed_at  TEXT NOT NULL,
                duration_secs INTEGER NOT NULL CHECK (duration_secs > 0),
                phase         TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
        )
    }

    pub fn count(&self) -> Result<u64, StorageError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get::<_, u64>(0))?;
        Ok(n)
    }
}

fn decode_row(
    id: String,
    completed_at: String,
    duration_secs: u32,
    phase: String,
) -> Result<SessionRecord, StorageError> {
    let corrupt = |what: String| StorageError::CorruptRecord(format!("{id}: {what}"));

    let uuid = Uuid::parse_str(&id).map_err(|e| corrupt(e.to_string()))?;
    let completed_at = DateTime::parse_from_rfc3339(&completed_at)
        .map_err(|e| corrupt(e.to_string()))?
        .with_timezone(&Utc);
    let phase = phase
        .parse::<Phase>()
        .map_err(|e| corrupt(e.to_string()))?;

    SessionRecord::restore(uuid, completed_at, duration_secs, phase)
        .map_err(|e| corrupt(e.to_string()))
}

impl SessionStore for Database {
    fn append(&mut self, record: &SessionRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO sessions (id, completed_at, duration_secs, phase)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id().to_string(),
                record.completed_at().to_rfc3339(),
                record.duration_secs(),
                record.phase().as_tag(),
            ],
        )?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, completed_at, duration_secs, phase
             FROM sessions
             ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, completed_at, duration_secs, phase) = row?;
            records.push(decode_row(id, completed_at, duration_secs, phase)?);
        }
        Ok(records)
    }
}
