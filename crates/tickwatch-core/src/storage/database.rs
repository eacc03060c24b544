//! SQLite-based persistence.
//!
//! Provides storage for:
//! - The last countdown duration the user picked
//! - The controller state between CLI invocations
//! - A history of finished countdowns and stopwatch sessions

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, DurationStore};
use crate::error::StorageError;
use crate::mode::ControllerState;

const DURATION_KEY: &str = "timer.duration_ms";
const CONTROLLER_KEY: &str = "controller_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Timer,
    Stopwatch,
}

impl RunKind {
    fn as_str(&self) -> &'static str {
        match self {
            RunKind::Timer => "timer",
            RunKind::Stopwatch => "stopwatch",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "timer" => Some(RunKind::Timer),
            "stopwatch" => Some(RunKind::Stopwatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: i64,
    pub kind: RunKind,
    pub duration_ms: u64,
    pub laps: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// SQLite database for tickwatch state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/tickwatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("tickwatch.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS runs (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                kind         TEXT NOT NULL,
                duration_ms  INTEGER NOT NULL,
                laps         INTEGER NOT NULL DEFAULT 0,
                started_at   TEXT NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_completed_at ON runs(completed_at);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// # Errors
    /// Returns an error if the insert fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the delete fails.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Controller state ─────────────────────────────────────────────

    /// Load the saved controller state, if any.
    ///
    /// # Errors
    /// Returns `CorruptValue` if the stored JSON no longer parses.
    pub fn load_controller_state(&self) -> Result<Option<ControllerState>, StorageError> {
        let Some(json) = self.kv_get(CONTROLLER_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::CorruptValue {
                key: CONTROLLER_KEY.to_string(),
                message: e.to_string(),
            })
    }

    /// # Errors
    /// Returns an error if the state cannot be encoded or written.
    pub fn save_controller_state(&self, state: &ControllerState) -> Result<(), StorageError> {
        let json = serde_json::to_string(state).map_err(|e| StorageError::CorruptValue {
            key: CONTROLLER_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.kv_set(CONTROLLER_KEY, &json)
    }

    /// Forget the saved controller state.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear_controller_state(&self) -> Result<(), StorageError> {
        self.kv_delete(CONTROLLER_KEY)
    }

    // ── Run history ──────────────────────────────────────────────────

    /// Record a finished countdown or a stopped stopwatch session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_run(
        &self,
        kind: RunKind,
        duration_ms: u64,
        laps: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO runs (kind, duration_ms, laps, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                kind.as_str(),
                duration_ms as i64,
                laps,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent runs first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, duration_ms, laps, started_at, completed_at
             FROM runs ORDER BY completed_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, kind, duration_ms, laps, started_at, completed_at) = row?;
            let corrupt = |message: String| StorageError::CorruptValue {
                key: format!("runs.{id}"),
                message,
            };
            records.push(RunRecord {
                id,
                kind: RunKind::parse(&kind).ok_or_else(|| corrupt(format!("unknown kind '{kind}'")))?,
                duration_ms: duration_ms.max(0) as u64,
                laps,
                started_at: parse_rfc3339(&started_at).map_err(corrupt)?,
                completed_at: parse_rfc3339(&completed_at).map_err(corrupt)?,
            });
        }
        Ok(records)
    }
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

impl DurationStore for Database {
    fn load_duration(&self) -> Result<Option<u64>, StorageError> {
        match self.kv_get(DURATION_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| StorageError::CorruptValue {
                    key: DURATION_KEY.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn save_duration(&self, duration_ms: u64) -> Result<(), StorageError> {
        self.kv_set(DURATION_KEY, &duration_ms.to_string())
    }
}
