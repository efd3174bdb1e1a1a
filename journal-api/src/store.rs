//! Journal entry storage and persistence.
//!
//! SQLite-backed store for journal entries with thread-safe access. Entry
//! ids are UUID strings assigned at creation and never change; timestamps
//! are maintained by the store.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// A persisted journal entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Opaque unique identifier, assigned at creation, immutable
    pub id: String,
    /// What was worked on
    pub work: String,
    /// What was difficult
    pub struggle: String,
    /// What to do next
    pub intention: String,
    /// Creation timestamp, assigned by the store
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp, maintained by the store
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryCreate {
    pub work: String,
    pub struggle: String,
    pub intention: String,
}

/// Partial field map for updating an entry.
///
/// Unknown keys are rejected at deserialization rather than passed through.
/// `id` and `created_at` are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struggle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
}

impl EntryUpdate {
    /// True when no field is set.
    pub const fn is_empty(&self) -> bool {
        self.work.is_none() && self.struggle.is_none() && self.intention.is_none()
    }
}

/// SQLite-backed store for journal entries.
#[derive(Clone)]
pub struct EntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntryStore {
    /// Create a new entry store at the given database path.
    ///
    /// Initializes the database schema if it doesn't exist.
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    /// Create an in-memory store, useful for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(include_str!("schema.sql"))
            .context("Failed to initialize entry database schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a new entry, assigning its id and timestamps.
    pub fn create(&self, fields: &EntryCreate) -> Result<Entry> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let now = Utc::now();
        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            work: fields.work.clone(),
            struggle: fields.struggle.clone(),
            intention: fields.intention.clone(),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r"
            INSERT INTO entries (id, work, struggle, intention, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                entry.id,
                entry.work,
                entry.struggle,
                entry.intention,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )
        .with_context(|| format!("Failed to create entry '{}'", entry.id))?;

        Ok(entry)
    }

    /// Get an entry by id.
    pub fn get(&self, id: &str) -> Result<Option<Entry>> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        conn.query_row(
            r"
            SELECT id, work, struggle, intention, created_at, updated_at
            FROM entries WHERE id = ?1
            ",
            params![id],
            row_to_entry,
        )
        .optional()
        .with_context(|| format!("Failed to get entry '{}'", id))
    }

    /// Apply a partial update to an entry.
    ///
    /// Returns the updated entry, or `None` when the id doesn't exist.
    /// Never changes `id` or `created_at`; bumps `updated_at`.
    pub fn update(&self, id: &str, update: &EntryUpdate) -> Result<Option<Entry>> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let current = conn
            .query_row(
                r"
                SELECT id, work, struggle, intention, created_at, updated_at
                FROM entries WHERE id = ?1
                ",
                params![id],
                row_to_entry,
            )
            .optional()
            .with_context(|| format!("Failed to get entry '{}'", id))?;

        let Some(current) = current else {
            return Ok(None);
        };

        let updated = Entry {
            id: current.id,
            work: update.work.clone().unwrap_or(current.work),
            struggle: update.struggle.clone().unwrap_or(current.struggle),
            intention: update.intention.clone().unwrap_or(current.intention),
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        conn.execute(
            r"
            UPDATE entries
            SET work = ?1, struggle = ?2, intention = ?3, updated_at = ?4
            WHERE id = ?5
            ",
            params![
                updated.work,
                updated.struggle,
                updated.intention,
                updated.updated_at.to_rfc3339(),
                id,
            ],
        )
        .with_context(|| format!("Failed to update entry '{}'", id))?;

        Ok(Some(updated))
    }

    /// Delete an entry. Returns true when a row was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let rows = conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete entry '{}'", id))?;

        Ok(rows > 0)
    }

    /// List all entries, oldest first.
    pub fn list_all(&self) -> Result<Vec<Entry>> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        let mut stmt = conn.prepare(
            r"
            SELECT id, work, struggle, intention, created_at, updated_at
            FROM entries ORDER BY created_at, id
            ",
        )?;

        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list entries")?;

        Ok(entries)
    }

    /// Delete all entries.
    pub fn delete_all(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        conn.execute("DELETE FROM entries", [])
            .context("Failed to delete all entries")?;

        Ok(())
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Entry {
        id: row.get(0)?,
        work: row.get(1)?,
        struggle: row.get(2)?,
        intention: row.get(3)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
