//! SQLite lookup cache.
//!
//! Derived-source headers and filter-panel distinct values both come from
//! the report service and rarely change, so reopening a report should not
//! fetch them again. Entries live until their connection is forgotten or
//! the schema version changes.
//!
//! Rows are keyed by `(connection, kind, subject)` where `connection` is
//! [`connection_hash`] of the connection id and `subject` is a report id
//! or a qualified field name. Payloads are JSON.

mod hash;
pub use hash::connection_hash;

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::query::Scalar;

/// Stored in `PRAGMA user_version`; a mismatch drops every entry.
const SCHEMA_VERSION: i64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt cache entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot create cache directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Headers,
    Distinct,
}

impl Lookup {
    fn as_str(self) -> &'static str {
        match self {
            Lookup::Headers => "headers",
            Lookup::Distinct => "distinct",
        }
    }
}

pub struct ReportCache {
    conn: Connection,
}

impl std::fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCache").finish_non_exhaustive()
    }
}

impl ReportCache {
    /// Open or create the cache file, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::prepare(Connection::open(path)?)
    }

    pub fn open_in_memory() -> CacheResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> CacheResult<Self> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version != SCHEMA_VERSION {
            if version != 0 {
                tracing::info!(stored = version, current = SCHEMA_VERSION, "cache schema changed; clearing");
            }
            conn.execute_batch(&format!(
                "DROP TABLE IF EXISTS lookups;
                 CREATE TABLE lookups (
                     connection TEXT NOT NULL,
                     kind TEXT NOT NULL,
                     subject TEXT NOT NULL,
                     payload TEXT NOT NULL,
                     PRIMARY KEY (connection, kind, subject)
                 );
                 PRAGMA user_version = {SCHEMA_VERSION};"
            ))?;
        }
        Ok(Self { conn })
    }

    fn read<T: DeserializeOwned>(
        &self,
        connection_id: &str,
        kind: Lookup,
        subject: &str,
    ) -> CacheResult<Option<T>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM lookups WHERE connection = ?1 AND kind = ?2 AND subject = ?3",
                params![connection_hash(connection_id), kind.as_str(), subject],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        connection_id: &str,
        kind: Lookup,
        subject: &str,
        value: &T,
    ) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO lookups (connection, kind, subject, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                connection_hash(connection_id),
                kind.as_str(),
                subject,
                serde_json::to_string(value)?
            ],
        )?;
        Ok(())
    }

    pub fn derived_headers(
        &self,
        connection_id: &str,
        report_id: &str,
    ) -> CacheResult<Option<Vec<String>>> {
        self.read(connection_id, Lookup::Headers, report_id)
    }

    pub fn put_derived_headers(
        &self,
        connection_id: &str,
        report_id: &str,
        headers: &[String],
    ) -> CacheResult<()> {
        self.write(connection_id, Lookup::Headers, report_id, headers)
    }

    pub fn distinct_values(
        &self,
        connection_id: &str,
        field: &str,
    ) -> CacheResult<Option<Vec<Scalar>>> {
        self.read(connection_id, Lookup::Distinct, field)
    }

    pub fn put_distinct_values(
        &self,
        connection_id: &str,
        field: &str,
        values: &[Scalar],
    ) -> CacheResult<()> {
        self.write(connection_id, Lookup::Distinct, field, values)
    }

    /// Drop everything cached for one connection. Returns the number of
    /// entries removed.
    pub fn forget_connection(&self, connection_id: &str) -> CacheResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM lookups WHERE connection = ?1",
            params![connection_hash(connection_id)],
        )?)
    }

    pub fn clear(&self) -> CacheResult<()> {
        self.conn.execute("DELETE FROM lookups", [])?;
        Ok(())
    }

    pub fn len(&self) -> CacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lookups", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}
