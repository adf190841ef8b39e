//! Bookkeeping for the `migrations` ledger table.
//!
//! All functions take a plain `&Connection`.  A `rusqlite::Transaction`
//! derefs to one, so the runner passes its per-migration transaction here and
//! the ledger write lands in the same unit of work as the schema change.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::error::MigrationError;
use super::version::Version;
use crate::models::LedgerEntry;

/// Name of the ledger table.
pub const LEDGER_TABLE: &str = "migrations";

const CREATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS migrations (
    version     TEXT PRIMARY KEY NOT NULL,
    description TEXT,
    executed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
"#;

/// Create the ledger table if it does not exist yet.
pub fn ensure_table(conn: &Connection) -> Result<(), MigrationError> {
    conn.execute_batch(CREATE_SQL)
        .map_err(|source| MigrationError::Schema { source })
}

/// Whether the ledger table exists.  Used by read-only callers that must not
/// create it.
pub fn table_exists(conn: &Connection) -> Result<bool, MigrationError> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![LEDGER_TABLE],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(|source| MigrationError::Query {
        version: None,
        source,
    })
}

/// Whether a ledger entry exists for `version`.
pub fn is_applied(conn: &Connection, version: &Version) -> Result<bool, MigrationError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE version = ?1)",
        params![version.as_str()],
        |row| row.get(0),
    )
    .map_err(|source| MigrationError::Query {
        version: Some(version.clone()),
        source,
    })
}

/// Record `version` as applied now.
///
/// A second insert for the same version violates the primary key and is
/// returned as [`MigrationError::LedgerWrite`].
pub fn record_applied(
    conn: &Connection,
    version: &Version,
    description: &str,
) -> Result<(), MigrationError> {
    conn.execute(
        "INSERT INTO migrations (version, description, executed_at) VALUES (?1, ?2, ?3)",
        params![version.as_str(), description, Utc::now().to_rfc3339()],
    )
    .map(|_| ())
    .map_err(|source| MigrationError::LedgerWrite {
        version: version.clone(),
        source,
    })
}

/// Delete the ledger entry for `version`.  Deleting a missing entry succeeds.
pub fn remove_applied(conn: &Connection, version: &Version) -> Result<(), MigrationError> {
    conn.execute(
        "DELETE FROM migrations WHERE version = ?1",
        params![version.as_str()],
    )
    .map(|_| ())
    .map_err(|source| MigrationError::LedgerWrite {
        version: version.clone(),
        source,
    })
}

/// Every ledger entry, ordered by version ascending.
pub fn list_applied(conn: &Connection) -> Result<Vec<LedgerEntry>, MigrationError> {
    let query_err = |source| MigrationError::Query {
        version: None,
        source,
    };

    let mut stmt = conn
        .prepare(
            "SELECT version, description, executed_at
             FROM migrations
             ORDER BY version ASC",
        )
        .map_err(query_err)?;

    let rows = stmt.query_map([], row_to_entry).map_err(query_err)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.map_err(query_err)?);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`LedgerEntry`].
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let version: String = row.get(0)?;
    let description: Option<String> = row.get(1)?;
    let executed_str: String = row.get(2)?;

    let executed_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&executed_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(LedgerEntry {
        version: Version::from(version),
        description,
        executed_at,
    })
}
