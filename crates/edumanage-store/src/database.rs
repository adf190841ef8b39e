//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! the application schema is fully migrated before any other operation.  A
//! migration failure is fatal: no handle is returned and the caller is
//! expected to exit before serving traffic.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations::{MigrationSet, Migrator};
use crate::models::RunReport;
use crate::schema;

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "edumanage.db";

/// Wrapper around a migrated [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    startup: RunReport,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/edumanage/edumanage.db`
    /// - macOS:   `~/Library/Application Support/com.edumanage.edumanage/edumanage.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\edumanage\edumanage\data\edumanage.db`
    pub fn new() -> Result<Self> {
        let db_path = default_path()?;
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path and apply the
    /// application schema.
    pub fn open_at(path: &Path) -> Result<Self> {
        Self::open_with(connect(path)?, schema::migrations())
    }

    /// Open a private in-memory database with the application schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::open_with(conn, schema::migrations())
    }

    /// Run `migrations` against `conn` and wrap it.
    pub fn open_with(mut conn: Connection, migrations: MigrationSet) -> Result<Self> {
        let startup = Migrator::new(migrations).run(&mut conn)?;

        tracing::info!(
            applied = startup.applied.len(),
            already_applied = startup.skipped.len(),
            "database schema is up to date"
        );

        Ok(Self { conn, startup })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Migrations applied while this handle was opened.
    pub fn startup_report(&self) -> &RunReport {
        &self.startup
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

/// Platform-specific default location of the database file.
pub fn default_path() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("com", "edumanage", "edumanage").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().join(DB_FILE_NAME))
}

/// Open a connection with the recommended settings but **without** running
/// migrations.  Operator tooling uses this to inspect or roll back a schema.
pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::{ledger, Migration};
    use crate::MigrationError;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let db = Database::open_at(&path).expect("should open");
        assert!(db.path().is_some());
        assert_eq!(db.startup_report().applied.len(), schema::migrations().len());
    }

    #[test]
    fn reopen_applies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        drop(Database::open_at(&path).unwrap());
        let db = Database::open_at(&path).unwrap();

        assert!(db.startup_report().applied.is_empty());
        assert_eq!(db.startup_report().skipped.len(), schema::migrations().len());
    }

    #[test]
    fn failed_migration_refuses_to_open() {
        let conn = Connection::open_in_memory().unwrap();
        let set = MigrationSet::builder()
            .add_migration(Migration::sql("0001", "broken", "CREATE TABLE (", ""))
            .build();

        let err = Database::open_with(conn, set).err().expect("open should fail");
        assert!(matches!(err, StoreError::Migration(MigrationError::Execution { .. })));
    }

    #[test]
    fn in_memory_has_application_tables() {
        let db = Database::open_in_memory().unwrap();

        let users: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 0);
        assert!(db.path().map_or(true, |p| p.as_os_str().is_empty()));
        assert_eq!(ledger::list_applied(db.conn()).unwrap().len(), schema::migrations().len());
    }

    #[test]
    fn connect_does_not_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connect(&dir.path().join("raw.db")).unwrap();
        assert!(!ledger::table_exists(&conn).unwrap());
    }
}
