//! Versioned, transactional schema migrations.
//!
//! A [`MigrationSet`] is built once at startup and moved into a [`Migrator`].
//! [`Migrator::run`] applies every pending migration in ascending version
//! order, one transaction per migration, and records each in the `migrations`
//! ledger table.  [`Migrator::rollback`] reverts applied migrations above a
//! target version, newest first.
//!
//! Migration bodies receive the runner's [`Transaction`], never the bare
//! connection, so their statements commit or roll back together with the
//! ledger row.

mod error;
pub mod ledger;
mod runner;
mod version;

use std::collections::HashSet;
use std::fmt;

use rusqlite::Transaction;

pub use error::MigrationError;
pub use runner::Migrator;
pub use version::Version;

/// Body of an `up` or `down` step.
pub type MigrationFn = Box<dyn Fn(&Transaction<'_>) -> rusqlite::Result<()> + Send + Sync>;

/// A named, ordered, reversible unit of schema or data change.
pub struct Migration {
    version: Version,
    description: String,
    up: MigrationFn,
    down: MigrationFn,
}

impl Migration {
    pub fn new<U, D>(
        version: impl Into<Version>,
        description: impl Into<String>,
        up: U,
        down: D,
    ) -> Self
    where
        U: Fn(&Transaction<'_>) -> rusqlite::Result<()> + Send + Sync + 'static,
        D: Fn(&Transaction<'_>) -> rusqlite::Result<()> + Send + Sync + 'static,
    {
        Self {
            version: version.into(),
            description: description.into(),
            up: Box::new(up),
            down: Box::new(down),
        }
    }

    /// Migration whose steps are plain SQL batches.
    pub fn sql(
        version: impl Into<Version>,
        description: impl Into<String>,
        up_sql: &'static str,
        down_sql: &'static str,
    ) -> Self {
        Self::new(
            version,
            description,
            move |tx: &Transaction<'_>| tx.execute_batch(up_sql),
            move |tx: &Transaction<'_>| tx.execute_batch(down_sql),
        )
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn apply_up(&self, tx: &Transaction<'_>) -> rusqlite::Result<()> {
        (self.up)(tx)
    }

    pub(crate) fn apply_down(&self, tx: &Transaction<'_>) -> rusqlite::Result<()> {
        (self.down)(tx)
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable collection of migrations, kept in registration order.
///
/// Registration order does not need to match version order; the runner sorts.
/// Versions are expected to be unique but are not enforced: duplicates are
/// logged at build time and kept in registration order by the stable sort.
#[derive(Debug, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    pub fn builder() -> MigrationSetBuilder {
        MigrationSetBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Registered versions in registration order.
    pub fn versions(&self) -> Vec<&Version> {
        self.migrations.iter().map(Migration::version).collect()
    }

    /// Snapshot sorted by version, ascending.  The sort is stable.
    pub fn sorted_ascending(&self) -> Vec<&Migration> {
        let mut sorted: Vec<&Migration> = self.migrations.iter().collect();
        sorted.sort_by(|a, b| a.version.cmp(&b.version));
        sorted
    }

    /// Snapshot sorted by version, descending.  The sort is stable.
    pub fn sorted_descending(&self) -> Vec<&Migration> {
        let mut sorted: Vec<&Migration> = self.migrations.iter().collect();
        sorted.sort_by(|a, b| b.version.cmp(&a.version));
        sorted
    }
}

/// Accumulates migrations before freezing them into a [`MigrationSet`].
#[derive(Debug, Default)]
pub struct MigrationSetBuilder {
    migrations: Vec<Migration>,
}

impl MigrationSetBuilder {
    /// Register a migration from its parts.
    pub fn add<U, D>(
        self,
        version: impl Into<Version>,
        description: impl Into<String>,
        up: U,
        down: D,
    ) -> Self
    where
        U: Fn(&Transaction<'_>) -> rusqlite::Result<()> + Send + Sync + 'static,
        D: Fn(&Transaction<'_>) -> rusqlite::Result<()> + Send + Sync + 'static,
    {
        self.add_migration(Migration::new(version, description, up, down))
    }

    pub fn add_migration(mut self, migration: Migration) -> Self {
        self.migrations.push(migration);
        self
    }

    pub fn build(self) -> MigrationSet {
        let mut seen = HashSet::new();
        for migration in &self.migrations {
            if !seen.insert(migration.version.as_str()) {
                tracing::warn!(
                    version = %migration.version,
                    description = %migration.description,
                    "duplicate migration version registered"
                );
            }
        }

        MigrationSet {
            migrations: self.migrations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Transaction<'_>) -> rusqlite::Result<()> {
        Ok(())
    }

    #[test]
    fn test_builder_keeps_registration_order() {
        let set = MigrationSet::builder()
            .add("0003", "c", noop, noop)
            .add("0001", "a", noop, noop)
            .add("0002", "b", noop, noop)
            .build();

        let versions: Vec<&str> = set.versions().into_iter().map(Version::as_str).collect();
        assert_eq!(versions, vec!["0003", "0001", "0002"]);
    }

    #[test]
    fn test_sorted_snapshots() {
        let set = MigrationSet::builder()
            .add("0003", "c", noop, noop)
            .add("0001", "a", noop, noop)
            .add("0002", "b", noop, noop)
            .build();

        let asc: Vec<&str> = set
            .sorted_ascending()
            .iter()
            .map(|m| m.version().as_str())
            .collect();
        let desc: Vec<&str> = set
            .sorted_descending()
            .iter()
            .map(|m| m.version().as_str())
            .collect();
        assert_eq!(asc, vec!["0001", "0002", "0003"]);
        assert_eq!(desc, vec!["0003", "0002", "0001"]);
    }

    #[test]
    fn test_sort_is_stable_for_duplicates() {
        let set = MigrationSet::builder()
            .add("0002", "second-a", noop, noop)
            .add("0001", "first", noop, noop)
            .add("0002", "second-b", noop, noop)
            .build();

        let asc: Vec<&str> = set.sorted_ascending().iter().map(|m| m.description()).collect();
        assert_eq!(asc, vec!["first", "second-a", "second-b"]);
    }

    #[test]
    fn test_len() {
        let set = MigrationSet::builder().add("0001", "a", noop, noop).build();
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(MigrationSet::builder().build().is_empty());
    }
}
