//! Forward application and rollback of a [`MigrationSet`].

use std::collections::HashMap;

use rusqlite::Connection;

use super::error::MigrationError;
use super::ledger;
use super::version::Version;
use super::{Migration, MigrationSet};
use crate::models::{LedgerEntry, MigrationState, MigrationStatus, RollbackReport, RunReport};

/// Applies and reverts the migrations of a [`MigrationSet`].
///
/// Each migration runs in its own transaction: a failure aborts the call but
/// leaves every earlier migration committed, so re-running resumes at the
/// migration that failed.
#[derive(Debug)]
pub struct Migrator {
    migrations: MigrationSet,
}

impl Migrator {
    pub fn new(migrations: MigrationSet) -> Self {
        Self { migrations }
    }

    /// Apply every migration that is not yet in the ledger, in ascending
    /// version order.  Stops at the first failure.
    pub fn run(&self, conn: &mut Connection) -> Result<RunReport, MigrationError> {
        ledger::ensure_table(conn)?;

        let mut report = RunReport::default();

        for migration in self.migrations.sorted_ascending() {
            if ledger::is_applied(conn, migration.version())? {
                tracing::debug!(version = %migration.version(), "migration already applied");
                report.skipped.push(migration.version().clone());
                continue;
            }

            if let Err(e) = apply(conn, migration) {
                tracing::error!(
                    version = %migration.version(),
                    phase = e.phase(),
                    error = %e,
                    "migration failed"
                );
                return Err(e);
            }

            tracing::info!(
                version = %migration.version(),
                description = migration.description(),
                "applied migration"
            );
            report.applied.push(migration.version().clone());
        }

        Ok(report)
    }

    /// Revert every applied migration whose version is strictly greater than
    /// `target`, newest first.  The migration at `target` itself is kept.
    pub fn rollback(
        &self,
        conn: &mut Connection,
        target: &Version,
    ) -> Result<RollbackReport, MigrationError> {
        ledger::ensure_table(conn)?;

        let candidates: Vec<&Migration> = self
            .migrations
            .sorted_descending()
            .into_iter()
            .filter(|m| m.version() > target)
            .collect();

        let mut report = RollbackReport::default();

        for migration in candidates {
            if !ledger::is_applied(conn, migration.version())? {
                tracing::debug!(
                    version = %migration.version(),
                    "migration not applied, nothing to revert"
                );
                report.skipped.push(migration.version().clone());
                continue;
            }

            if let Err(e) = revert(conn, migration) {
                tracing::error!(
                    version = %migration.version(),
                    phase = e.phase(),
                    error = %e,
                    "rollback failed"
                );
                return Err(e);
            }

            tracing::info!(
                version = %migration.version(),
                description = migration.description(),
                "rolled back migration"
            );
            report.rolled_back.push(migration.version().clone());
        }

        tracing::info!(
            target_version = %target,
            count = report.rolled_back.len(),
            "rollback complete"
        );

        Ok(report)
    }

    /// Applied/pending state of every registered migration, ascending, with
    /// ledger rows that no registered migration accounts for appended as
    /// orphans.  Does not create the ledger table.
    pub fn status(&self, conn: &Connection) -> Result<Vec<MigrationStatus>, MigrationError> {
        let entries = if ledger::table_exists(conn)? {
            ledger::list_applied(conn)?
        } else {
            Vec::new()
        };

        let mut applied: HashMap<Version, LedgerEntry> = entries
            .into_iter()
            .map(|e| (e.version.clone(), e))
            .collect();

        let mut statuses = Vec::with_capacity(self.migrations.len());
        for migration in self.migrations.sorted_ascending() {
            let state = match applied.remove(migration.version()) {
                Some(entry) => MigrationState::Applied {
                    executed_at: entry.executed_at,
                },
                None => MigrationState::Pending,
            };
            statuses.push(MigrationStatus {
                version: migration.version().clone(),
                description: Some(migration.description().to_string()),
                state,
            });
        }

        let mut orphans: Vec<LedgerEntry> = applied.into_values().collect();
        orphans.sort_by(|a, b| a.version.cmp(&b.version));
        for entry in orphans {
            tracing::warn!(version = %entry.version, "ledger entry has no registered migration");
            statuses.push(MigrationStatus {
                version: entry.version,
                description: entry.description,
                state: MigrationState::Orphaned {
                    executed_at: entry.executed_at,
                },
            });
        }

        Ok(statuses)
    }

    /// Versions registered but not yet applied, ascending.
    pub fn pending(&self, conn: &Connection) -> Result<Vec<Version>, MigrationError> {
        Ok(self
            .status(conn)?
            .into_iter()
            .filter(|s| s.state == MigrationState::Pending)
            .map(|s| s.version)
            .collect())
    }
}

/// Run `up` and the ledger insert in one transaction.  Dropping the
/// transaction on any early return rolls it back.
fn apply(conn: &mut Connection, migration: &Migration) -> Result<(), MigrationError> {
    let version = migration.version();

    let tx = conn.transaction().map_err(|source| MigrationError::Begin {
        version: version.clone(),
        source,
    })?;

    migration
        .apply_up(&tx)
        .map_err(|source| MigrationError::Execution {
            version: version.clone(),
            source,
        })?;

    ledger::record_applied(&tx, version, migration.description())?;

    tx.commit().map_err(|source| MigrationError::Commit {
        version: version.clone(),
        source,
    })
}

/// Run `down` and the ledger delete in one transaction.
fn revert(conn: &mut Connection, migration: &Migration) -> Result<(), MigrationError> {
    let version = migration.version();

    let tx = conn.transaction().map_err(|source| MigrationError::Begin {
        version: version.clone(),
        source,
    })?;

    migration
        .apply_down(&tx)
        .map_err(|source| MigrationError::Rollback {
            version: version.clone(),
            source,
        })?;

    ledger::remove_applied(&tx, version)?;

    tx.commit().map_err(|source| MigrationError::Commit {
        version: version.clone(),
        source,
    })
}
