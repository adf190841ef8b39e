use thiserror::Error;

use super::version::Version;

/// Failures raised while applying or reverting migrations.
///
/// Every variant names the phase that failed and, where one is involved, the
/// migration version.  None of them are retried; an operator fixes the cause
/// and re-invokes the runner, which skips whatever already committed.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The ledger table could not be verified or created.
    #[error("Could not create migration ledger: {source}")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },

    /// Looking up the ledger failed.
    #[error("Ledger query failed{}: {source}", version_suffix(.version))]
    Query {
        version: Option<Version>,
        #[source]
        source: rusqlite::Error,
    },

    /// A per-migration transaction could not be opened.
    #[error("Could not begin transaction for migration {version}: {source}")]
    Begin {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// A migration's `up` step failed; its transaction was rolled back.
    #[error("Migration {version} failed: {source}")]
    Execution {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// Inserting or deleting the ledger row failed; the transaction was
    /// rolled back along with the schema change it was paired with.
    #[error("Could not update ledger for migration {version}: {source}")]
    LedgerWrite {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// Commit failed after the change and the ledger write both succeeded.
    /// The resulting state must be reconciled by hand.
    #[error("Could not commit migration {version}: {source}")]
    Commit {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },

    /// A migration's `down` step failed; older migrations were left alone.
    #[error("Rollback of migration {version} failed: {source}")]
    Rollback {
        version: Version,
        #[source]
        source: rusqlite::Error,
    },
}

impl MigrationError {
    /// Version of the migration being processed when the failure happened.
    pub fn version(&self) -> Option<&Version> {
        match self {
            MigrationError::Schema { .. } => None,
            MigrationError::Query { version, .. } => version.as_ref(),
            MigrationError::Begin { version, .. }
            | MigrationError::Execution { version, .. }
            | MigrationError::LedgerWrite { version, .. }
            | MigrationError::Commit { version, .. }
            | MigrationError::Rollback { version, .. } => Some(version),
        }
    }

    /// Short name of the failed phase, suitable for structured log fields.
    pub fn phase(&self) -> &'static str {
        match self {
            MigrationError::Schema { .. } => "schema",
            MigrationError::Query { .. } => "query",
            MigrationError::Begin { .. } => "begin",
            MigrationError::Execution { .. } => "up",
            MigrationError::LedgerWrite { .. } => "ledger_write",
            MigrationError::Commit { .. } => "commit",
            MigrationError::Rollback { .. } => "down",
        }
    }
}

fn version_suffix(version: &Option<Version>) -> String {
    match version {
        Some(v) => format!(" for migration {v}"),
        None => String::new(),
    }
}
