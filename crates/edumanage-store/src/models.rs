//! Records read from, and reports produced by, the migration ledger.
//!
//! Every struct derives `Serialize` so the operator CLI can print it as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::migrations::Version;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// One row of the `migrations` ledger table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Version of the applied migration (primary key).
    pub version: Version,
    /// Description captured when the migration was applied.
    pub description: Option<String>,
    /// When the migration was committed.
    pub executed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// State of a single version as seen by [`crate::migrations::Migrator::status`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MigrationState {
    /// Registered and recorded in the ledger.
    Applied { executed_at: DateTime<Utc> },
    /// Registered but not yet applied.
    Pending,
    /// Recorded in the ledger but no longer registered.
    Orphaned { executed_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: Version,
    pub description: Option<String>,
    #[serde(flatten)]
    pub state: MigrationState,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of a successful [`crate::migrations::Migrator::run`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    /// Versions applied by this call, in application order.
    pub applied: Vec<Version>,
    /// Versions that were already in the ledger.
    pub skipped: Vec<Version>,
}

/// Outcome of a successful [`crate::migrations::Migrator::rollback`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbackReport {
    /// Versions reverted by this call, newest first.
    pub rolled_back: Vec<Version>,
    /// Versions above the target that were not applied.
    pub skipped: Vec<Version>,
}
