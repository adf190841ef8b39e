//! Migration version identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a single migration.
///
/// Versions are compared as **plain strings**.  Nothing here parses them as
/// numbers or dates, so the scheme you pick must sort correctly as text:
/// zero-padded sequence numbers (`"0001"`, `"0002"`, ...) or ISO-8601 style
/// timestamps (`"20240131T120000"`) both work.  Unpadded numbers do not:
/// `"2"` sorts *after* `"10"`.
///
/// Both forward application and the rollback boundary depend on this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self(value)
    }
}
