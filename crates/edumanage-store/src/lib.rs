//! # edumanage-store
//!
//! Persistent storage for the edumanage backend, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that refuses to open
//! until every schema migration has been applied, plus the migration runner
//! itself ([`migrations`]) for operator tooling that needs to inspect or roll
//! back the schema.

pub mod database;
pub mod migrations;
pub mod models;
pub mod schema;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use migrations::{Migration, MigrationError, MigrationSet, Migrator, Version};
pub use models::*;
