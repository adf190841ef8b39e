//! Command-line interface and command handlers.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edumanage_store::database::{self, Database};
use edumanage_store::{schema, MigrationState, MigrationStatus, Migrator, Version};
use tracing::info;

use crate::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "edumanage")]
#[command(version)]
#[command(about = "Schema migration tool for the edumanage backend")]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    /// Database file (overrides EDUMANAGE_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply all pending migrations
    Migrate,

    /// Revert every applied migration newer than the target version
    Rollback {
        /// Version to keep as the new baseline (e.g. 0002). Use 0000 to revert everything.
        #[arg(long = "to", value_name = "VERSION")]
        to: String,
    },

    /// Show applied and pending migrations
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Run `command` against the configured database, writing user-facing
/// output to `out`.
pub fn execute(command: &Command, config: &ServerConfig, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Migrate => migrate(config, out),
        Command::Rollback { to } => rollback(config, &Version::from(to.as_str()), out),
        Command::Status { json } => status(config, *json, out),
    }
}

fn migrate(config: &ServerConfig, out: &mut dyn Write) -> Result<()> {
    let db = match &config.db_path {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
    .context("failed to open and migrate database")?;

    let report = db.startup_report();
    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "migrate finished"
    );

    if report.applied.is_empty() {
        writeln!(out, "Database is up to date")?;
    } else {
        for version in &report.applied {
            writeln!(out, "applied  {version}")?;
        }
    }
    Ok(())
}

fn rollback(config: &ServerConfig, target: &Version, out: &mut dyn Write) -> Result<()> {
    let mut conn = open_raw(config)?;

    let report = Migrator::new(schema::migrations())
        .rollback(&mut conn, target)
        .with_context(|| format!("rollback to {target} failed"))?;

    if report.rolled_back.is_empty() {
        writeln!(out, "Nothing to roll back above {target}")?;
    } else {
        for version in &report.rolled_back {
            writeln!(out, "reverted {version}")?;
        }
    }
    Ok(())
}

fn status(config: &ServerConfig, json: bool, out: &mut dyn Write) -> Result<()> {
    let conn = open_raw(config)?;

    let statuses = Migrator::new(schema::migrations())
        .status(&conn)
        .context("failed to read migration ledger")?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &statuses)?;
        writeln!(out)?;
    } else {
        for line in statuses.iter().map(format_status) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// Connection without running migrations: rollback and status must see the
/// schema as it is.
fn open_raw(config: &ServerConfig) -> Result<rusqlite::Connection> {
    let path = match &config.db_path {
        Some(path) => path.clone(),
        None => database::default_path()?,
    };
    info!(path = %path.display(), "opening database");
    database::connect(&path).with_context(|| format!("failed to open {}", path.display()))
}

fn format_status(status: &MigrationStatus) -> String {
    let description = status.description.as_deref().unwrap_or("");
    match &status.state {
        MigrationState::Applied { executed_at } => {
            format!("{}  applied   {}  {}", status.version, executed_at.to_rfc3339(), description)
        }
        MigrationState::Pending => {
            format!("{}  pending   {:25}  {}", status.version, "-", description)
        }
        MigrationState::Orphaned { executed_at } => {
            format!("{}  orphaned  {}  {}", status.version, executed_at.to_rfc3339(), description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            db_path: Some(dir.path().join("edumanage.db")),
            ..ServerConfig::default()
        }
    }

    fn run(command: Command, config: &ServerConfig) -> String {
        let mut out = Vec::new();
        execute(&command, config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_rollback() {
        let args = ["edumanage", "--db", "/tmp/x.db", "rollback", "--to", "0002"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Command::Rollback { ref to } if to == "0002"));
    }

    #[test]
    fn test_rollback_requires_target() {
        assert!(Cli::try_parse_from(["edumanage", "rollback"]).is_err());
    }

    #[test]
    fn test_migrate_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);

        let first = run(Command::Migrate, &config);
        assert!(first.contains("applied  0001"));
        assert!(first.contains("applied  0006"));

        let second = run(Command::Migrate, &config);
        assert_eq!(second.trim(), "Database is up to date");

        let table = run(Command::Status { json: false }, &config);
        assert_eq!(table.lines().count(), schema::migrations().len());
        assert!(table.lines().all(|l| l.contains("applied")));
    }

    #[test]
    fn test_rollback_then_json_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);
        run(Command::Migrate, &config);

        let out = run(Command::Rollback { to: "0004".to_string() }, &config);
        assert_eq!(out.lines().collect::<Vec<_>>(), vec!["reverted 0006", "reverted 0005"]);

        let json = run(Command::Status { json: true }, &config);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let states: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["state"].as_str().unwrap())
            .collect();
        assert_eq!(
            states,
            vec!["applied", "applied", "applied", "applied", "pending", "pending"]
        );
    }

    #[test]
    fn test_status_on_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir);

        let table = run(Command::Status { json: false }, &config);
        assert!(table.lines().all(|l| l.contains("pending")));
    }
}
