//! # edumanage
//!
//! Operator tool for the edumanage backend database.
//!
//! This binary provides:
//! - **migrate**: apply every pending schema migration (what the API server
//!   does on startup, refusing to serve if it fails)
//! - **rollback**: revert applied migrations newer than a target version
//! - **status**: list applied, pending and orphaned migrations

mod cli;
mod config;

use std::io;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{ServerConfig, DEFAULT_LOG_FILTER};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env().with_db_override(cli.db.clone());

    // -----------------------------------------------------------------------
    // 2. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    init_tracing(config.log_json);

    info!("Starting edumanage v{}", env!("CARGO_PKG_VERSION"));
    for (name, value) in &config.rejected {
        warn!(variable = *name, value = %value, "Invalid environment value, using default");
    }
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Run the command
    // -----------------------------------------------------------------------
    let stdout = io::stdout();
    let mut out = stdout.lock();
    // anyhow reports the error chain on stderr when `main` returns it.
    cli::execute(&cli.command, &config, &mut out)
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so command output on stdout stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
