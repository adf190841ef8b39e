//! Configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the tool can run with zero
//! configuration for local development.

use std::path::PathBuf;

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,edumanage_store=debug,edumanage=debug";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Path of the SQLite database file.
    /// Env: `EDUMANAGE_DB_PATH`
    /// Default: platform data directory (see `Database::new`).
    pub db_path: Option<PathBuf>,

    /// Emit JSON log lines instead of human-readable ones.
    /// Env: `EDUMANAGE_LOG_JSON` (true/false)
    /// Default: `false`
    pub log_json: bool,

    /// Variables that were set but could not be parsed, as `(name, value)`.
    /// Logged once tracing is initialised.
    pub rejected: Vec<(&'static str, String)>,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("EDUMANAGE_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("EDUMANAGE_LOG_JSON") {
            match parse_bool(&val) {
                Some(b) => config.log_json = b,
                None => config.rejected.push(("EDUMANAGE_LOG_JSON", val)),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_db_override(mut self, db: Option<PathBuf>) -> Self {
        if db.is_some() {
            self.db_path = db;
        }
        self
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert!(config.db_path.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("EDUMANAGE_DB_PATH", "/tmp/edu.db"),
            ("EDUMANAGE_LOG_JSON", "true"),
        ]));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/edu.db")));
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_bool_keeps_default() {
        let config = ServerConfig::from_lookup(lookup(&[("EDUMANAGE_LOG_JSON", "maybe")]));
        assert!(!config.log_json);
        assert_eq!(config.rejected, vec![("EDUMANAGE_LOG_JSON", "maybe".to_string())]);
    }

    #[test]
    fn test_cli_override_wins() {
        let config = ServerConfig::from_lookup(lookup(&[("EDUMANAGE_DB_PATH", "/tmp/env.db")]))
            .with_db_override(Some(PathBuf::from("/tmp/cli.db")));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/cli.db")));

        let kept = ServerConfig::from_lookup(lookup(&[("EDUMANAGE_DB_PATH", "/tmp/env.db")]))
            .with_db_override(None);
        assert_eq!(kept.db_path, Some(PathBuf::from("/tmp/env.db")));
    }
}
