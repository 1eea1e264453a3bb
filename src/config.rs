use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::rules::DEFAULT_MAX_SUBSET_CANDIDATES;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Statements slower than this are logged at warn level.
    pub slow_statement_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// CSV with `bank_prefix,field,pattern`
    pub rule_table_path: Option<PathBuf>,
    /// CSV with `bank_name,entity_name,source`
    pub entity_table_path: Option<PathBuf>,
    pub max_subset_candidates: usize,
    /// When set, every DB-backed batch is also written here as CSV.
    pub export_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/errand_payments".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_secs: 5,
            },
            matching: MatchingConfig {
                rule_table_path: None,
                entity_table_path: None,
                max_subset_candidates: DEFAULT_MAX_SUBSET_CANDIDATES,
                export_path: None,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default.*` if present, then `MATCHER__*`
    /// environment variables. `DATABASE_URL` overrides the database url.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Some("config/default"))
    }

    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default(
                "database.acquire_timeout_secs",
                defaults.database.acquire_timeout_secs as i64,
            )?
            .set_default(
                "database.slow_statement_secs",
                defaults.database.slow_statement_secs as i64,
            )?
            .set_default(
                "matching.max_subset_candidates",
                defaults.matching.max_subset_candidates as i64,
            )?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("MATCHER")
                .prefix_separator("__")
                .separator("__"),
        );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}
