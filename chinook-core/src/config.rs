//! Store configuration
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. TOML file (`~/.chinook/config.toml`, or an explicit path)
//! 3. `CHINOOK_DATABASE_URL`, then `DATABASE_URL`
//!
//! Command-line overrides are applied by the caller on the returned value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Default database location, relative to the working directory
const DEFAULT_DATABASE_URL: &str = "sqlite://chinook.db";

/// Kept low: one interactive caller at a time.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Environment variables consulted for the database URL, highest priority first
const DATABASE_URL_VARS: [&str; 2] = ["CHINOOK_DATABASE_URL", "DATABASE_URL"];

/// Connection settings for [`SqliteCustomerStore`](crate::SqliteCustomerStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite connection string, e.g. `sqlite://chinook.db`
    pub database_url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Seconds to wait on a locked database before failing
    pub busy_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }
}

/// On-disk layout: settings live under a `[database]` table
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: StoreConfig,
}

impl StoreConfig {
    /// Default config file path (~/.chinook/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".chinook").join("config.toml"))
    }

    /// Load configuration from an explicit file, or the default file if
    /// it exists, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        let config = config.with_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&content)
    }

    /// Parse TOML config text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| StoreError::config(format!("invalid TOML: {}", e)))?;
        Ok(file.database)
    }

    /// Apply database URL overrides from an environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = DATABASE_URL_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
        {
            self.database_url = url;
        }
        self
    }

    /// Reject settings that cannot open a pool.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(StoreError::config("database_url must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(StoreError::config("max_connections must be at least 1"));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}
