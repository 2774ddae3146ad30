use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chinook_core::StoreConfig;
use tracing::debug;

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.chinook/.env
///
/// dotenvy never overwrites variables that are already set, so loading
/// the nearest file first gives it precedence. Runs before tracing is
/// initialised so `RUST_LOG` from a .env file takes effect; the outcome
/// is returned for [`log_dotenv`].
pub fn load_dotenv() -> Vec<Result<PathBuf, String>> {
    let mut outcome = Vec::new();
    if let Ok(path) = dotenvy::dotenv() {
        outcome.push(Ok(path));
    }

    if let Some(home_dir) = dirs::home_dir() {
        let env_file = home_dir.join(".chinook").join(".env");
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(_) => outcome.push(Ok(env_file)),
                Err(e) => outcome.push(Err(format!("Failed to load {}: {}", env_file.display(), e))),
            }
        }
    }
    outcome
}

/// Report what [`load_dotenv`] did once a subscriber is installed.
pub fn log_dotenv(outcome: &[Result<PathBuf, String>]) {
    for entry in outcome {
        match entry {
            Ok(path) => debug!("Loaded .env from {}", path.display()),
            Err(reason) => debug!("{}", reason),
        }
    }
}

/// Resolve store settings: file and environment, then the `--database` flag.
pub fn resolve(config_path: Option<&Path>, database: Option<&str>) -> Result<StoreConfig> {
    let mut config = StoreConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = database {
        config.database_url = url.to_string();
    }
    debug!(url = %config.database_url, "Resolved store configuration");
    Ok(config)
}
