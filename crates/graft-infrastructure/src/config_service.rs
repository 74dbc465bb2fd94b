//! Configuration loading.
//!
//! Precedence, lowest first: built-in defaults, `config.toml`, `GRAFT_*`
//! environment variables. Command-line overrides are applied by the caller on
//! top of the returned value.

use std::path::{Path, PathBuf};

use graft_core::config::GraftConfig;
use graft_core::error::{GraftError, Result};

use crate::paths::GraftPaths;

pub const ENV_SOURCE_URL: &str = "GRAFT_SOURCE_URL";
pub const ENV_SOURCE_API_KEY: &str = "GRAFT_SOURCE_API_KEY";
pub const ENV_TARGET_URL: &str = "GRAFT_TARGET_URL";
pub const ENV_TARGET_API_KEY: &str = "GRAFT_TARGET_API_KEY";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration from `explicit_path`, or from the default
    /// location when `None`, then applies environment overrides.
    ///
    /// An explicit path must exist. A missing default file is not an error;
    /// everything can come from the environment.
    pub fn load(explicit_path: Option<&Path>) -> Result<GraftConfig> {
        let mut config = match explicit_path {
            Some(path) => Self::load_file(path)?,
            None => match GraftPaths::config_file() {
                Ok(path) if path.exists() => Self::load_file(&path)?,
                Ok(_) => GraftConfig::default(),
                Err(e) => {
                    tracing::debug!("No default config location: {}", e);
                    GraftConfig::default()
                }
            },
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses one TOML file.
    pub fn load_file(path: &Path) -> Result<GraftConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GraftError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: GraftConfig = toml::from_str(&content).map_err(|e| {
            GraftError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Location used when no path is given.
    pub fn default_path() -> Option<PathBuf> {
        GraftPaths::config_file().ok()
    }
}

/// Overwrites endpoint fields with non-empty values returned by `lookup`.
pub fn apply_env_overrides<F>(config: &mut GraftConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = value(ENV_SOURCE_URL) {
        config.source.url = url;
    }
    if let Some(api_key) = value(ENV_SOURCE_API_KEY) {
        config.source.api_key = api_key;
    }
    if let Some(url) = value(ENV_TARGET_URL) {
        config.target.url = url;
    }
    if let Some(api_key) = value(ENV_TARGET_API_KEY) {
        config.target.api_key = api_key;
    }
}
