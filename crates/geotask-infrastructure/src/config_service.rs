//! Configuration service implementation.
//!
//! Loads the store configuration from the configuration file
//! (`~/.config/geotask/config.toml`) and resolves the data directory.

use crate::paths::GeotaskPaths;
use geotask_core::config::StoreConfig;
use geotask_core::error::{GeotaskError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GEOTASK_DATA_DIR";

/// Loads `StoreConfig` and applies overrides.
pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration at `path`.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// `GeotaskError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<StoreConfig> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(StoreConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            GeotaskError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(StoreConfig::default());
        }

        toml::from_str(&content)
            .map_err(|e| GeotaskError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Loads the configuration from the platform config file.
    pub fn load_default() -> Result<StoreConfig> {
        let path = GeotaskPaths::config_file().map_err(|e| GeotaskError::config(e.to_string()))?;
        Self::load(&path)
    }

    /// Applies environment overrides.
    ///
    /// `data_dir_env` is the value of [`DATA_DIR_ENV`], if set.
    pub fn apply_env_overrides(mut config: StoreConfig, data_dir_env: Option<String>) -> StoreConfig {
        if let Some(dir) = data_dir_env.filter(|dir| !dir.trim().is_empty()) {
            tracing::debug!("{} overrides data directory: {}", DATA_DIR_ENV, dir);
            config.data_dir = Some(PathBuf::from(dir));
        }
        config
    }

    /// Returns the data directory the backends and identity should use.
    ///
    /// The configured directory (with `~` expanded) wins over the platform
    /// default.
    pub fn resolve_data_dir(config: &StoreConfig) -> Result<PathBuf> {
        let resolved = match &config.data_dir {
            Some(dir) => GeotaskPaths::expand_home(dir),
            None => GeotaskPaths::data_dir(),
        };
        resolved.map_err(|e| GeotaskError::config(e.to_string()))
    }
}
