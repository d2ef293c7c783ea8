pub mod result;
pub mod session_id;
pub mod sessions;

use anyhow::{Context, Result};
use geotask_core::ResultStore;
use geotask_core::config::{BackendKind, StoreConfig};
use geotask_core::session::SessionIdentityProvider;
use geotask_infrastructure::config_service::DATA_DIR_ENV;
use geotask_infrastructure::{ConfigService, FileSessionIdentity, open_session_backend};
use std::path::PathBuf;

/// Command-line values that take precedence over config.toml.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
}

/// Loads the config file and layers the environment and flags on top.
pub fn resolve_config(overrides: &Overrides) -> Result<StoreConfig> {
    let config = match &overrides.config {
        Some(path) => ConfigService::load(path),
        None => ConfigService::load_default(),
    }
    .context("Failed to load configuration")?;

    Ok(apply_overrides(
        config,
        overrides,
        std::env::var(DATA_DIR_ENV).ok(),
    ))
}

fn apply_overrides(
    config: StoreConfig,
    overrides: &Overrides,
    data_dir_env: Option<String>,
) -> StoreConfig {
    let mut config = ConfigService::apply_env_overrides(config, data_dir_env);
    if let Some(dir) = &overrides.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(backend) = overrides.backend {
        config.backend = backend;
    }
    config
}

/// Everything a command needs: the store, the identity and the config.
pub struct App {
    pub config: StoreConfig,
    pub store: ResultStore,
    pub identity: FileSessionIdentity,
}

impl App {
    pub async fn open(overrides: Overrides) -> Result<Self> {
        let config = resolve_config(&overrides)?;
        let data_dir = ConfigService::resolve_data_dir(&config)?;
        tracing::debug!(
            "Using {} backend in {}",
            config.backend,
            data_dir.display()
        );

        let backend = open_session_backend(config.backend, &data_dir)
            .await
            .with_context(|| format!("Failed to open {} backend", config.backend))?;

        Ok(Self {
            identity: FileSessionIdentity::new(&data_dir),
            store: ResultStore::new(backend),
            config,
        })
    }

    /// The explicit session if given, otherwise the current one.
    pub async fn session_or_current(&self, session: Option<String>) -> Result<String> {
        match session {
            Some(id) => Ok(id),
            None => Ok(self
                .identity
                .get_or_create_session_id()
                .await
                .context("Cannot determine the current session")?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_env_and_file() {
        let file_config = StoreConfig {
            backend: BackendKind::Local,
            data_dir: Some(PathBuf::from("/from/file")),
            total_tasks: 8,
        };

        let env_only = apply_overrides(
            file_config.clone(),
            &Overrides::default(),
            Some("/from/env".to_string()),
        );
        assert_eq!(env_only.data_dir, Some(PathBuf::from("/from/env")));

        let flags = Overrides {
            config: None,
            data_dir: Some(PathBuf::from("/from/flag")),
            backend: Some(BackendKind::Document),
        };
        let merged = apply_overrides(file_config, &flags, Some("/from/env".to_string()));
        assert_eq!(merged.data_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(merged.backend, BackendKind::Document);
        assert_eq!(merged.total_tasks, 8);
    }
}
