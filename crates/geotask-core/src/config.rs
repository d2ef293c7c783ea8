//! Store configuration model.
//!
//! `StoreConfig` mirrors `config.toml`; every field has a default so a partial
//! or missing file still yields a usable configuration.

use crate::error::GeotaskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Number of tasks in the tutorial.
pub const DEFAULT_TOTAL_TASKS: usize = 5;

/// Which session backend the store runs on.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON blob, read and rewritten on every operation
    #[default]
    Local,
    /// One JSON document per session in a collection directory
    Document,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Document => "document",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = GeotaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "document" => Ok(BackendKind::Document),
            other => Err(GeotaskError::config(format!(
                "unknown backend '{}', expected 'local' or 'document'",
                other
            ))),
        }
    }
}

fn default_total_tasks() -> usize {
    DEFAULT_TOTAL_TASKS
}

/// Store configuration, as read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_total_tasks")]
    pub total_tasks: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: None,
            total_tasks: DEFAULT_TOTAL_TASKS,
        }
    }
}
