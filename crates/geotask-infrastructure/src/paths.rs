//! Unified path management for geotask files.
//!
//! Platform directories are resolved via AppPaths from the version-migrate
//! crate, the same mechanism AsyncDirStorage uses for the document backend.

use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for geotask.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/geotask/           # Config directory
/// └── config.toml              # Store configuration
///
/// ~/.local/share/geotask/      # Data directory (or `data_dir` from config)
/// ├── current_session_id       # Session identity
/// ├── sessions.json            # Local backend blob
/// └── sessions/                # Document backend collection
///     └── <session id>.json
/// ```
pub struct GeotaskPaths;

impl GeotaskPaths {
    /// File name of the local backend blob.
    pub const SESSIONS_BLOB: &'static str = "sessions.json";
    /// Collection directory of the document backend.
    pub const SESSIONS_COLLECTION: &'static str = "sessions";
    /// File holding the current session id.
    pub const SESSION_ID_FILE: &'static str = "current_session_id";

    fn app_paths() -> AppPaths {
        AppPaths::new("geotask")
    }

    /// Returns the geotask configuration directory (e.g. `~/.config/geotask/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the default data directory (e.g. `~/.local/share/geotask/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .data_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path of the local backend blob inside `data_dir`.
    pub fn sessions_blob(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::SESSIONS_BLOB)
    }

    /// Path of the session identity file inside `data_dir`.
    pub fn session_id_file(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::SESSION_ID_FILE)
    }

    /// Expands a leading `~` to the home directory.
    ///
    /// Paths without a leading `~` are returned unchanged.
    pub fn expand_home(path: &Path) -> Result<PathBuf, PathError> {
        match path.strip_prefix("~") {
            Ok(rest) => {
                let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
                Ok(home.join(rest))
            }
            Err(_) => Ok(path.to_path_buf()),
        }
    }
}
