//! File-backed session identity.

use crate::paths::GeotaskPaths;
use async_trait::async_trait;
use geotask_core::error::{GeotaskError, Result};
use geotask_core::session::SessionIdentityProvider;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Keeps the current session id in a small text file.
///
/// The file lives in the same data directory as the local session blob, so
/// the identity and the sessions it refers to are cleared together.
pub struct FileSessionIdentity {
    path: PathBuf,
}

impl FileSessionIdentity {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: GeotaskPaths::session_id_file(data_dir.as_ref()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, action: &str, err: std::io::Error) -> GeotaskError {
        GeotaskError::identity_unavailable(format!(
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            err
        ))
    }

    fn read_existing(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.unavailable("read", e)),
        }
    }

    /// Synchronous variant of [`SessionIdentityProvider::get_or_create_session_id`].
    pub fn get_or_create_session_id_sync(&self) -> Result<String> {
        if let Some(id) = self.read_existing()? {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.unavailable("create directory for", e))?;
        }
        fs::write(&self.path, &id).map_err(|e| self.unavailable("write", e))?;

        tracing::info!("Started new session {}", id);
        Ok(id)
    }

    /// Synchronous variant of [`SessionIdentityProvider::reset`].
    pub fn reset_sync(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Cleared session identity at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.unavailable("remove", e)),
        }
    }
}

#[async_trait]
impl SessionIdentityProvider for FileSessionIdentity {
    async fn get_or_create_session_id(&self) -> Result<String> {
        self.get_or_create_session_id_sync()
    }

    async fn reset(&self) -> Result<()> {
        self.reset_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotask_core::session::SessionContext;
    use tempfile::TempDir;

    #[test]
    fn test_id_is_created_once() {
        let temp_dir = TempDir::new().unwrap();
        let identity = FileSessionIdentity::new(temp_dir.path());

        let first = identity.get_or_create_session_id_sync().unwrap();
        let second = identity.get_or_create_session_id_sync().unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_id_survives_new_provider_instance() {
        let temp_dir = TempDir::new().unwrap();
        let first = FileSessionIdentity::new(temp_dir.path())
            .get_or_create_session_id_sync()
            .unwrap();
        let second = FileSessionIdentity::new(temp_dir.path())
            .get_or_create_session_id_sync()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_starts_new_session() {
        let temp_dir = TempDir::new().unwrap();
        let identity = FileSessionIdentity::new(temp_dir.path());

        let first = identity.get_or_create_session_id_sync().unwrap();
        identity.reset_sync().unwrap();
        identity.reset_sync().unwrap();
        let second = identity.get_or_create_session_id_sync().unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_blank_file_gets_new_id() {
        let temp_dir = TempDir::new().unwrap();
        let identity = FileSessionIdentity::new(temp_dir.path());
        fs::write(identity.path(), "\n").unwrap();

        let id = identity.get_or_create_session_id_sync().unwrap();
        assert!(!id.is_empty());
        assert_eq!(fs::read_to_string(identity.path()).unwrap(), id);
    }

    #[test]
    fn test_unwritable_location_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let identity = FileSessionIdentity::new(&blocker);

        let err = identity.get_or_create_session_id_sync().unwrap_err();
        assert!(err.is_identity_unavailable());
    }

    #[tokio::test]
    async fn test_resolve_context() {
        let temp_dir = TempDir::new().unwrap();
        let identity = FileSessionIdentity::new(temp_dir.path());

        let context = SessionContext::resolve(&identity).await.unwrap();
        assert_eq!(
            context.session_id(),
            identity.get_or_create_session_id().await.unwrap()
        );
    }
}
