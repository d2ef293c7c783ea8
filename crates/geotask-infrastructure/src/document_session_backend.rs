//! AsyncDirStorage-based SessionBackend implementation
//!
//! Each session is one JSON document in the `sessions` collection, addressed
//! by its id. Every call is asynchronous and may fail independently.

use crate::dto::create_session_migrator;
use crate::paths::GeotaskPaths;
use async_trait::async_trait;
use geotask_core::error::{GeotaskError, Result};
use geotask_core::session::{Session, SessionBackend};
use std::path::{Path, PathBuf};
use tokio::fs;
use version_migrate::{
    AppPaths, AsyncDirStorage, DirStorageStrategy, FilenameEncoding, FormatStrategy, Migrator,
    PathStrategy,
};

/// Document-collection session backend.
///
/// Directory structure:
/// ```text
/// base_dir/
/// └── sessions/
///     ├── session-id-1.json
///     └── user.42.json
/// ```
///
/// File names are URL-encoded ids, so any session id is addressable.
pub struct DocumentSessionBackend {
    storage: AsyncDirStorage,
    migrator: Migrator,
}

fn is_not_found(error: &str) -> bool {
    error.contains("No such file or directory")
        || error.contains("not found")
        || error.contains("cannot find")
}

impl DocumentSessionBackend {
    /// Creates a new DocumentSessionBackend.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Directory holding the `sessions` collection
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Directory creation fails
    /// - AsyncDirStorage initialization fails
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir).await.map_err(|e| {
            GeotaskError::io(format!(
                "Failed to create base directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;

        // CustomBase keeps the collection next to the local blob and identity file
        let paths = AppPaths::new("geotask").data_strategy(PathStrategy::CustomBase(base_dir));

        let strategy = DirStorageStrategy::default()
            .with_format(FormatStrategy::Json)
            .with_filename_encoding(FilenameEncoding::UrlEncode);

        let storage = AsyncDirStorage::new(
            paths,
            GeotaskPaths::SESSIONS_COLLECTION,
            create_session_migrator(),
            strategy,
        )
        .await
        .map_err(|e| GeotaskError::data_access(format!("Failed to open session collection: {}", e)))?;

        Ok(Self {
            storage,
            migrator: create_session_migrator(),
        })
    }

    /// Returns the directory holding the session documents.
    pub fn sessions_dir(&self) -> &Path {
        self.storage.base_path()
    }

    /// Loads each document on its own, skipping the ones that fail.
    ///
    /// Documents are decoded from their content, so the session id comes from
    /// the document rather than the encoded file name.
    async fn list_documents_individually(&self) -> Result<Vec<Session>> {
        let mut entries = fs::read_dir(self.sessions_dir()).await?;
        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }

        let mut sessions = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_document(&path).await {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(
                    "Skipping malformed session document {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        Ok(sessions)
    }

    async fn load_document(&self, path: &Path) -> Result<Session> {
        let content = fs::read_to_string(path).await?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        Ok(self.migrator.load_flat_from("session", value)?)
    }
}

#[async_trait]
impl SessionBackend for DocumentSessionBackend {
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        match self.storage.load::<Session>("session", session_id).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                let error_str = e.to_string();
                if is_not_found(&error_str) {
                    return Ok(None);
                }
                Err(GeotaskError::data_access(format!(
                    "Failed to load session {}: {}",
                    session_id, error_str
                )))
            }
        }
    }

    async fn put_session(&self, session: &Session) -> Result<()> {
        self.storage
            .save("session", &session.id, session)
            .await
            .map_err(|e| {
                GeotaskError::data_access(format!("Failed to save session {}: {}", session.id, e))
            })?;
        tracing::debug!("Wrote session document {}", session.id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        match self.storage.load_all::<Session>("session").await {
            Ok(all_sessions) => Ok(all_sessions
                .into_iter()
                .map(|(_id, session)| session)
                .collect()),
            Err(e) => {
                tracing::warn!(
                    "Bulk load of session documents failed ({}), loading one by one",
                    e
                );
                self.list_documents_individually().await
            }
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        match self.storage.delete(session_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if is_not_found(&error_str) {
                    tracing::debug!("Session document {} not present, nothing to delete", session_id);
                    return Ok(());
                }
                Err(GeotaskError::data_access(format!(
                    "Failed to delete session {}: {}",
                    session_id, error_str
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotask_core::ResultStore;
    use geotask_core::result::{LatLng, Popup, TaskPayload, TaskResult};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_session(id: &str) -> Session {
        let mut session = Session::new(id);
        session.upsert_result(TaskResult::new(
            1,
            TaskPayload::Polygon(vec![vec![
                LatLng::new(55.80, 37.30),
                LatLng::new(55.81, 37.31),
                LatLng::new(55.82, 37.29),
            ]]),
        ));
        session
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();

        let session = create_test_session("test-session-1");
        backend.put_session(&session).await.unwrap();

        let loaded = backend.get_session("test-session-1").await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.results, session.results);
        assert!(backend.sessions_dir().join("test-session-1.json").exists());
    }

    #[tokio::test]
    async fn test_missing_session_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();

        assert!(backend.get_session("nope").await.unwrap().is_none());
        assert!(backend.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();

        for id in ["session-1", "session-2", "session-3"] {
            backend.put_session(&create_test_session(id)).await.unwrap();
        }
        assert_eq!(backend.list_sessions().await.unwrap().len(), 3);

        backend.delete_session("session-2").await.unwrap();
        backend.delete_session("never-existed").await.unwrap();

        let mut ids: Vec<String> = backend
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["session-1", "session-3"]);
    }

    #[tokio::test]
    async fn test_malformed_document_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();
        backend.put_session(&create_test_session("good")).await.unwrap();
        std::fs::write(backend.sessions_dir().join("broken.json"), "{ nope").unwrap();

        let sessions = backend.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
    }

    #[tokio::test]
    async fn test_ids_with_dots_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();

        backend.delete_session("user.42").await.unwrap();
        assert!(backend.get_session("user.42").await.unwrap().is_none());

        backend.put_session(&create_test_session("user.42")).await.unwrap();
        backend.put_session(&create_test_session("a/b c")).await.unwrap();
        assert_eq!(
            backend.get_session("user.42").await.unwrap().unwrap().id,
            "user.42"
        );

        let mut ids: Vec<String> = backend
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a/b c", "user.42"]);

        backend.delete_session("user.42").await.unwrap();
        assert!(backend.get_session("user.42").await.unwrap().is_none());
        assert!(backend.get_session("a/b c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fallback_listing_reads_ids_from_documents() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();
        backend.put_session(&create_test_session("user.42")).await.unwrap();
        std::fs::write(backend.sessions_dir().join("broken.json"), "{ nope").unwrap();

        let sessions = backend.list_documents_individually().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "user.42");
        assert_eq!(sessions[0].results.len(), 1);
    }

    #[tokio::test]
    async fn test_store_over_document_backend() {
        let temp_dir = TempDir::new().unwrap();
        let backend = DocumentSessionBackend::new(temp_dir.path()).await.unwrap();
        let store = ResultStore::new(Arc::new(backend));

        store
            .save_task_result("s-1", 2, TaskPayload::Popup(vec![Popup::new((1.0, 2.0), "A")]))
            .await
            .unwrap();
        store
            .save_task_result(
                "s-1",
                2,
                TaskPayload::Popup(vec![Popup::new((1.0, 2.0), "A"), Popup::new((3.0, 4.0), "B")]),
            )
            .await
            .unwrap();

        let session = store.get_session("s-1").await.unwrap();
        assert_eq!(session.results.len(), 1);
        assert_eq!(session.results[0].payload.len(), 2);

        store.delete_session("s-1").await.unwrap();
        assert!(store.get_all_sessions().await.is_empty());
    }
}
