//! Single-blob SessionBackend implementation.
//!
//! The whole session collection is one JSON array stored under a well-known
//! file name. Every operation reads the blob, and every write rewrites it
//! atomically under an exclusive lock.
//!
//! Records are stored flat with a `version` key, so blobs written by older
//! layouts are migrated when read. Records that fail to decode are skipped on
//! read and left untouched on write.

use crate::dto::{create_session_migrator, normalize_legacy_record};
use crate::paths::GeotaskPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use geotask_core::error::{GeotaskError, Result};
use geotask_core::session::{Session, SessionBackend};
use serde_json::Value;
use std::path::{Path, PathBuf};
use version_migrate::Migrator;

/// Local, synchronous session backend over a single JSON blob.
///
/// File structure:
/// ```text
/// data_dir/
/// └── sessions.json    # [ {"version": "2.0.0", "id": ..., "results": [...]}, ... ]
/// ```
pub struct LocalSessionBackend {
    blob: AtomicJsonFile<Vec<Value>>,
    migrator: Migrator,
}

impl LocalSessionBackend {
    /// Creates a backend storing its blob inside `data_dir`.
    ///
    /// Nothing is written until the first save.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_blob_path(GeotaskPaths::sessions_blob(data_dir.as_ref()))
    }

    /// Creates a backend over an explicit blob path.
    pub fn with_blob_path(path: PathBuf) -> Self {
        Self {
            blob: AtomicJsonFile::new(path),
            migrator: create_session_migrator(),
        }
    }

    pub fn blob_path(&self) -> &Path {
        self.blob.path()
    }

    fn record_id(record: &Value) -> Option<&str> {
        record.get("id").and_then(Value::as_str)
    }

    fn decode(&self, record: Value) -> Option<Session> {
        let id = Self::record_id(&record).unwrap_or("<missing id>").to_string();
        let loaded: std::result::Result<Session, _> = self
            .migrator
            .load_flat_from("session", normalize_legacy_record(record));
        match loaded {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Skipping malformed session record {}: {}", id, e);
                None
            }
        }
    }

    fn encode(&self, session: &Session) -> Result<Value> {
        let json = self.migrator.save_domain_flat("session", session)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn read_records(&self) -> Result<Vec<Value>> {
        Ok(self.blob.load()?.unwrap_or_default())
    }

    /// Synchronous variant of [`SessionBackend::get_session`].
    pub fn get_session_sync(&self, session_id: &str) -> Result<Option<Session>> {
        let record = self
            .read_records()?
            .into_iter()
            .find(|record| Self::record_id(record) == Some(session_id));

        match record {
            Some(record) => {
                let session = self.decode(record).ok_or_else(|| {
                    GeotaskError::serialization(
                        "migration",
                        format!("session {} could not be decoded", session_id),
                    )
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Synchronous variant of [`SessionBackend::put_session`].
    pub fn put_session_sync(&self, session: &Session) -> Result<()> {
        let encoded = self.encode(session)?;
        let session_id = session.id.as_str();

        let replaced = self.blob.update(Vec::new(), |records| {
            match records
                .iter_mut()
                .find(|record| Self::record_id(record) == Some(session_id))
            {
                Some(existing) => {
                    *existing = encoded;
                    true
                }
                None => {
                    records.push(encoded);
                    false
                }
            }
        })?;

        tracing::debug!(
            "{} session {} in {}",
            if replaced { "Updated" } else { "Inserted" },
            session_id,
            self.blob.path().display()
        );
        Ok(())
    }

    /// Synchronous variant of [`SessionBackend::list_sessions`].
    pub fn list_sessions_sync(&self) -> Result<Vec<Session>> {
        Ok(self
            .read_records()?
            .into_iter()
            .filter_map(|record| self.decode(record))
            .collect())
    }

    /// Synchronous variant of [`SessionBackend::delete_session`].
    pub fn delete_session_sync(&self, session_id: &str) -> Result<()> {
        if !self.blob.path().exists() {
            return Ok(());
        }

        let removed = self.blob.update(Vec::new(), |records| {
            let before = records.len();
            records.retain(|record| Self::record_id(record) != Some(session_id));
            before - records.len()
        })?;

        if removed == 0 {
            tracing::debug!("Session {} not present, nothing to delete", session_id);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionBackend for LocalSessionBackend {
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.get_session_sync(session_id)
    }

    async fn put_session(&self, session: &Session) -> Result<()> {
        self.put_session_sync(session)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.list_sessions_sync()
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.delete_session_sync(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotask_core::ResultStore;
    use geotask_core::result::{LatLng, Popup, TaskKind, TaskPayload, TaskResult};
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn triangle() -> Vec<LatLng> {
        vec![
            LatLng::new(55.80, 37.30),
            LatLng::new(55.81, 37.31),
            LatLng::new(55.82, 37.29),
        ]
    }

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());

        let mut session = Session::new("s-1");
        session.upsert_result(TaskResult::new(1, TaskPayload::Polygon(vec![triangle()])));
        backend.put_session_sync(&session).unwrap();

        let loaded = backend.get_session_sync("s-1").unwrap().unwrap();
        assert_eq!(loaded.results, session.results);
        assert!(backend.get_session_sync("s-2").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_existing_record() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());

        let mut session = Session::new("s-1");
        backend.put_session_sync(&session).unwrap();
        backend.put_session_sync(&Session::new("s-2")).unwrap();
        session.upsert_result(TaskResult::new(
            2,
            TaskPayload::Popup(vec![Popup::new((1.0, 2.0), "A")]),
        ));
        backend.put_session_sync(&session).unwrap();

        let blob: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(backend.blob_path()).unwrap()).unwrap();
        assert_eq!(blob.len(), 2);
        assert_eq!(blob[0]["id"], "s-1");
        assert_eq!(blob[0]["results"][0]["type"], "popup");
    }

    #[test]
    fn test_empty_and_missing_blob() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());

        assert!(backend.list_sessions_sync().unwrap().is_empty());
        backend.delete_session_sync("nobody").unwrap();
        assert!(!backend.blob_path().exists());
    }

    #[test]
    fn test_malformed_blob_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());
        fs::write(backend.blob_path(), "{ this is not json").unwrap();

        assert!(backend.list_sessions_sync().unwrap().is_empty());

        backend.put_session_sync(&Session::new("fresh")).unwrap();
        let sessions = backend.list_sessions_sync().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "fresh");
    }

    #[test]
    fn test_malformed_record_is_skipped_and_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());
        let blob = json!([
            {"version": "2.0.0", "id": "good", "createdAt": "2024-01-01T00:00:00Z", "results": []},
            {"version": "2.0.0", "id": "bad", "results": [{"taskId": "one", "type": "square"}]}
        ]);
        fs::write(backend.blob_path(), blob.to_string()).unwrap();

        let sessions = backend.list_sessions_sync().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
        assert!(backend.get_session_sync("bad").unwrap_err().is_serialization());

        backend.delete_session_sync("good").unwrap();
        let raw: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(backend.blob_path()).unwrap()).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0]["id"], "bad");
    }

    #[test]
    fn test_unversioned_legacy_blob_loads() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalSessionBackend::new(temp_dir.path());
        let blob = json!([
            {
                "id": "legacy",
                "results": [
                    {"taskId": 1, "type": "polygon", "polygon": [{"lat": 55.80, "lng": 37.30}, [55.81, 37.31], [55.82, 37.29]]}
                ]
            }
        ]);
        fs::write(backend.blob_path(), blob.to_string()).unwrap();

        let session = backend.get_session_sync("legacy").unwrap().unwrap();
        let result = session.result(1).unwrap();
        assert_eq!(result.kind(), TaskKind::Polygon);
        assert_eq!(result.polygons().unwrap(), &[triangle()]);
    }

    #[tokio::test]
    async fn test_store_over_local_backend() {
        let temp_dir = TempDir::new().unwrap();
        let store = ResultStore::new(Arc::new(LocalSessionBackend::new(temp_dir.path())));

        store
            .save_task_result("s-1", 1, TaskPayload::Polygon(vec![triangle()]))
            .await
            .unwrap();
        store
            .save_task_result("s-1", 2, TaskPayload::Popup(vec![Popup::new((55.82, 37.34), "A")]))
            .await
            .unwrap();
        store
            .save_task_result(
                "s-1",
                2,
                TaskPayload::Popup(vec![
                    Popup::new((55.82, 37.34), "A"),
                    Popup::new((55.83, 37.35), "B"),
                ]),
            )
            .await
            .unwrap();
        store
            .save_task_result("s-2", 1, TaskPayload::Polygon(vec![triangle()]))
            .await
            .unwrap();

        let polygon = store.get_task_result("s-1", 1).await.unwrap();
        assert_eq!(polygon.polygons().unwrap(), &[triangle()]);
        assert_eq!(store.get_task_result("s-1", 2).await.unwrap().payload.len(), 2);
        assert!(store.get_task_result("s-1", 3).await.is_none());

        store.delete_session("s-1").await.unwrap();
        store.delete_session("s-404").await.unwrap();

        let remaining = store.get_all_sessions().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "s-2");
    }
}
