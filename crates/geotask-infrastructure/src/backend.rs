//! Backend selection.

use crate::document_session_backend::DocumentSessionBackend;
use crate::local_session_backend::LocalSessionBackend;
use geotask_core::config::BackendKind;
use geotask_core::error::Result;
use geotask_core::session::SessionBackend;
use std::path::Path;
use std::sync::Arc;

/// Opens the configured backend rooted at `data_dir`.
pub async fn open_session_backend(
    kind: BackendKind,
    data_dir: &Path,
) -> Result<Arc<dyn SessionBackend>> {
    tracing::debug!("Opening {} backend at {}", kind, data_dir.display());
    let backend: Arc<dyn SessionBackend> = match kind {
        BackendKind::Local => Arc::new(LocalSessionBackend::new(data_dir)),
        BackendKind::Document => Arc::new(DocumentSessionBackend::new(data_dir).await?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotask_core::ResultStore;
    use geotask_core::result::{Popup, TaskPayload};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_both_backends_behave_alike() {
        for kind in [BackendKind::Local, BackendKind::Document] {
            let temp_dir = TempDir::new().unwrap();
            let store: ResultStore = ResultStore::new(
                open_session_backend(kind, temp_dir.path()).await.unwrap(),
            );

            assert!(store.get_all_sessions().await.is_empty(), "{}", kind);

            store
                .save_task_result("s-1", 3, TaskPayload::Popup(vec![Popup::new((1.0, 1.0), "x")]))
                .await
                .unwrap();
            store
                .save_task_result("s-1", 3, TaskPayload::Popup(vec![Popup::new((2.0, 2.0), "y")]))
                .await
                .unwrap();

            let sessions = store.get_all_sessions().await;
            assert_eq!(sessions.len(), 1, "{}", kind);
            assert_eq!(sessions[0].results.len(), 1, "{}", kind);
            assert_eq!(
                sessions[0].results[0].popups().unwrap()[0].content,
                "y",
                "{}",
                kind
            );
        }
    }

    #[tokio::test]
    async fn test_both_backends_accept_any_session_id() {
        for kind in [BackendKind::Local, BackendKind::Document] {
            let temp_dir = TempDir::new().unwrap();
            let store: ResultStore = ResultStore::new(
                open_session_backend(kind, temp_dir.path()).await.unwrap(),
            );

            store.delete_session("user.42").await.unwrap();
            store
                .save_task_result("user.42", 2, TaskPayload::Popup(vec![Popup::new((1.0, 1.0), "x")]))
                .await
                .unwrap();
            assert!(store.get_task_result("user.42", 2).await.is_some(), "{}", kind);

            store.delete_session("user.42").await.unwrap();
            assert!(!store.session_exists("user.42").await, "{}", kind);
        }
    }
}
