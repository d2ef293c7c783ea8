//! The session-scoped result store.
//!
//! `ResultStore` is written once against [`SessionBackend`] and owns all
//! access to persisted sessions. Callers pass the session id explicitly,
//! usually taken from a [`SessionContext`](crate::session::SessionContext).

use crate::error::{GeotaskError, Result};
use crate::result::{TaskId, TaskPayload, TaskResult};
use crate::session::{Session, SessionBackend};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Persists task results per session.
///
/// Reads never fail: backend errors are logged and degrade to an absent or
/// empty answer. Writes return `Result` so callers can offer a retry.
///
/// Saves for the same session are serialized by a per-session lock, so two
/// concurrent saves never interleave their read-modify-write. Sessions with
/// different ids proceed independently.
pub struct ResultStore<B: SessionBackend + ?Sized = dyn SessionBackend> {
    backend: Arc<B>,
    /// Per-session save locks
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl<B: SessionBackend + ?Sized> ResultStore<B> {
    /// Creates a store on top of the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(session_id) {
                return lock.clone();
            }
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Saves the result of a task, replacing any earlier result for it.
    ///
    /// Creates the session (stamped with the current time) if it does not
    /// exist yet. Safe to call repeatedly with the same arguments.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session to save into
    /// * `task_id` - Task number, starting at 1
    /// * `payload` - Drawn polygons or placed popups
    ///
    /// # Returns
    ///
    /// - `Ok(TaskResult)`: The result as persisted
    /// - `Err(GeotaskError::InvalidPayload)`: `task_id` is 0
    /// - `Err(_)`: The backend could not read or write the session
    pub async fn save_task_result(
        &self,
        session_id: &str,
        task_id: TaskId,
        payload: TaskPayload,
    ) -> Result<TaskResult> {
        if task_id == 0 {
            return Err(GeotaskError::invalid_payload("task id must be 1 or greater"));
        }

        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut session = match self.backend.get_session(session_id).await? {
            Some(session) => session,
            None => {
                tracing::info!("Creating session {}", session_id);
                Session::new(session_id)
            }
        };

        let result = TaskResult::new(task_id, payload);
        if session.upsert_result(result.clone()).is_some() {
            tracing::debug!(
                "Replaced result of task {} in session {}",
                task_id,
                session_id
            );
        } else {
            tracing::debug!("Added result of task {} to session {}", task_id, session_id);
        }

        if let Err(e) = self.backend.put_session(&session).await {
            tracing::error!(
                "Failed to save task {} for session {}: {}",
                task_id,
                session_id,
                e
            );
            return Err(e);
        }

        Ok(result)
    }

    /// Returns the saved result of a task.
    ///
    /// `None` when the session does not exist, when it has no result for the
    /// task, or when the backend failed (the failure is logged).
    pub async fn get_task_result(&self, session_id: &str, task_id: TaskId) -> Option<TaskResult> {
        match self.backend.get_session(session_id).await {
            Ok(Some(session)) => session.result(task_id).cloned(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "Failed to read task {} of session {}: {}",
                    task_id,
                    session_id,
                    e
                );
                None
            }
        }
    }

    /// Returns a whole session, or `None` if it is missing or unreadable.
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        match self.backend.get_session(session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to read session {}: {}", session_id, e);
                None
            }
        }
    }

    /// Checks whether a session has been persisted.
    pub async fn session_exists(&self, session_id: &str) -> bool {
        self.get_session(session_id).await.is_some()
    }

    /// Returns every stored session.
    ///
    /// An empty backend yields an empty vector; a failing backend is logged
    /// and also yields an empty vector.
    pub async fn get_all_sessions(&self) -> Vec<Session> {
        match self.backend.list_sessions().await {
            Ok(sessions) => {
                tracing::debug!("Loaded {} sessions", sessions.len());
                sessions
            }
            Err(e) => {
                tracing::warn!("Failed to list sessions: {}", e);
                Vec::new()
            }
        }
    }

    /// Deletes a session and all its results.
    ///
    /// Deleting an unknown session is a no-op. Other sessions are untouched.
    /// The session's lock is dropped only when no save is waiting on it.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let lock = self.session_lock(session_id).await;
        {
            let _guard = lock.lock().await;
            if let Err(e) = self.backend.delete_session(session_id).await {
                tracing::error!("Failed to delete session {}: {}", session_id, e);
                return Err(e);
            }
        }

        // Saves already holding or waiting on this lock must keep sharing it
        let mut locks = self.locks.write().await;
        let idle = locks
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(session_id);
        }
        tracing::info!("Deleted session {}", session_id);
        Ok(())
    }
}

impl<B: SessionBackend + ?Sized> Clone for ResultStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            locks: self.locks.clone(),
        }
    }
}
