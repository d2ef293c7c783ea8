//! Session backend trait.
//!
//! Defines the storage capability set the result store is written against.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract storage medium for sessions.
///
/// This trait decouples the result store from the concrete storage mechanism
/// (a single local blob, a collection of documents, ...). Every session is
/// addressed by its `id`.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning and migrations of stored records
/// - Treating "not found" as `Ok(None)` / no-op rather than an error
/// - Skipping (and logging) individual malformed records in `list_sessions`
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Backend unavailable or record unreadable
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Writes the whole session, creating or replacing the stored record.
    async fn put_session(&self, session: &Session) -> Result<()>;

    /// Lists all stored sessions.
    ///
    /// An empty backend yields `Ok(vec![])`.
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// Deletes a session.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Session deleted (or didn't exist)
    /// - `Err(_)`: Backend unavailable
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}
