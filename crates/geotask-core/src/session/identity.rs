//! Session identity.
//!
//! The session id lives in durable client-local state outside the `Session`
//! entity. It is created lazily on first access and never regenerated unless
//! the environment is reset.

use crate::error::Result;
use async_trait::async_trait;

/// Produces and persists the stable session identifier.
#[async_trait]
pub trait SessionIdentityProvider: Send + Sync {
    /// Returns the persisted session id, creating and persisting a new one
    /// on first use.
    ///
    /// # Errors
    ///
    /// `GeotaskError::IdentityUnavailable` if the durable state cannot be
    /// read or written. Callers treat this as fatal.
    async fn get_or_create_session_id(&self) -> Result<String>;

    /// Forgets the persisted id so the next call starts a new session.
    async fn reset(&self) -> Result<()>;
}

/// The resolved identity of the current session.
///
/// Created once from a `SessionIdentityProvider` and then read many times;
/// result store operations receive the id from here explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
}

impl SessionContext {
    /// Resolves (creating if needed) the current session id.
    pub async fn resolve(provider: &dyn SessionIdentityProvider) -> Result<Self> {
        let session_id = provider.get_or_create_session_id().await?;
        Ok(Self { session_id })
    }

    /// Wraps an id that is already known, e.g. one picked in the gallery.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
