//! Error types for the geotask result store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole result store.
///
/// "Not found" is deliberately absent: a missing session or task result is
/// represented as `None`, never as an error.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum GeotaskError {
    /// The durable client-local state that holds the session identity is
    /// inaccessible. Callers treat this as fatal.
    #[error("Session identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Backend unavailable or failed while reading/writing sessions
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Malformed stored data
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML", "migration"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// A submission was rejected before reaching the backend
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl GeotaskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IdentityUnavailable error
    pub fn identity_unavailable(message: impl Into<String>) -> Self {
        Self::IdentityUnavailable(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Serialization error for the given format
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidPayload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error means the session identity cannot be resolved
    pub fn is_identity_unavailable(&self) -> bool {
        matches!(self, Self::IdentityUnavailable(_))
    }

    /// Check if this is a serialization error (malformed stored data)
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a backend availability error
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess(_) | Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GeotaskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GeotaskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GeotaskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for GeotaskError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            MigrationError::IoError { .. } => Self::Io {
                message: err.to_string(),
            },
            _ => Self::Migration(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, GeotaskError>`.
pub type Result<T> = std::result::Result<T, GeotaskError>;
