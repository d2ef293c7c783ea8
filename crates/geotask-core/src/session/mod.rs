//! Session domain module.
//!
//! This module contains the session domain model, the backend interface
//! sessions are persisted through, and the session identity types.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `backend`: Storage capability set (`SessionBackend`)
//! - `identity`: Durable session id (`SessionIdentityProvider`, `SessionContext`)
//!
//! # Usage
//!
//! ```ignore
//! use geotask_core::session::{Session, SessionBackend, SessionContext};
//! ```

mod backend;
mod identity;
mod model;

// Re-export public API
pub use backend::SessionBackend;
pub use identity::{SessionContext, SessionIdentityProvider};
pub use model::Session;
