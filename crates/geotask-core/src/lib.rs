pub mod config;
pub mod error;
pub mod gallery;
pub mod result;
pub mod session;
pub mod store;

// Re-export common types
pub use error::{GeotaskError, Result};
pub use store::ResultStore;
