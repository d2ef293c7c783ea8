pub mod backend;
pub mod codec;
pub mod config_service;
pub mod document_session_backend;
pub mod dto;
pub mod file_session_identity;
pub mod local_session_backend;
pub mod paths;
pub mod storage;

pub use crate::backend::open_session_backend;
pub use crate::config_service::ConfigService;
pub use crate::document_session_backend::DocumentSessionBackend;
pub use crate::file_session_identity::FileSessionIdentity;
pub use crate::local_session_backend::LocalSessionBackend;
pub use crate::paths::GeotaskPaths;
