//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting sessions.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ### Session Version History
//! - **1.0.0**: Single `polygon` ring per task; points as pairs or `{lat, lng}`
//! - **2.0.0**: Multi-ring `polygons`; points always `[lat, lng]`

mod session;

// Re-export session DTOs and migrator
pub use session::{
    LegacyPopupRecord, LegacyTaskResultRecord, SessionDTO, SessionV1_0_0, SessionV2_0_0,
    UNVERSIONED_SESSION_VERSION, create_session_migrator, normalize_legacy_record,
};
