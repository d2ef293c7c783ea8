//! Session DTOs and migrations

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use geotask_core::result::TaskKind;
use geotask_core::session::Session;

use crate::codec::{self, LegacyPoint, PopupRecord, RingRecord, TaskResultRecord};

// ============================================================================
// Legacy result records (V1.0.0)
// ============================================================================

/// Popup as written by the single-ring layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPopupRecord {
    pub position: LegacyPoint,
    pub content: String,
}

/// Task result as written by the single-ring layout.
///
/// `polygon` holds one ring. Points may be pairs or `{lat, lng}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTaskResultRecord {
    pub task_id: u32,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<LegacyPoint>>,
    /// Some early blobs already carry plural rings; they win over `polygon`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygons: Option<Vec<Vec<LegacyPoint>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popups: Option<Vec<LegacyPopupRecord>>,
}

fn normalize_ring(points: Vec<LegacyPoint>) -> RingRecord {
    points.into_iter().map(LegacyPoint::into_pair).collect()
}

impl From<LegacyTaskResultRecord> for TaskResultRecord {
    fn from(legacy: LegacyTaskResultRecord) -> Self {
        let polygons = match (legacy.polygons, legacy.polygon) {
            (Some(rings), _) => Some(rings.into_iter().map(normalize_ring).collect()),
            (None, Some(ring)) => Some(vec![normalize_ring(ring)]),
            (None, None) => None,
        };
        let popups = legacy.popups.map(|popups| {
            popups
                .into_iter()
                .map(|p| PopupRecord {
                    position: p.position.into_pair(),
                    content: p.content,
                })
                .collect()
        });

        TaskResultRecord {
            task_id: legacy.task_id,
            kind: legacy.kind,
            polygons,
            popups,
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

/// Represents V1.0.0 of the session data schema.
/// Single ring per polygon task, mixed point encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_0_0 {
    pub id: String,
    /// RFC 3339 timestamp; missing in the oldest records
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub results: Vec<LegacyTaskResultRecord>,
}

/// Represents V2.0.0 of the session data schema.
/// Multi-ring polygons, points always `[lat, lng]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV2_0_0 {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub results: Vec<TaskResultRecord>,
}

/// Type alias for the latest Session version.
pub type SessionDTO = SessionV2_0_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from SessionV1_0_0 to SessionV2_0_0.
/// Wraps the single ring into a one-ring list and normalizes points.
impl MigratesTo<SessionV2_0_0> for SessionV1_0_0 {
    fn migrate(self) -> SessionV2_0_0 {
        SessionV2_0_0 {
            id: self.id,
            created_at: self.created_at,
            results: self.results.into_iter().map(TaskResultRecord::from).collect(),
        }
    }
}

fn parse_created_at(id: &str, raw: Option<&str>) -> DateTime<Utc> {
    match raw.map(DateTime::parse_from_rfc3339) {
        Some(Ok(parsed)) => parsed.with_timezone(&Utc),
        Some(Err(e)) => {
            tracing::debug!("Session {} has unparsable createdAt ({}), backfilling", id, e);
            Utc::now()
        }
        None => {
            tracing::debug!("Session {} has no createdAt, backfilling", id);
            Utc::now()
        }
    }
}

/// Convert SessionV2_0_0 DTO to domain model.
impl IntoDomain<Session> for SessionV2_0_0 {
    fn into_domain(self) -> Session {
        let created_at = parse_created_at(&self.id, self.created_at.as_deref());
        Session {
            id: self.id,
            created_at,
            results: self.results.into_iter().map(codec::decode_result).collect(),
        }
    }
}

/// Convert domain model to SessionV2_0_0 DTO for persistence.
impl version_migrate::FromDomain<Session> for SessionV2_0_0 {
    fn from_domain(session: Session) -> Self {
        SessionV2_0_0 {
            created_at: Some(session.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            results: session.results.iter().map(codec::encode_result).collect(),
            id: session.id,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Schema version assumed for records written without a `version` field.
pub const UNVERSIONED_SESSION_VERSION: &str = "1.0.0";

/// Adds the version key to a session record that predates versioning.
///
/// The first tutorial wrote plain objects without `version`; they are the
/// 1.0.0 layout.
pub fn normalize_legacy_record(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(object) = value.as_object_mut() {
        if !object.contains_key("version") {
            object.insert(
                "version".to_string(),
                serde_json::Value::String(UNVERSIONED_SESSION_VERSION.to_string()),
            );
        }
    }
    value
}

/// Creates and configures a Migrator instance for Session entities.
///
/// The migrator handles automatic schema migration from V1.0.0 to V2.0.0
/// and conversion to the domain model.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Wraps the single `polygon` ring into `polygons`
/// - V2.0.0 → Session: Converts DTO to domain model, backfilling `createdAt`
///
/// # Example
///
/// ```ignore
/// let migrator = create_session_migrator();
/// let session: Session = migrator.load_flat_from("session", json_value)?;
/// ```
pub fn create_session_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let session_path = version_migrate::Migrator::define("session")
        .from::<SessionV1_0_0>()
        .step::<SessionV2_0_0>()
        .into_with_save::<Session>();

    migrator
        .register(session_path)
        .expect("Failed to register session migration path");

    migrator
}
