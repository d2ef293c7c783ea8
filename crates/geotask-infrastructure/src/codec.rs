//! Geometry and annotation codec.
//!
//! Converts between the rich in-memory geometry (`LatLng`, `Ring`, `Popup`)
//! and the plain shapes that are persisted (`[lat, lng]` pairs, nested
//! arrays, position/content records).
//!
//! Every `decode_*` function is the inverse of its `encode_*` counterpart:
//! `decode_x(encode_x(v)) == v` for any value, including empty lists.

use geotask_core::result::{LatLng, Popup, Ring, TaskId, TaskKind, TaskPayload, TaskResult};
use serde::{Deserialize, Serialize};

/// A persisted point: `[lat, lng]`.
pub type CoordinatePair = [f64; 2];

/// A persisted ring: a list of pairs.
pub type RingRecord = Vec<CoordinatePair>;

/// A persisted popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupRecord {
    pub position: CoordinatePair,
    pub content: String,
}

/// A persisted task result.
///
/// Exactly one of `polygons` / `popups` is written, chosen by `kind`. A record
/// whose payload field is missing decodes to an empty payload of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResultRecord {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygons: Option<Vec<RingRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popups: Option<Vec<PopupRecord>>,
}

/// A point as written by the first layout: either a pair or an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyPoint {
    Pair(CoordinatePair),
    Object { lat: f64, lng: f64 },
}

impl LegacyPoint {
    /// Normalizes the point into a pair.
    pub fn into_pair(self) -> CoordinatePair {
        match self {
            LegacyPoint::Pair(pair) => pair,
            LegacyPoint::Object { lat, lng } => [lat, lng],
        }
    }
}

pub fn encode_point(point: LatLng) -> CoordinatePair {
    [point.lat, point.lng]
}

pub fn decode_point([lat, lng]: CoordinatePair) -> LatLng {
    LatLng::new(lat, lng)
}

pub fn encode_rings(rings: &[Ring]) -> Vec<RingRecord> {
    rings
        .iter()
        .map(|ring| ring.iter().copied().map(encode_point).collect())
        .collect()
}

pub fn decode_rings(records: Vec<RingRecord>) -> Vec<Ring> {
    records
        .into_iter()
        .map(|ring| ring.into_iter().map(decode_point).collect())
        .collect()
}

pub fn encode_popups(popups: &[Popup]) -> Vec<PopupRecord> {
    popups
        .iter()
        .map(|popup| PopupRecord {
            position: encode_point(popup.position),
            content: popup.content.clone(),
        })
        .collect()
}

pub fn decode_popups(records: Vec<PopupRecord>) -> Vec<Popup> {
    records
        .into_iter()
        .map(|record| Popup {
            position: decode_point(record.position),
            content: record.content,
        })
        .collect()
}

pub fn encode_result(result: &TaskResult) -> TaskResultRecord {
    let (polygons, popups) = match &result.payload {
        TaskPayload::Polygon(rings) => (Some(encode_rings(rings)), None),
        TaskPayload::Popup(popups) => (None, Some(encode_popups(popups))),
    };

    TaskResultRecord {
        task_id: result.task_id,
        kind: result.kind(),
        polygons,
        popups,
    }
}

pub fn decode_result(record: TaskResultRecord) -> TaskResult {
    let payload = match record.kind {
        TaskKind::Polygon => TaskPayload::Polygon(decode_rings(record.polygons.unwrap_or_default())),
        TaskKind::Popup => TaskPayload::Popup(decode_popups(record.popups.unwrap_or_default())),
    };
    TaskResult::new(record.task_id, payload)
}

/// A bare payload, tagged by its `type`, as accepted from users.
///
/// ```json
/// {"type": "polygon", "polygons": [[[55.80, 37.30], [55.81, 37.31], [55.82, 37.29]]]}
/// {"type": "popup", "popups": [{"position": [55.82, 37.34], "content": "A"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PayloadRecord {
    Polygon {
        #[serde(default)]
        polygons: Vec<RingRecord>,
    },
    Popup {
        #[serde(default)]
        popups: Vec<PopupRecord>,
    },
}

pub fn encode_payload(payload: &TaskPayload) -> PayloadRecord {
    match payload {
        TaskPayload::Polygon(rings) => PayloadRecord::Polygon {
            polygons: encode_rings(rings),
        },
        TaskPayload::Popup(popups) => PayloadRecord::Popup {
            popups: encode_popups(popups),
        },
    }
}

pub fn decode_payload(record: PayloadRecord) -> TaskPayload {
    match record {
        PayloadRecord::Polygon { polygons } => TaskPayload::Polygon(decode_rings(polygons)),
        PayloadRecord::Popup { popups } => TaskPayload::Popup(decode_popups(popups)),
    }
}
