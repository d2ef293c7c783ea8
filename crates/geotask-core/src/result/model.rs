//! Task result domain model.

use super::geometry::{MIN_RING_POINTS, Popup, Ring};
use crate::error::{GeotaskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of a tutorial task. Valid task ids start at 1.
pub type TaskId = u32;

/// Which kind of exercise a result answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Draw one or more areas
    Polygon,
    /// Place annotated markers
    Popup,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Polygon => "polygon",
            TaskKind::Popup => "popup",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The geometry submitted for a task.
///
/// The variant decides the task kind, so a result can never carry both
/// polygons and popups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskPayload {
    Polygon(Vec<Ring>),
    Popup(Vec<Popup>),
}

impl TaskPayload {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskPayload::Polygon(_) => TaskKind::Polygon,
            TaskPayload::Popup(_) => TaskKind::Popup,
        }
    }

    /// Creates an empty payload of the given kind.
    pub fn empty(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Polygon => TaskPayload::Polygon(Vec::new()),
            TaskKind::Popup => TaskPayload::Popup(Vec::new()),
        }
    }

    /// Number of rings or popups.
    pub fn len(&self) -> usize {
        match self {
            TaskPayload::Polygon(rings) => rings.len(),
            TaskPayload::Popup(popups) => popups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the pre-submission rules applied by the UI.
    ///
    /// The store itself accepts empty payloads; callers that accept user input
    /// run this before calling `ResultStore::save_task_result`.
    pub fn validate_submission(&self) -> Result<()> {
        match self {
            TaskPayload::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(GeotaskError::invalid_payload("polygon has no rings"));
                }
                if let Some((index, ring)) = rings
                    .iter()
                    .enumerate()
                    .find(|(_, ring)| ring.len() < MIN_RING_POINTS)
                {
                    return Err(GeotaskError::invalid_payload(format!(
                        "ring {} has {} points, at least {} required",
                        index,
                        ring.len(),
                        MIN_RING_POINTS
                    )));
                }
            }
            TaskPayload::Popup(popups) => {
                if popups.is_empty() {
                    return Err(GeotaskError::invalid_payload("no popups placed"));
                }
                if let Some(index) = popups.iter().position(|p| p.content.trim().is_empty()) {
                    return Err(GeotaskError::invalid_payload(format!(
                        "popup {} has no content",
                        index
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The persisted outcome of one task within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task number (>= 1)
    pub task_id: TaskId,
    /// Submitted geometry
    pub payload: TaskPayload,
}

impl TaskResult {
    pub fn new(task_id: TaskId, payload: TaskPayload) -> Self {
        Self { task_id, payload }
    }

    pub fn kind(&self) -> TaskKind {
        self.payload.kind()
    }

    /// Returns the rings if this is a polygon result.
    pub fn polygons(&self) -> Option<&[Ring]> {
        match &self.payload {
            TaskPayload::Polygon(rings) => Some(rings),
            TaskPayload::Popup(_) => None,
        }
    }

    /// Returns the popups if this is a popup result.
    pub fn popups(&self) -> Option<&[Popup]> {
        match &self.payload {
            TaskPayload::Popup(popups) => Some(popups),
            TaskPayload::Polygon(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::LatLng;

    fn triangle() -> Ring {
        vec![
            LatLng::new(55.80, 37.30),
            LatLng::new(55.81, 37.31),
            LatLng::new(55.82, 37.29),
        ]
    }

    #[test]
    fn test_kind_follows_payload() {
        let polygon = TaskResult::new(1, TaskPayload::Polygon(vec![triangle()]));
        assert_eq!(polygon.kind(), TaskKind::Polygon);
        assert!(polygon.popups().is_none());
        assert_eq!(polygon.polygons().map(|r| r.len()), Some(1));

        let popup = TaskResult::new(2, TaskPayload::Popup(vec![Popup::new((55.82, 37.34), "A")]));
        assert_eq!(popup.kind(), TaskKind::Popup);
        assert!(popup.polygons().is_none());
    }

    #[test]
    fn test_validate_submission_accepts_valid_payloads() {
        assert!(TaskPayload::Polygon(vec![triangle()]).validate_submission().is_ok());
        assert!(
            TaskPayload::Popup(vec![Popup::new((55.82, 37.34), "A")])
                .validate_submission()
                .is_ok()
        );
    }

    #[test]
    fn test_validate_submission_rejects_empty_and_short() {
        assert!(TaskPayload::empty(TaskKind::Polygon).validate_submission().is_err());
        assert!(TaskPayload::empty(TaskKind::Popup).validate_submission().is_err());

        let short = TaskPayload::Polygon(vec![triangle()[..2].to_vec()]);
        let err = short.validate_submission().unwrap_err();
        assert!(err.to_string().contains("ring 0 has 2 points"));

        let blank = TaskPayload::Popup(vec![Popup::new((1.0, 2.0), "  ")]);
        assert!(blank.validate_submission().is_err());
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Polygon.to_string(), "polygon");
        assert_eq!(TaskKind::Popup.to_string(), "popup");
    }
}
