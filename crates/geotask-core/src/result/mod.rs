//! Task result domain module.
//!
//! # Module Structure
//!
//! - `geometry`: points, rings and popups as the drawing UI sees them
//! - `model`: `TaskResult`, `TaskPayload` and `TaskKind`

mod geometry;
mod model;

pub use geometry::{LatLng, MIN_RING_POINTS, Popup, Ring};
pub use model::{TaskId, TaskKind, TaskPayload, TaskResult};
