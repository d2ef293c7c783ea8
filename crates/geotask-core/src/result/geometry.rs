//! In-memory geometry as produced and consumed by the drawing UI.

use serde::{Deserialize, Serialize};

/// A geographic point.
///
/// This is the "rich" point value handed to and received from the drawing UI.
/// Storage reduces it to a plain `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// One polygon boundary.
pub type Ring = Vec<LatLng>;

/// Minimum number of points for a ring to describe an area.
pub const MIN_RING_POINTS: usize = 3;

/// An annotated marker placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    /// Where the marker sits
    pub position: LatLng,
    /// Text shown in the marker popup
    pub content: String,
}

impl Popup {
    pub fn new(position: impl Into<LatLng>, content: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            content: content.into(),
        }
    }
}
