use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the geographic ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Clamps latitude to [-90, 90] and wraps longitude into [-180, 180)
    pub fn normalized(&self) -> Self {
        let lat = self.lat.clamp(-90.0, 90.0);
        let lng = (self.lng + 180.0).rem_euclid(360.0) - 180.0;
        Self { lat, lng }
    }
}

/// Opaque, never reused waypoint identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(String);

impl WaypointId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-placed point of the mission route.
///
/// `order` is the 1-based position in the owning sequence. Only
/// [`WaypointStore`](crate::engine::waypoints::WaypointStore) writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub lat: f64,
    pub lng: f64,
    pub order: usize,
}

impl Waypoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Where a waypoint sits in the route. Derived from position and length, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointRole {
    Start,
    End,
    Intermediate,
}

impl WaypointRole {
    /// A single waypoint is neither start nor end.
    pub fn classify(index: usize, len: usize) -> Self {
        if len > 1 && index == 0 {
            WaypointRole::Start
        } else if len > 1 && index == len - 1 {
            WaypointRole::End
        } else {
            WaypointRole::Intermediate
        }
    }

    /// Label used by the waypoint list
    pub fn list_title(&self, order: usize) -> String {
        match self {
            WaypointRole::Start => "Start".to_string(),
            WaypointRole::End => "End".to_string(),
            WaypointRole::Intermediate => format!("Waypoint {}", order),
        }
    }

    /// Label used by the marker popup
    pub fn popup_title(&self, order: usize) -> String {
        match self {
            WaypointRole::Start => "Start Point".to_string(),
            WaypointRole::End => "End Point".to_string(),
            WaypointRole::Intermediate => format!("Waypoint {}", order),
        }
    }

    /// Marker colour as sRGB bytes
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            WaypointRole::Start => [0x10, 0xb9, 0x81],
            WaypointRole::End => [0xef, 0x44, 0x44],
            WaypointRole::Intermediate => [0x3b, 0x82, 0xf6],
        }
    }
}

/// Simulated vehicle telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Remaining battery (%)
    pub battery: f64,
    /// Wind speed (kts)
    pub wind_speed: f64,
    /// Vehicle speed (kts)
    pub speed: f64,
    /// Ambient temperature (°F)
    pub temperature: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            battery: 85.0,
            wind_speed: 12.0,
            speed: 0.0,
            temperature: 72.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Idle,
    Running,
    Completed,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MissionStatus::Idle => "Idle",
            MissionStatus::Running => "Running",
            MissionStatus::Completed => "Completed",
        };
        f.write_str(label)
    }
}
