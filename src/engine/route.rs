use geo::{BoundingRect, LineString, Rect};
use serde::Serialize;

use crate::engine::geomath::{bearing_between, distance_between, format_distance, midpoint};
use crate::engine::models::{Coordinate, Waypoint, WaypointId, WaypointRole};

/// A waypoint as handed to the map surface and the list panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaypointView {
    pub id: WaypointId,
    pub lat: f64,
    pub lng: f64,
    pub order: usize,
    pub is_start: bool,
    pub is_end: bool,
    pub next_segment_distance_m: Option<f64>,
    pub next_segment_distance_label: Option<String>,
}

impl WaypointView {
    pub fn role(&self) -> WaypointRole {
        if self.is_start {
            WaypointRole::Start
        } else if self.is_end {
            WaypointRole::End
        } else {
            WaypointRole::Intermediate
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Leg between two consecutive waypoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentView {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Anchor of the direction arrow
    pub midpoint: Coordinate,
    pub distance_m: f64,
    pub distance_label: String,
    /// Planar arrow orientation, see [`crate::engine::geomath::bearing_degrees`]
    pub bearing_deg: f64,
}

/// Render model of the whole route. Rebuilt from the store on every redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteView {
    pub waypoints: Vec<WaypointView>,
    pub segments: Vec<SegmentView>,
    pub total_distance_m: f64,
}

impl RouteView {
    pub fn build(waypoints: &[Waypoint]) -> Self {
        let len = waypoints.len();

        let segments: Vec<SegmentView> = waypoints
            .windows(2)
            .map(|pair| {
                let from = pair[0].coordinate();
                let to = pair[1].coordinate();
                let distance_m = distance_between(&from, &to);
                SegmentView {
                    from,
                    to,
                    midpoint: midpoint(&from, &to),
                    distance_m,
                    distance_label: format_distance(distance_m),
                    bearing_deg: bearing_between(&from, &to),
                }
            })
            .collect();

        let views = waypoints
            .iter()
            .enumerate()
            .map(|(index, wp)| {
                let role = WaypointRole::classify(index, len);
                let next = segments.get(index);
                WaypointView {
                    id: wp.id.clone(),
                    lat: wp.lat,
                    lng: wp.lng,
                    order: wp.order,
                    is_start: role == WaypointRole::Start,
                    is_end: role == WaypointRole::End,
                    next_segment_distance_m: next.map(|s| s.distance_m),
                    next_segment_distance_label: next.map(|s| s.distance_label.clone()),
                }
            })
            .collect();

        let total_distance_m = segments.iter().map(|s| s.distance_m).sum();

        Self {
            waypoints: views,
            segments,
            total_distance_m,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The connecting path is only drawn for two or more waypoints
    pub fn has_path(&self) -> bool {
        self.waypoints.len() > 1
    }

    pub fn find(&self, id: &WaypointId) -> Option<&WaypointView> {
        self.waypoints.iter().find(|wp| &wp.id == id)
    }

    /// Bounding box of the route with x = lng, y = lat
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let line: LineString<f64> = self
            .waypoints
            .iter()
            .map(|wp| (wp.lng, wp.lat))
            .collect::<Vec<_>>()
            .into();
        line.bounding_rect()
    }
}
