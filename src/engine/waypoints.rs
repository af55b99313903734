use bevy::prelude::{Event, Resource};
use log::{info, warn};

use crate::engine::models::{Coordinate, Waypoint, WaypointId, WaypointRole};

/// Requests emitted by the map surface and the waypoint list
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Clicked { lat: f64, lng: f64 },
    RemoveRequested(WaypointId),
}

/// Owns the ordered waypoint sequence.
///
/// Every mutation re-derives `order` from position, so orders are always
/// exactly `1..=len`.
#[derive(Resource, Debug, Default)]
pub struct WaypointStore {
    waypoints: Vec<Waypoint>,
    /// Never rewound, not even by `reset`, so ids are never reused
    next_seq: u64,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, id: &WaypointId) -> Option<&Waypoint> {
        self.waypoints.iter().find(|wp| &wp.id == id)
    }

    pub fn position_of(&self, id: &WaypointId) -> Option<usize> {
        self.waypoints.iter().position(|wp| &wp.id == id)
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.waypoints.iter().map(Waypoint::coordinate).collect()
    }

    pub fn role_of(&self, index: usize) -> WaypointRole {
        WaypointRole::classify(index, self.waypoints.len())
    }

    /// Appends a waypoint at the end of the route. The caller supplies in-range coordinates.
    pub fn append(&mut self, lat: f64, lng: f64) -> Waypoint {
        let waypoint = Waypoint {
            id: self.next_id(),
            lat,
            lng,
            order: self.waypoints.len() + 1,
        };
        self.waypoints.push(waypoint.clone());
        info!("Added waypoint: {:?}", waypoint);
        info!("Total waypoints: {}", self.waypoints.len());
        waypoint
    }

    /// Removes the waypoint with `id` and renumbers the survivors. Unknown ids are ignored.
    pub fn remove(&mut self, id: &WaypointId) -> &[Waypoint] {
        self.waypoints.retain(|wp| &wp.id != id);
        self.renumber();
        info!("Removed waypoint: {}", id);
        info!("Remaining waypoints: {}", self.waypoints.len());
        &self.waypoints
    }

    pub fn reset(&mut self) -> &[Waypoint] {
        self.waypoints.clear();
        info!("Reset all waypoints");
        &self.waypoints
    }

    /// Applies a surface event, returning the waypoint created by a click
    pub fn apply(&mut self, event: &SurfaceEvent) -> Option<Waypoint> {
        match event {
            SurfaceEvent::Clicked { lat, lng } => {
                if !lat.is_finite() || !lng.is_finite() {
                    warn!("Ignoring map click with non-finite coordinates ({}, {})", lat, lng);
                    return None;
                }
                Some(self.append(*lat, *lng))
            }
            SurfaceEvent::RemoveRequested(id) => {
                self.remove(id);
                None
            }
        }
    }

    fn renumber(&mut self) {
        for (index, wp) in self.waypoints.iter_mut().enumerate() {
            wp.order = index + 1;
        }
    }

    fn next_id(&mut self) -> WaypointId {
        let seq = self.next_seq;
        self.next_seq += 1;
        WaypointId::new(format!("wp-{}-{}", chrono::Utc::now().timestamp_millis(), seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn orders(store: &WaypointStore) -> Vec<usize> {
        store.waypoints().iter().map(|wp| wp.order).collect()
    }

    #[test]
    fn test_append_assigns_dense_orders() {
        let mut store = WaypointStore::new();
        for i in 0..5 {
            let wp = store.append(42.0 + i as f64 * 0.01, -71.0);
            assert_eq!(wp.order, i + 1);
        }
        assert_eq!(orders(&store), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_remove_middle_renumbers_survivors() {
        let mut store = WaypointStore::new();
        let a = store.append(1.0, 1.0);
        let b = store.append(2.0, 2.0);
        let c = store.append(3.0, 3.0);

        let remaining = store.remove(&b.id);
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].id, a.id);
        assert_eq!(remaining[1].id, c.id);
        assert_eq!(orders(&store), vec![1, 2]);
        assert_eq!(store.waypoints()[1].lat, 3.0);
    }

    #[test]
    fn test_remove_first_and_last() {
        let mut store = WaypointStore::new();
        let a = store.append(1.0, 1.0);
        let b = store.append(2.0, 2.0);
        let c = store.append(3.0, 3.0);

        store.remove(&a.id);
        assert_eq!(store.waypoints()[0].id, b.id);
        assert_eq!(orders(&store), vec![1, 2]);

        store.remove(&c.id);
        assert_eq!(store.len(), 1);
        assert_eq!(orders(&store), vec![1]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut store = WaypointStore::new();
        store.append(1.0, 1.0);
        store.append(2.0, 2.0);
        let before = store.waypoints().to_vec();

        store.remove(&WaypointId::new("wp-does-not-exist"));
        assert_eq!(store.waypoints(), before.as_slice());

        // Removing twice is as harmless as removing once
        let id = before[0].id.clone();
        store.remove(&id);
        store.remove(&id);
        assert_eq!(store.len(), 1);
        assert_eq!(orders(&store), vec![1]);
    }

    #[test]
    fn test_reset_clears_but_never_reuses_ids() {
        let mut store = WaypointStore::new();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            seen.insert(store.append(0.0, 0.0).id);
        }
        assert!(store.reset().is_empty());
        assert!(store.is_empty());

        for _ in 0..3 {
            let wp = store.append(0.0, 0.0);
            assert!(seen.insert(wp.id), "id reused after reset");
        }
        assert_eq!(orders(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_unique_for_rapid_appends() {
        let mut store = WaypointStore::new();
        let ids: HashSet<_> = (0..100).map(|_| store.append(0.0, 0.0).id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_apply_surface_events() {
        let mut store = WaypointStore::new();
        let created = store.apply(&SurfaceEvent::Clicked { lat: 42.36, lng: -71.06 });
        assert!(created.is_some());
        assert_eq!(store.len(), 1);

        assert!(store.apply(&SurfaceEvent::Clicked { lat: f64::NAN, lng: 0.0 }).is_none());
        assert_eq!(store.len(), 1);

        let id = store.waypoints()[0].id.clone();
        assert!(store.apply(&SurfaceEvent::RemoveRequested(id)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_lookup_and_roles() {
        let mut store = WaypointStore::new();
        let only = store.append(5.0, 5.0);
        assert_eq!(store.role_of(0), WaypointRole::Intermediate);
        assert_eq!(store.position_of(&only.id), Some(0));
        assert_eq!(store.get(&only.id).map(|wp| wp.lat), Some(5.0));

        store.append(6.0, 6.0);
        store.append(7.0, 7.0);
        assert_eq!(store.role_of(0), WaypointRole::Start);
        assert_eq!(store.role_of(1), WaypointRole::Intermediate);
        assert_eq!(store.role_of(2), WaypointRole::End);
        assert_eq!(store.coordinates()[2], Coordinate::new(7.0, 7.0));
    }
}
