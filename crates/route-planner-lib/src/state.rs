//! Map State Store
//!
//! Holds the destination, the waypoint list and the last computed route. Each update
//! builds a new [`MapState`] and swaps it in whole, so readers never observe a partial
//! change.

use crate::{PlaceSelection, RouteResult};

/// A snapshot of the user's route selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapState {
    pub destination: Option<PlaceSelection>,
    /// Insertion order, no two entries at the same coordinate
    pub waypoints: Vec<PlaceSelection>,
    pub directions: Option<RouteResult>,
}

impl MapState {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.waypoints.is_empty() && self.directions.is_none()
    }
}

/// Single-cell store for [`MapState`]
#[derive(Debug, Default)]
pub struct MapStateStore {
    state: MapState,
    revision: u64,
}

impl MapStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    /// Incremented on every applied change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the destination. Selections without a coordinate are ignored.
    pub fn set_destination(&mut self, selection: PlaceSelection) {
        if !selection.is_resolvable() {
            tracing::debug!("Ignoring destination without a coordinate");
            return;
        }
        self.replace(MapState {
            destination: Some(selection),
            ..self.state.clone()
        });
    }

    /// Append a waypoint unless one already sits at exactly the same coordinate
    ///
    /// Returns whether the waypoint was added.
    pub fn add_waypoint(&mut self, selection: PlaceSelection) -> bool {
        let Some(location) = selection.location() else {
            tracing::debug!("Ignoring waypoint without a coordinate");
            return false;
        };
        if self
            .state
            .waypoints
            .iter()
            .any(|w| w.location() == Some(location))
        {
            tracing::debug!("Waypoint at {location} already present");
            return false;
        }

        let mut waypoints = self.state.waypoints.clone();
        waypoints.push(selection);
        self.replace(MapState {
            waypoints,
            ..self.state.clone()
        });
        true
    }

    /// Remove the waypoint at `index`; later waypoints move down by one
    pub fn remove_waypoint(&mut self, index: usize) -> Option<PlaceSelection> {
        if index >= self.state.waypoints.len() {
            tracing::warn!(
                "Waypoint index {index} out of range ({} waypoints)",
                self.state.waypoints.len()
            );
            return None;
        }

        let mut waypoints = self.state.waypoints.clone();
        let removed = waypoints.remove(index);
        self.replace(MapState {
            waypoints,
            ..self.state.clone()
        });
        Some(removed)
    }

    /// Record the last computed route
    pub fn set_directions(&mut self, directions: Option<RouteResult>) {
        self.replace(MapState {
            directions,
            ..self.state.clone()
        });
    }

    /// Forget destination, waypoints and route at once
    pub fn clear_route(&mut self) {
        self.replace(MapState::default());
    }

    fn replace(&mut self, state: MapState) {
        self.state = state;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_route;
    use crate::{DirectionsResponse, LatLng};

    fn place(lat: f64, lng: f64, name: &str) -> PlaceSelection {
        PlaceSelection::resolved(LatLng::new(lat, lng), name, name, name)
    }

    #[test]
    fn test_duplicate_waypoint_is_noop() {
        let mut store = MapStateStore::new();
        assert!(store.add_waypoint(place(37.7955, -122.3937, "Ferry Building")));
        let revision = store.revision();

        // Same coordinate, different label
        assert!(!store.add_waypoint(place(37.7955, -122.3937, "Embarcadero")));
        assert_eq!(store.state().waypoints.len(), 1);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_unresolvable_selections_ignored() {
        let mut store = MapStateStore::new();
        store.set_destination(PlaceSelection::unresolved("somewhere"));
        assert!(!store.add_waypoint(PlaceSelection::unresolved("elsewhere")));
        assert!(store.state().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_remove_waypoint_shifts_indices() {
        let mut store = MapStateStore::new();
        store.add_waypoint(place(1.0, 1.0, "a"));
        store.add_waypoint(place(2.0, 2.0, "b"));
        store.add_waypoint(place(3.0, 3.0, "c"));

        let removed = store.remove_waypoint(0).unwrap();
        assert_eq!(removed.name.as_deref(), Some("a"));
        let names: Vec<_> = store
            .state()
            .waypoints
            .iter()
            .filter_map(|w| w.name.as_deref())
            .collect();
        assert_eq!(names, ["b", "c"]);

        assert!(store.remove_waypoint(5).is_none());
        assert_eq!(store.state().waypoints.len(), 2);
    }

    #[test]
    fn test_clear_route_resets_everything() {
        let mut store = MapStateStore::new();
        store.set_destination(place(37.7694, -122.4862, "Golden Gate Park"));
        store.add_waypoint(place(37.7955, -122.3937, "Ferry Building"));
        let route = sample_route(&[LatLng::new(37.7749, -122.4194), LatLng::new(37.7694, -122.4862)]);
        store.set_directions(RouteResult::from_response(DirectionsResponse { routes: vec![route] }).ok());
        assert!(store.state().directions.is_some());

        store.clear_route();
        let state = store.state();
        assert!(state.destination.is_none());
        assert!(state.waypoints.is_empty());
        assert!(state.directions.is_none());
    }

    #[test]
    fn test_set_destination_replaces() {
        let mut store = MapStateStore::new();
        store.set_destination(place(1.0, 1.0, "first"));
        store.set_destination(place(2.0, 2.0, "second"));
        let destination = store.state().destination.as_ref().unwrap();
        assert_eq!(destination.name.as_deref(), Some("second"));
    }
}
