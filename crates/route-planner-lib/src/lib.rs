//! Route Planner Library - Map State and Route Orchestration
//!
//! This library holds the client-side logic of the route planner: what the user has
//! selected, how a driving route request is assembled from those selections, how map
//! markers follow the current route, and how the device position is watched and
//! reverse-geocoded. All map rendering, routing, geocoding and positioning is delegated
//! to external collaborators described by the traits in [`provider`].
//!
//! # Architecture
//!
//! - **[`LocationWatcher`]**: Wraps a position stream and debounces address lookups
//! - **[`MapStateStore`]**: Destination, deduplicated waypoints and the last route
//! - **[`MapService`]**: Owns the map surface and markers, issues route requests
//! - **[`SearchForm`]**: Validates origin/destination/waypoint input before routing
//!
//! Everything runs on the UI thread. Provider calls return futures that the caller
//! drives (or spawns) and hands back to the component that issued them.

pub mod coords;
pub mod format;
mod location;
mod marker;
mod place;
pub mod provider;
mod route;
mod search;
mod service;
mod state;

#[cfg(test)]
mod testing;

// Public API exports
pub use coords::{Bounds, LatLng, Position};
pub use location::{
    AccuracyLevel, GEOCODE_DEBOUNCE, GeocodeTicket, LocationState, LocationWatcher,
    format_accuracy,
};
pub use marker::{
    MarkerHandle, MarkerId, MarkerOptions, MarkerRole, MarkerSpec, MarkerStyle, PinShape, Rgb,
};
pub use place::PlaceSelection;
pub use route::{
    DirectionsResponse, Distance, MAX_WAYPOINTS, Route, RouteLeg, RouteRequest,
    RouteResult, RouteStatus, RouteWaypoint, TravelMode, TravelTime,
};
pub use search::{PlaceField, RouteSelection, SearchForm, SelectionField};
pub use service::{Endpoint, MapOptions, MapService, RouteJob, ServiceState};
pub use state::{MapState, MapStateStore};

/// Failure to bring a map surface up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitializationError {
    #[error("Element with id \"{0}\" not found")]
    ContainerNotFound(String),

    #[error("Map library not loaded")]
    LibraryUnavailable,
}

/// Errors raised by the map service facade
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map initialization failed: {0}")]
    Initialization(#[from] InitializationError),

    #[error("Map service initialization has not completed")]
    NotInitialized,

    #[error("{}", .0.message())]
    Routing(RouteStatus),
}

impl From<RouteStatus> for MapError {
    fn from(status: RouteStatus) -> Self {
        MapError::Routing(status)
    }
}

/// Failures reported by the device position stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Unable to retrieve your location. Please enable location services.")]
    PermissionDenied,

    #[error("Unable to retrieve your location. Please enable location services.")]
    Timeout,

    #[error("Unable to retrieve your location. Please enable location services.")]
    PositionUnavailable,

    #[error("Geolocation is not supported by your browser")]
    Unsupported,
}

/// Address lookup failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("No results found")]
    NoResults,

    #[error("Geocoding failed: {0}")]
    Provider(String),
}

/// User input that cannot be turned into a route yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Please select a valid location from the dropdown")]
    Unresolved { field: SelectionField },
}

/// Any error produced by this library
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _: fn() -> MapStateStore = MapStateStore::new;
        let _: fn() -> SearchForm = SearchForm::new;
    }

    #[test]
    fn test_routing_error_uses_status_message() {
        let err = MapError::from(RouteStatus::ZeroResults);
        assert_eq!(
            err.to_string(),
            "No route could be found between the origin and destination"
        );
    }

    #[test]
    fn test_planner_error_from_variants() {
        let err: PlannerError = GeolocationError::Unsupported.into();
        assert_eq!(err.to_string(), "Geolocation is not supported by your browser");

        let err: PlannerError = MapError::NotInitialized.into();
        assert!(err.to_string().contains("initialization"));
    }
}
