//! External collaborators
//!
//! The planner never renders, routes, geocodes or reads a GPS chip itself. These traits
//! describe what it expects from whatever map SDK, routing service, geocoder and
//! position stream the application plugs in.

use crate::{
    DirectionsResponse, GeocodeError, GeolocationError, InitializationError, LatLng,
    MapOptions, MarkerId, MarkerSpec, PlaceSelection, Route, RouteRequest, RouteStatus,
    coords::Bounds,
};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by asynchronous providers
///
/// Futures must be `Send` on native targets so they can be spawned onto a
/// multi-threaded runtime. Browser futures are driven by the JS event loop and are
/// usually not `Send`.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed future returned by asynchronous providers
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A map display: owns the rendered markers, the route overlay and the camera
pub trait MapSurface {
    /// Bind the surface to the display element called `container`
    fn attach(&mut self, container: &str, options: &MapOptions) -> Result<(), InitializationError>;

    /// Draw a marker, returning the id under which it can be removed
    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;

    /// Detach a marker. Unknown ids are ignored.
    fn remove_marker(&mut self, id: MarkerId);

    /// Draw a route overlay, replacing any previous one
    fn show_route(&mut self, route: &Route);

    /// Remove the route overlay, if any
    fn hide_route(&mut self);

    fn fit_bounds(&mut self, bounds: &Bounds);

    fn pan_to(&mut self, position: LatLng);

    fn set_zoom(&mut self, zoom: f64);
}

/// A routing backend
pub trait DirectionsService: Send + Sync {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<DirectionsResponse, RouteStatus>>;
}

/// Forward and reverse geocoding
pub trait Geocoder: Send + Sync {
    /// Resolve a coordinate to a formatted address
    fn reverse_geocode(&self, location: LatLng) -> BoxFuture<'_, Result<String, GeocodeError>>;

    /// Autocomplete: places matching free text
    fn search(&self, query: String) -> BoxFuture<'_, Result<Vec<PlaceSelection>, GeocodeError>>;
}

/// One reading of the device position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl PositionFix {
    pub fn coords(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Something the position stream reported
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionEvent {
    Fix(PositionFix),
    Error(GeolocationError),
}

/// Options for a continuous position watch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    pub timeout: std::time::Duration,
    pub maximum_age: std::time::Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: std::time::Duration::from_secs(5),
            maximum_age: std::time::Duration::ZERO,
        }
    }
}

/// A continuous device position stream
///
/// Events are queued by the source and drained with [`PositionSource::poll_event`]
/// from the UI thread.
pub trait PositionSource {
    /// Begin watching. Fails immediately when positioning is not available at all.
    fn watch(&mut self, options: &WatchOptions) -> Result<(), GeolocationError>;

    /// Stop watching. Must be safe to call when not watching.
    fn clear_watch(&mut self);

    /// Next queued event, if any
    fn poll_event(&mut self) -> Option<PositionEvent>;
}
