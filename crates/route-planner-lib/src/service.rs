//! Map Service Facade
//!
//! [`MapService`] owns one map surface for the lifetime of a view. It tracks every marker
//! it placed so they can be torn down in bulk, and turns user selections into routing
//! requests whose results it draws.

use crate::provider::{DirectionsService, MapSurface};
use crate::{
    Bounds, LatLng, MAX_WAYPOINTS, MapError, MarkerHandle, MarkerOptions, MarkerRole,
    MarkerSpec, MarkerStyle, PlaceSelection, RouteRequest, RouteResult, RouteStatus,
    RouteWaypoint, TravelMode, InitializationError,
};
use std::sync::Arc;

/// Lifecycle of a [`MapService`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    /// Initialization failed; the instance cannot be used any more
    Failed(InitializationError),
}

/// Initial camera and controls of a map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub show_zoom_controls: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            zoom: 14.0,
            show_zoom_controls: true,
        }
    }
}

/// A route endpoint as supplied by a caller: a literal coordinate or a chosen place
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Coordinate(LatLng),
    Place(PlaceSelection),
}

impl Endpoint {
    /// The coordinate this endpoint stands for, if it has a usable one
    pub fn resolve(&self) -> Option<LatLng> {
        match self {
            Endpoint::Coordinate(coord) => coord.is_valid().then_some(*coord),
            Endpoint::Place(place) => place.location(),
        }
    }
}

impl From<LatLng> for Endpoint {
    fn from(value: LatLng) -> Self {
        Endpoint::Coordinate(value)
    }
}

impl From<PlaceSelection> for Endpoint {
    fn from(value: PlaceSelection) -> Self {
        Endpoint::Place(value)
    }
}

/// A validated routing request waiting to be sent
///
/// Produced by [`MapService::begin_route`]. Running it does not touch the map, so it can
/// be moved onto a background task; the outcome goes back through
/// [`MapService::complete_route`].
pub struct RouteJob {
    request: RouteRequest,
    directions: Arc<dyn DirectionsService>,
}

impl RouteJob {
    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    /// Ask the routing backend and validate its answer
    pub async fn run(self) -> Result<RouteResult, RouteStatus> {
        let RouteJob {
            request,
            directions,
        } = self;
        let response = directions.route(request).await?;
        RouteResult::from_response(response)
    }
}

impl std::fmt::Debug for RouteJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteJob")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Facade over a map surface and a routing backend
pub struct MapService<S: MapSurface> {
    surface: S,
    state: ServiceState,
    markers: Vec<MarkerHandle>,
    directions: Option<Arc<dyn DirectionsService>>,
    route_shown: bool,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: MapSurface> MapService<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: ServiceState::Uninitialized,
            markers: Vec::new(),
            directions: None,
            route_shown: false,
        }
    }

    pub fn with_directions(mut self, directions: Arc<dyn DirectionsService>) -> Self {
        self.directions = Some(directions);
        self
    }

    pub fn set_directions(&mut self, directions: Arc<dyn DirectionsService>) {
        self.directions = Some(directions);
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ServiceState::Ready
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Markers currently placed by this service
    pub fn markers(&self) -> &[MarkerHandle] {
        &self.markers
    }

    /// Whether a route overlay is on the map
    pub fn has_route(&self) -> bool {
        self.route_shown
    }

    /// Bind the surface to `container`
    ///
    /// Calling this again once ready does nothing. A failed instance keeps reporting its
    /// first failure.
    pub fn initialize(&mut self, container: &str, options: &MapOptions) -> Result<(), MapError> {
        match &self.state {
            ServiceState::Ready => {
                tracing::debug!("Map already initialized");
                return Ok(());
            }
            ServiceState::Failed(err) => return Err(err.clone().into()),
            ServiceState::Uninitialized | ServiceState::Initializing => {}
        }

        self.state = ServiceState::Initializing;
        match self.surface.attach(container, options) {
            Ok(()) => {
                tracing::info!("Map initialized in \"{container}\"");
                self.state = ServiceState::Ready;
                Ok(())
            }
            Err(err) => {
                tracing::error!("Map initialization failed: {err}");
                self.state = ServiceState::Failed(err.clone());
                Err(err.into())
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), MapError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MapError::NotInitialized)
        }
    }

    fn place(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let role = spec.role;
        let position = spec.position;
        let id = self.surface.add_marker(spec);
        let handle = MarkerHandle { id, role, position };
        self.markers.push(handle);
        handle
    }

    /// Origin marker; the styled blue pin when `custom_pin` is set
    pub fn create_marker(&mut self, options: MarkerOptions) -> Result<MarkerHandle, MapError> {
        self.ensure_ready()?;
        let style = if options.custom_pin {
            MarkerStyle::origin()
        } else {
            MarkerStyle::provider_default()
        };
        Ok(self.place(MarkerSpec {
            position: options.position,
            title: options.title,
            role: MarkerRole::Origin,
            style,
        }))
    }

    /// Yellow pin labelled `index + 1`
    pub fn create_waypoint_marker(
        &mut self,
        position: LatLng,
        index: usize,
        title: Option<String>,
    ) -> Result<MarkerHandle, MapError> {
        self.ensure_ready()?;
        Ok(self.place(MarkerSpec {
            position,
            title,
            role: MarkerRole::Waypoint(index),
            style: MarkerStyle::waypoint(index),
        }))
    }

    pub fn create_destination_marker(
        &mut self,
        position: LatLng,
        title: Option<String>,
    ) -> Result<MarkerHandle, MapError> {
        self.ensure_ready()?;
        Ok(self.place(MarkerSpec {
            position,
            title,
            role: MarkerRole::Destination,
            style: MarkerStyle::destination(),
        }))
    }

    pub fn create_user_location_marker(&mut self, position: LatLng) -> Result<MarkerHandle, MapError> {
        self.ensure_ready()?;
        Ok(self.place(MarkerSpec {
            position,
            title: Some("Your Location".to_string()),
            role: MarkerRole::UserLocation,
            style: MarkerStyle::user_location(),
        }))
    }

    /// Remove every tracked marker from the map
    pub fn clear_markers(&mut self) {
        for handle in self.markers.drain(..) {
            self.surface.remove_marker(handle.id);
        }
    }

    /// Validate inputs and build the routing request
    ///
    /// Nothing is sent and nothing on the map changes. Fails when the service is not
    /// ready or has no routing backend, when an endpoint has no usable coordinate, or
    /// when there are more than [`MAX_WAYPOINTS`] waypoints.
    pub fn begin_route(
        &self,
        origin: impl Into<Endpoint>,
        destination: impl Into<Endpoint>,
        waypoints: &[Endpoint],
    ) -> Result<RouteJob, MapError> {
        self.ensure_ready()?;
        let Some(directions) = self.directions.clone() else {
            tracing::warn!("No routing backend configured");
            return Err(MapError::NotInitialized);
        };

        if waypoints.len() > MAX_WAYPOINTS {
            return Err(RouteStatus::MaxWaypointsExceeded.into());
        }

        let origin = origin.into().resolve().ok_or(RouteStatus::InvalidRequest)?;
        let destination = destination
            .into()
            .resolve()
            .ok_or(RouteStatus::InvalidRequest)?;
        let waypoints = waypoints
            .iter()
            .map(|w| {
                w.resolve().map(|location| RouteWaypoint {
                    location,
                    stopover: true,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(RouteStatus::InvalidRequest)?;

        let request = RouteRequest {
            origin,
            destination,
            waypoints,
            optimize_waypoints: true,
            travel_mode: TravelMode::Driving,
        };
        tracing::debug!(
            "Route request {} -> {} via {} waypoints",
            request.origin,
            request.destination,
            request.waypoints.len()
        );

        Ok(RouteJob {
            request,
            directions,
        })
    }

    /// Apply the outcome of a [`RouteJob`]
    ///
    /// On success the previous markers are replaced by start, end and numbered
    /// waypoint pins placed where the route's legs actually begin and end, the overlay
    /// is drawn and the camera fits the route. A failure leaves the map untouched.
    pub fn complete_route(
        &mut self,
        outcome: Result<RouteResult, RouteStatus>,
    ) -> Result<RouteResult, MapError> {
        let result = match outcome {
            Ok(result) => result,
            Err(status) => {
                tracing::error!("Route calculation failed: {status:?}");
                return Err(status.into());
            }
        };
        if !self.is_ready() {
            tracing::warn!("Dropping route result for a map that is no longer ready");
            return Err(MapError::NotInitialized);
        }

        self.clear_markers();

        let route = result.primary().clone();
        self.surface.show_route(&route);
        self.route_shown = true;

        if let Some(first) = route.legs.first() {
            self.place(MarkerSpec {
                position: first.start_location,
                title: Some(first.start_address.clone()),
                role: MarkerRole::Origin,
                style: MarkerStyle::origin(),
            });
        }
        for (index, leg) in route.via_locations().enumerate() {
            self.place(MarkerSpec {
                position: leg.end_location,
                title: Some(leg.end_address.clone()),
                role: MarkerRole::Waypoint(index),
                style: MarkerStyle::waypoint(index),
            });
        }
        if let Some(last) = route.legs.last() {
            self.place(MarkerSpec {
                position: last.end_location,
                title: Some(last.end_address.clone()),
                role: MarkerRole::Destination,
                style: MarkerStyle::destination(),
            });
        }

        self.surface.fit_bounds(&route.bounds);
        tracing::info!(
            "Route ready: {} over {} legs",
            result.total_distance_text(),
            route.legs.len()
        );
        Ok(result)
    }

    /// Compute a driving route and draw it
    pub async fn calculate_route(
        &mut self,
        origin: impl Into<Endpoint>,
        destination: impl Into<Endpoint>,
        waypoints: &[Endpoint],
    ) -> Result<RouteResult, MapError> {
        let job = self.begin_route(origin, destination, waypoints)?;
        let outcome = job.run().await;
        self.complete_route(outcome)
    }

    /// Remove the route overlay. Markers are left alone.
    pub fn clear_route(&mut self) -> Result<(), MapError> {
        self.ensure_ready()?;
        if self.route_shown {
            self.surface.hide_route();
            self.route_shown = false;
        }
        Ok(())
    }

    /// Draw pins for the current selection when no route is displayed
    ///
    /// Existing markers are replaced. Selections without a coordinate get no pin.
    pub fn show_selection(
        &mut self,
        user: Option<LatLng>,
        destination: Option<&PlaceSelection>,
        waypoints: &[PlaceSelection],
    ) -> Result<(), MapError> {
        self.ensure_ready()?;
        if self.route_shown {
            return Ok(());
        }

        self.clear_markers();
        if let Some(position) = user {
            self.create_user_location_marker(position)?;
        }
        for (index, waypoint) in waypoints.iter().enumerate() {
            if let Some(location) = waypoint.location() {
                self.create_waypoint_marker(location, index, waypoint.title())?;
            }
        }
        if let Some(place) = destination
            && let Some(location) = place.location()
        {
            self.create_destination_marker(location, place.title())?;
        }
        Ok(())
    }

    pub fn pan_to(&mut self, position: LatLng) {
        if self.is_ready() {
            self.surface.pan_to(position);
        } else {
            tracing::debug!("pan_to ignored, map not initialized");
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.is_ready() {
            self.surface.set_zoom(zoom);
        } else {
            tracing::debug!("set_zoom ignored, map not initialized");
        }
    }

    /// Fit the camera to `bounds`; ignored unless ready
    pub fn fit_bounds(&mut self, bounds: &Bounds) {
        if self.is_ready() {
            self.surface.fit_bounds(bounds);
        }
    }

    /// Release the map when its view goes away
    pub fn teardown(&mut self) {
        self.clear_markers();
        if self.route_shown {
            self.surface.hide_route();
            self.route_shown = false;
        }
        self.state = ServiceState::Uninitialized;
        tracing::info!("Map service torn down");
    }
}
