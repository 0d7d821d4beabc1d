//! In-memory collaborators for unit tests

use crate::provider::{
    BoxFuture, DirectionsService, MapSurface, PositionEvent, PositionSource, WatchOptions,
};
use crate::{
    Bounds, DirectionsResponse, Distance, GeolocationError, InitializationError, LatLng,
    MapOptions, MarkerId, MarkerSpec, Route, RouteLeg, RouteRequest, RouteStatus, TravelTime,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Build a route visiting `stops` in order, one leg per consecutive pair
pub fn sample_route(stops: &[LatLng]) -> Route {
    let legs = stops
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let meters = pair[0].distance_to(&pair[1]);
            RouteLeg {
                start_address: format!("Stop {i}"),
                end_address: format!("Stop {}", i + 1),
                start_location: pair[0],
                end_location: pair[1],
                distance: Distance::from_meters(meters),
                duration: TravelTime::from_seconds(meters / 10.0),
            }
        })
        .collect();

    let bounds = Bounds::from_points(stops)
        .unwrap_or_else(|| Bounds::new(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.0)));

    Route {
        summary: "Sample".to_string(),
        legs,
        path: stops.to_vec(),
        bounds,
        waypoint_order: (0..stops.len().saturating_sub(2)).collect(),
    }
}

/// A map surface that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Fail `attach` with this error
    pub attach_error: Option<InitializationError>,
    pub attached: bool,
    pub markers: BTreeMap<MarkerId, MarkerSpec>,
    pub next_id: u64,
    pub route: Option<Route>,
    pub fitted: Vec<Bounds>,
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    /// Every mutation, in order, for asserting "nothing happened"
    pub calls: Vec<&'static str>,
}

impl RecordingSurface {
    pub fn failing(error: InitializationError) -> Self {
        Self {
            attach_error: Some(error),
            ..Default::default()
        }
    }
}

impl MapSurface for RecordingSurface {
    fn attach(&mut self, _container: &str, options: &MapOptions) -> Result<(), InitializationError> {
        self.calls.push("attach");
        if let Some(err) = self.attach_error.clone() {
            return Err(err);
        }
        self.attached = true;
        self.center = Some(options.center);
        self.zoom = Some(options.zoom);
        Ok(())
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        self.calls.push("add_marker");
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.calls.push("remove_marker");
        self.markers.remove(&id);
    }

    fn show_route(&mut self, route: &Route) {
        self.calls.push("show_route");
        self.route = Some(route.clone());
    }

    fn hide_route(&mut self) {
        self.calls.push("hide_route");
        self.route = None;
    }

    fn fit_bounds(&mut self, bounds: &Bounds) {
        self.calls.push("fit_bounds");
        self.fitted.push(*bounds);
    }

    fn pan_to(&mut self, position: LatLng) {
        self.calls.push("pan_to");
        self.center = Some(position);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.calls.push("set_zoom");
        self.zoom = Some(zoom);
    }
}

/// A routing backend answering every request with the same outcome
pub struct FakeDirections {
    outcome: Result<DirectionsResponse, RouteStatus>,
    pub requests: Mutex<Vec<RouteRequest>>,
}

impl FakeDirections {
    pub fn answering(outcome: Result<DirectionsResponse, RouteStatus>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl DirectionsService for FakeDirections {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<DirectionsResponse, RouteStatus>> {
        self.requests.lock().unwrap().push(request);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// A routing backend that routes straight through the requested stops
pub struct EchoDirections {
    pub requests: Mutex<Vec<RouteRequest>>,
}

impl EchoDirections {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl DirectionsService for EchoDirections {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<DirectionsResponse, RouteStatus>> {
        let mut stops = vec![request.origin];
        stops.extend(request.waypoints.iter().map(|w| w.location));
        stops.push(request.destination);
        self.requests.lock().unwrap().push(request);
        let route = sample_route(&stops);
        Box::pin(async move { Ok(DirectionsResponse { routes: vec![route] }) })
    }
}

/// A position source fed by the test
#[derive(Debug, Default)]
pub struct QueuedPositions {
    pub unsupported: bool,
    pub watching: bool,
    pub watch_calls: usize,
    pub clear_calls: usize,
    pub options: Option<WatchOptions>,
    pub events: VecDeque<PositionEvent>,
}

impl QueuedPositions {
    pub fn push(&mut self, event: PositionEvent) {
        self.events.push_back(event);
    }
}

impl PositionSource for QueuedPositions {
    fn watch(&mut self, options: &WatchOptions) -> Result<(), GeolocationError> {
        self.watch_calls += 1;
        if self.unsupported {
            return Err(GeolocationError::Unsupported);
        }
        self.watching = true;
        self.options = Some(*options);
        Ok(())
    }

    fn clear_watch(&mut self) {
        self.clear_calls += 1;
        self.watching = false;
    }

    fn poll_event(&mut self) -> Option<PositionEvent> {
        self.events.pop_front()
    }
}
