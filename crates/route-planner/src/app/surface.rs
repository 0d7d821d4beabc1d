//! `walkers`-backed map surface
//!
//! Keeps the markers and route overlay requested by the map service and replays camera
//! requests onto the [`MapMemory`] at the start of each frame.

use route_planner_lib::provider::MapSurface;
use route_planner_lib::{
    Bounds, InitializationError, LatLng, MapOptions, MarkerId, MarkerSpec, Route,
};
use std::collections::BTreeMap;
use walkers::MapMemory;

/// Id of the central map panel, the only container a surface can attach to
pub const MAP_CONTAINER_ID: &str = "map";

/// Zoom level used when fitting a box with no extent
const POINT_ZOOM: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CameraRequest {
    Fit(Bounds),
    Pan(LatLng),
    Zoom(f64),
}

#[derive(Debug, Default)]
pub struct WalkersSurface {
    next_id: u64,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    route: Option<Vec<LatLng>>,
    camera: Vec<CameraRequest>,
}

/// Center and zoom that show `bounds` entirely
pub fn fit_camera(bounds: &Bounds) -> (LatLng, f64) {
    let max_span = bounds.max_span();
    let zoom = if max_span > 0.0 {
        let zoom_estimate = (4.0 * 360.0 / max_span).log2();
        (zoom_estimate - 0.5).clamp(1.0, 18.0)
    } else {
        POINT_ZOOM
    };
    (bounds.center(), zoom)
}

impl WalkersSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values()
    }

    /// Polyline of the displayed route
    pub fn route_path(&self) -> Option<&[LatLng]> {
        self.route.as_deref()
    }

    /// Apply pending camera moves
    pub fn apply_camera(&mut self, memory: &mut MapMemory) {
        for request in self.camera.drain(..) {
            match request {
                CameraRequest::Fit(bounds) => {
                    let (center, zoom) = fit_camera(&bounds);
                    memory.center_at(walkers::lat_lon(center.lat, center.lng));
                    let _ = memory.set_zoom(zoom);
                    tracing::trace!("Fitted camera to {center} at zoom {zoom:.1}");
                }
                CameraRequest::Pan(position) => {
                    memory.center_at(walkers::lat_lon(position.lat, position.lng));
                }
                CameraRequest::Zoom(zoom) => {
                    let _ = memory.set_zoom(zoom);
                }
            }
        }
    }
}

impl MapSurface for WalkersSurface {
    fn attach(&mut self, container: &str, options: &MapOptions) -> Result<(), InitializationError> {
        if container != MAP_CONTAINER_ID {
            return Err(InitializationError::ContainerNotFound(container.to_string()));
        }
        self.camera.push(CameraRequest::Pan(options.center));
        self.camera.push(CameraRequest::Zoom(options.zoom));
        Ok(())
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.insert(id, marker);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn show_route(&mut self, route: &Route) {
        self.route = Some(route.path.clone());
    }

    fn hide_route(&mut self) {
        self.route = None;
    }

    fn fit_bounds(&mut self, bounds: &Bounds) {
        self.camera.push(CameraRequest::Fit(*bounds));
    }

    fn pan_to(&mut self, position: LatLng) {
        self.camera.push(CameraRequest::Pan(position));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.camera.push(CameraRequest::Zoom(zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_lib::{MarkerRole, MarkerStyle};

    #[test]
    fn test_attach_requires_map_container() {
        let mut surface = WalkersSurface::new();
        assert_eq!(
            surface.attach("sidebar", &MapOptions::default()),
            Err(InitializationError::ContainerNotFound("sidebar".to_string()))
        );
        assert!(surface.attach(MAP_CONTAINER_ID, &MapOptions::default()).is_ok());
        assert_eq!(surface.camera.len(), 2);
    }

    #[test]
    fn test_marker_bookkeeping() {
        let mut surface = WalkersSurface::new();
        let spec = MarkerSpec {
            position: LatLng::new(1.0, 2.0),
            title: None,
            role: MarkerRole::Destination,
            style: MarkerStyle::destination(),
        };
        let a = surface.add_marker(spec.clone());
        let b = surface.add_marker(spec);
        assert_ne!(a, b);
        surface.remove_marker(a);
        surface.remove_marker(a);
        assert_eq!(surface.markers().count(), 1);
    }

    #[test]
    fn test_fit_camera() {
        let bounds = Bounds::new(LatLng::new(37.76, -122.49), LatLng::new(37.80, -122.39));
        let (center, zoom) = fit_camera(&bounds);
        assert!((center.lat - 37.78).abs() < 1e-9);
        assert!((center.lng + 122.44).abs() < 1e-9);
        assert!(zoom > 10.0 && zoom < 14.0);

        let point = Bounds::new(LatLng::new(1.0, 1.0), LatLng::new(1.0, 1.0));
        assert_eq!(fit_camera(&point).1, POINT_ZOOM);
    }
}
