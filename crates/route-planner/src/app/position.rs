//! Device position sources
//!
//! Native builds have no portable positioning API, so the position comes from
//! `--location` (and can be moved from the map). In the browser,
//! `navigator.geolocation.watchPosition` is used unless `--location` was given.

use route_planner_lib::provider::{PositionEvent, PositionFix, PositionSource, WatchOptions};
use route_planner_lib::{GeolocationError, LatLng, LocationWatcher};
use std::collections::VecDeque;

/// A position set by the user rather than measured
#[derive(Debug, Default)]
pub struct FixedPosition {
    position: Option<LatLng>,
    watching: bool,
    events: VecDeque<PositionEvent>,
}

impl FixedPosition {
    pub fn new(position: Option<LatLng>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Move the position; reported as a new fix while watched
    pub fn move_to(&mut self, position: LatLng) {
        self.position = Some(position);
        if self.watching {
            self.events.push_back(PositionEvent::Fix(fix_at(position)));
        }
    }
}

fn fix_at(position: LatLng) -> PositionFix {
    PositionFix {
        latitude: position.lat,
        longitude: position.lng,
        accuracy: Some(0.0),
        timestamp: 0,
    }
}

impl PositionSource for FixedPosition {
    fn watch(&mut self, _options: &WatchOptions) -> Result<(), GeolocationError> {
        let Some(position) = self.position else {
            return Err(GeolocationError::Unsupported);
        };
        self.watching = true;
        self.events.push_back(PositionEvent::Fix(fix_at(position)));
        Ok(())
    }

    fn clear_watch(&mut self) {
        self.watching = false;
        self.events.clear();
    }

    fn poll_event(&mut self) -> Option<PositionEvent> {
        self.events.pop_front()
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::{GeolocationPosition, GeolocationPositionError, PositionOptions};

    type Queue = Rc<RefCell<VecDeque<PositionEvent>>>;

    struct ActiveWatch {
        id: i32,
        _on_fix: Closure<dyn FnMut(GeolocationPosition)>,
        _on_error: Closure<dyn FnMut(GeolocationPositionError)>,
    }

    /// `navigator.geolocation` position stream
    pub struct BrowserPosition {
        ctx: egui::Context,
        events: Queue,
        watch: Option<ActiveWatch>,
    }

    impl BrowserPosition {
        pub fn new(ctx: egui::Context) -> Self {
            Self {
                ctx,
                events: Rc::new(RefCell::new(VecDeque::new())),
                watch: None,
            }
        }
    }

    fn geolocation() -> Option<web_sys::Geolocation> {
        web_sys::window()?.navigator().geolocation().ok()
    }

    fn error_kind(error: &GeolocationPositionError) -> GeolocationError {
        match error.code() {
            GeolocationPositionError::PERMISSION_DENIED => GeolocationError::PermissionDenied,
            GeolocationPositionError::TIMEOUT => GeolocationError::Timeout,
            _ => GeolocationError::PositionUnavailable,
        }
    }

    impl PositionSource for BrowserPosition {
        fn watch(&mut self, options: &WatchOptions) -> Result<(), GeolocationError> {
            let geolocation = geolocation().ok_or(GeolocationError::Unsupported)?;

            let queue = self.events.clone();
            let ctx = self.ctx.clone();
            let on_fix = Closure::<dyn FnMut(GeolocationPosition)>::new(
                move |position: GeolocationPosition| {
                    let coords = position.coords();
                    queue.borrow_mut().push_back(PositionEvent::Fix(PositionFix {
                        latitude: coords.latitude(),
                        longitude: coords.longitude(),
                        accuracy: Some(coords.accuracy()),
                        timestamp: position.timestamp() as u64,
                    }));
                    ctx.request_repaint();
                },
            );

            let queue = self.events.clone();
            let ctx = self.ctx.clone();
            let on_error = Closure::<dyn FnMut(GeolocationPositionError)>::new(
                move |error: GeolocationPositionError| {
                    queue
                        .borrow_mut()
                        .push_back(PositionEvent::Error(error_kind(&error)));
                    ctx.request_repaint();
                },
            );

            let js_options = PositionOptions::new();
            js_options.set_enable_high_accuracy(options.enable_high_accuracy);
            js_options.set_timeout(options.timeout.as_millis() as u32);
            js_options.set_maximum_age(options.maximum_age.as_millis() as u32);

            let id = geolocation
                .watch_position_with_error_callback_and_options(
                    on_fix.as_ref().unchecked_ref(),
                    Some(on_error.as_ref().unchecked_ref()),
                    &js_options,
                )
                .map_err(|err| {
                    tracing::warn!("watchPosition failed: {err:?}");
                    GeolocationError::Unsupported
                })?;

            self.watch = Some(ActiveWatch {
                id,
                _on_fix: on_fix,
                _on_error: on_error,
            });
            Ok(())
        }

        fn clear_watch(&mut self) {
            if let Some(watch) = self.watch.take()
                && let Some(geolocation) = geolocation()
            {
                geolocation.clear_watch(watch.id);
            }
            self.events.borrow_mut().clear();
        }

        fn poll_event(&mut self) -> Option<PositionEvent> {
            self.events.borrow_mut().pop_front()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserPosition;

/// The position source picked at startup
pub enum DevicePosition {
    Fixed(FixedPosition),
    #[cfg(target_arch = "wasm32")]
    Browser(BrowserPosition),
}

impl DevicePosition {
    /// `--location` wins; otherwise the browser on the web, nothing on native
    #[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
    pub fn from_settings(location: Option<LatLng>, ctx: &egui::Context) -> Self {
        #[cfg(target_arch = "wasm32")]
        if location.is_none() {
            return Self::Browser(BrowserPosition::new(ctx.clone()));
        }
        Self::Fixed(FixedPosition::new(location))
    }

    /// Move a user-set position; measured positions cannot be moved
    pub fn move_to(&mut self, position: LatLng) -> bool {
        match self {
            Self::Fixed(fixed) => {
                fixed.move_to(position);
                true
            }
            #[cfg(target_arch = "wasm32")]
            Self::Browser(_) => false,
        }
    }

    pub fn is_movable(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

/// Move the device position from the map
///
/// Starts the watch when it is not running yet, so a source that had no position
/// to begin with leaves its `Unsupported` state.
pub fn move_device_position(
    watcher: &mut LocationWatcher<DevicePosition>,
    point: LatLng,
) -> bool {
    if !watcher.source_mut().move_to(point) {
        return false;
    }
    if !watcher.is_watching() {
        watcher.start_watching();
    }
    true
}

impl PositionSource for DevicePosition {
    fn watch(&mut self, options: &WatchOptions) -> Result<(), GeolocationError> {
        match self {
            Self::Fixed(source) => source.watch(options),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(source) => source.watch(options),
        }
    }

    fn clear_watch(&mut self) {
        match self {
            Self::Fixed(source) => source.clear_watch(),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(source) => source.clear_watch(),
        }
    }

    fn poll_event(&mut self) -> Option<PositionEvent> {
        match self {
            Self::Fixed(source) => source.poll_event(),
            #[cfg(target_arch = "wasm32")]
            Self::Browser(source) => source.poll_event(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_position_without_location_is_unsupported() {
        let mut source = FixedPosition::new(None);
        assert_eq!(
            source.watch(&WatchOptions::default()),
            Err(GeolocationError::Unsupported)
        );
    }

    #[test]
    fn test_fixed_position_reports_moves_while_watched() {
        let start = LatLng::new(37.7749, -122.4194);
        let mut source = FixedPosition::new(Some(start));
        source.watch(&WatchOptions::default()).unwrap();
        assert!(matches!(source.poll_event(), Some(PositionEvent::Fix(f)) if f.coords() == start));
        assert!(source.poll_event().is_none());

        let moved = LatLng::new(37.7955, -122.3937);
        source.move_to(moved);
        assert!(matches!(source.poll_event(), Some(PositionEvent::Fix(f)) if f.coords() == moved));

        source.clear_watch();
        source.move_to(start);
        assert!(source.poll_event().is_none());
    }

    #[test]
    fn test_moving_unset_position_starts_watching() {
        let mut watcher = LocationWatcher::new(DevicePosition::Fixed(FixedPosition::new(None)));
        watcher.start_watching();
        assert_eq!(watcher.state().error, Some(GeolocationError::Unsupported));

        let point = LatLng::new(37.7955, -122.3937);
        assert!(move_device_position(&mut watcher, point));
        assert!(watcher.is_watching());
        assert!(watcher.state().error.is_none());

        watcher.pump(instant::Instant::now());
        assert_eq!(watcher.state().position.map(|p| p.coords), Some(point));
    }
}
