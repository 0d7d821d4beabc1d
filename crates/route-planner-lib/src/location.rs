//! Location Watcher
//!
//! Follows the device position through a [`PositionSource`] and schedules a reverse
//! geocode one second after the position last changed. The UI calls
//! [`LocationWatcher::pump`] every frame; when a lookup falls due it gets a
//! [`GeocodeTicket`] to resolve and hand back through
//! [`LocationWatcher::apply_address`].

use crate::provider::{PositionEvent, PositionSource, WatchOptions};
use crate::{GeocodeError, GeolocationError, LatLng, Position};
use instant::Instant;
use std::time::Duration;

/// Delay between the last position change and its address lookup
pub const GEOCODE_DEBOUNCE: Duration = Duration::from_secs(1);

/// What the watcher currently knows about the device position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationState {
    pub position: Option<Position>,
    pub error: Option<GeolocationError>,
    pub is_loading: bool,
    /// Formatted address of `position`, empty until resolved or when the lookup failed
    pub address: String,
}

/// A reverse geocode that is due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeTicket {
    pub position: LatLng,
}

/// Scheduled lookup; dropping it cancels the lookup
#[derive(Debug, Clone, Copy)]
struct PendingLookup {
    position: LatLng,
    due_at: Instant,
}

/// Watches a position source and keeps a published [`LocationState`]
pub struct LocationWatcher<P: PositionSource> {
    source: P,
    options: WatchOptions,
    watching: bool,
    state: LocationState,
    revision: u64,
    pending: Option<PendingLookup>,
}

impl<P: PositionSource> LocationWatcher<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            options: WatchOptions::default(),
            watching: false,
            state: LocationState::default(),
            revision: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }

    /// Incremented every time the published state changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    /// When the pending lookup falls due, if one is scheduled
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.map(|p| p.due_at)
    }

    fn publish(&mut self, state: LocationState) {
        self.state = state;
        self.revision += 1;
    }

    /// Start (or restart) following the device position
    pub fn start_watching(&mut self) {
        self.clear_watch();
        match self.source.watch(&self.options) {
            Ok(()) => {
                tracing::info!("Watching device position");
                self.watching = true;
                self.publish(LocationState {
                    error: None,
                    is_loading: true,
                    ..self.state.clone()
                });
            }
            Err(err) => {
                tracing::warn!("Cannot watch device position: {err:?}");
                self.publish(LocationState {
                    error: Some(err),
                    is_loading: false,
                    ..self.state.clone()
                });
            }
        }
    }

    /// Try again after a failure
    pub fn retry(&mut self) {
        self.start_watching();
    }

    /// Stop following the position and cancel any scheduled lookup
    pub fn clear_watch(&mut self) {
        if self.watching {
            self.source.clear_watch();
            self.watching = false;
            tracing::debug!("Stopped watching device position");
        }
        self.pending = None;
    }

    /// Apply a position fix
    ///
    /// Returns `true` when the fix differed from the published position and was
    /// published. Fixes are ignored while not watching.
    pub fn handle_fix(&mut self, position: Position, now: Instant) -> bool {
        if !self.watching || self.state.position == Some(position) {
            return false;
        }

        self.publish(LocationState {
            position: Some(position),
            error: None,
            is_loading: false,
            address: self.state.address.clone(),
        });
        self.pending = Some(PendingLookup {
            position: position.coords,
            due_at: now + GEOCODE_DEBOUNCE,
        });
        true
    }

    /// Apply a failure of the position stream; fixes are ignored until [`Self::retry`]
    pub fn handle_error(&mut self, error: GeolocationError) {
        tracing::warn!("Device position unavailable: {error:?}");
        self.clear_watch();
        self.publish(LocationState {
            error: Some(error),
            is_loading: false,
            ..self.state.clone()
        });
    }

    /// Drain queued source events and return the lookup that is due, if any
    pub fn pump(&mut self, now: Instant) -> Option<GeocodeTicket> {
        profiling::scope!("LocationWatcher::pump");
        while let Some(event) = self.source.poll_event() {
            match event {
                PositionEvent::Fix(fix) => {
                    self.handle_fix(Position::new(fix.coords(), fix.accuracy), now);
                }
                PositionEvent::Error(err) => self.handle_error(err),
            }
        }

        match self.pending {
            Some(pending) if pending.due_at <= now => {
                self.pending = None;
                Some(GeocodeTicket {
                    position: pending.position,
                })
            }
            _ => None,
        }
    }

    /// Store the outcome of a lookup
    ///
    /// Ignored when the position moved on since the ticket was issued. Failures leave
    /// the address empty. Returns whether the address was applied.
    pub fn apply_address(
        &mut self,
        ticket: GeocodeTicket,
        result: Result<String, GeocodeError>,
    ) -> bool {
        if self.state.position.map(|p| p.coords) != Some(ticket.position) {
            tracing::debug!("Discarding address for stale position {}", ticket.position);
            return false;
        }

        let address = match result {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!("Reverse geocoding failed: {err}");
                String::new()
            }
        };
        self.publish(LocationState {
            address,
            ..self.state.clone()
        });
        true
    }
}

impl<P: PositionSource> Drop for LocationWatcher<P> {
    fn drop(&mut self) {
        self.clear_watch();
    }
}

/// Rough quality of a position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyLevel {
    Good,
    Fair,
    Poor,
}

impl AccuracyLevel {
    pub fn from_meters(accuracy: f64) -> Self {
        if accuracy <= 20.0 {
            Self::Good
        } else if accuracy <= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Accuracy for display, e.g. `±12m`
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(meters) if meters.is_finite() => format!("±{}m", meters.round() as i64),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PositionFix;
    use crate::testing::QueuedPositions;

    fn fix(lat: f64, lng: f64, accuracy: f64) -> PositionEvent {
        PositionEvent::Fix(PositionFix {
            latitude: lat,
            longitude: lng,
            accuracy: Some(accuracy),
            timestamp: 0,
        })
    }

    fn watcher() -> LocationWatcher<QueuedPositions> {
        let mut watcher = LocationWatcher::new(QueuedPositions::default());
        watcher.start_watching();
        watcher
    }

    #[test]
    fn test_watch_options() {
        let watcher = watcher();
        let options = watcher.source().options.unwrap();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.maximum_age, Duration::ZERO);
        assert!(watcher.state().is_loading);
    }

    #[test]
    fn test_unsupported_source() {
        let mut watcher = LocationWatcher::new(QueuedPositions {
            unsupported: true,
            ..Default::default()
        });
        watcher.start_watching();
        let state = watcher.state();
        assert!(!state.is_loading);
        assert_eq!(
            state.error.unwrap().to_string(),
            "Geolocation is not supported by your browser"
        );
    }

    #[test]
    fn test_debounced_lookup() {
        let mut watcher = watcher();
        let start = Instant::now();

        watcher.source_mut().push(fix(37.7749, -122.4194, 10.0));
        assert_eq!(watcher.pump(start), None);
        assert!(!watcher.state().is_loading);
        assert!(watcher.state().position.is_some());

        assert_eq!(watcher.pump(start + Duration::from_millis(500)), None);
        let ticket = watcher.pump(start + GEOCODE_DEBOUNCE).unwrap();
        assert_eq!(ticket.position, LatLng::new(37.7749, -122.4194));

        // Fires once
        assert_eq!(watcher.pump(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_unchanged_fix_is_idempotent() {
        let mut watcher = watcher();
        let start = Instant::now();
        let position = Position::new(LatLng::new(37.7749, -122.4194), Some(10.0));

        assert!(watcher.handle_fix(position, start));
        let revision = watcher.revision();
        let due = watcher.next_due();

        assert!(!watcher.handle_fix(position, start + Duration::from_millis(900)));
        assert_eq!(watcher.revision(), revision);
        assert_eq!(watcher.next_due(), due);

        // A change in accuracy alone counts as a change
        let refined = Position::new(position.coords, Some(5.0));
        assert!(watcher.handle_fix(refined, start + Duration::from_millis(900)));
        assert!(watcher.next_due() > due);
    }

    #[test]
    fn test_new_fix_replaces_pending_lookup() {
        let mut watcher = watcher();
        let start = Instant::now();

        watcher.source_mut().push(fix(1.0, 1.0, 10.0));
        watcher.pump(start);
        watcher.source_mut().push(fix(2.0, 2.0, 10.0));
        watcher.pump(start + Duration::from_millis(800));

        assert_eq!(watcher.pump(start + GEOCODE_DEBOUNCE), None);
        let ticket = watcher
            .pump(start + Duration::from_millis(1800))
            .unwrap();
        assert_eq!(ticket.position, LatLng::new(2.0, 2.0));
    }

    #[test]
    fn test_stale_address_is_discarded() {
        let mut watcher = watcher();
        let start = Instant::now();

        watcher.handle_fix(Position::new(LatLng::new(1.0, 1.0), None), start);
        let ticket = watcher.pump(start + GEOCODE_DEBOUNCE).unwrap();
        watcher.handle_fix(Position::new(LatLng::new(2.0, 2.0), None), start + GEOCODE_DEBOUNCE);

        assert!(!watcher.apply_address(ticket, Ok("Old Street".to_string())));
        assert_eq!(watcher.state().address, "");

        let ticket = watcher
            .pump(start + GEOCODE_DEBOUNCE * 2)
            .unwrap();
        assert!(watcher.apply_address(ticket, Ok("New Street".to_string())));
        assert_eq!(watcher.state().address, "New Street");
    }

    #[test]
    fn test_geocode_failure_empties_address() {
        let mut watcher = watcher();
        let start = Instant::now();
        watcher.handle_fix(Position::new(LatLng::new(1.0, 1.0), None), start);
        let ticket = watcher.pump(start + GEOCODE_DEBOUNCE).unwrap();
        watcher.apply_address(ticket, Ok("Somewhere".to_string()));

        watcher.handle_fix(Position::new(LatLng::new(1.5, 1.0), None), start);
        let ticket = watcher.pump(start + GEOCODE_DEBOUNCE).unwrap();
        assert!(watcher.apply_address(ticket, Err(GeocodeError::NoResults)));
        assert_eq!(watcher.state().address, "");
        assert!(watcher.state().error.is_none());
    }

    #[test]
    fn test_error_stops_watching_until_retry() {
        let mut watcher = watcher();
        let start = Instant::now();
        watcher.handle_fix(Position::new(LatLng::new(1.0, 1.0), None), start);

        watcher.source_mut().push(PositionEvent::Error(GeolocationError::PermissionDenied));
        watcher.source_mut().push(fix(2.0, 2.0, 10.0));
        assert_eq!(watcher.pump(start + GEOCODE_DEBOUNCE), None);

        let state = watcher.state();
        assert_eq!(
            state.error.unwrap().to_string(),
            "Unable to retrieve your location. Please enable location services."
        );
        assert!(!state.is_loading);
        assert_eq!(state.position.unwrap().coords, LatLng::new(1.0, 1.0));
        assert!(!watcher.source().watching);

        watcher.retry();
        assert!(watcher.state().is_loading);
        assert!(watcher.state().error.is_none());
        assert!(watcher.handle_fix(Position::new(LatLng::new(2.0, 2.0), None), start));
    }

    #[test]
    fn test_clear_watch_is_idempotent() {
        let mut watcher = watcher();
        watcher.handle_fix(Position::new(LatLng::new(1.0, 1.0), None), Instant::now());
        watcher.clear_watch();
        watcher.clear_watch();
        assert_eq!(watcher.source().clear_calls, 1);
        assert!(watcher.next_due().is_none());
    }

    #[test]
    fn test_accuracy_helpers() {
        assert_eq!(format_accuracy(Some(12.4)), "±12m");
        assert_eq!(format_accuracy(None), "Unknown");
        assert_eq!(AccuracyLevel::from_meters(20.0), AccuracyLevel::Good);
        assert_eq!(AccuracyLevel::from_meters(35.0), AccuracyLevel::Fair);
        assert_eq!(AccuracyLevel::from_meters(80.0), AccuracyLevel::Poor);
    }
}
