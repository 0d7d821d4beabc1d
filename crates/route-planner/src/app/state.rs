//! Application state management
//!
//! This module holds what the sidebar edits and displays: the search form, the map
//! state store, autocomplete suggestions, error banners and the actions queued by
//! the UI for the app to carry out after rendering.

use crate::app::plugin::PickedPoint;
use crate::app::settings::Settings;
use crate::app::share::COPIED_FEEDBACK;
use instant::Instant;
use route_planner_lib::{
    GeocodeError, LatLng, LocationState, MapStateStore, PlaceSelection, SearchForm,
    SelectionField,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Main application state
pub struct AppState {
    pub ui_settings: UiSettings,

    /// Destination, waypoints and the last route
    pub store: MapStateStore,

    pub form: SearchForm,

    pub suggestions: Suggestions,

    /// Snapshot of the location watcher, refreshed when it publishes
    pub location: LocationState,

    /// Whether the device position can be moved by hand
    pub position_movable: bool,

    /// Last routing failure, shown until the next attempt
    pub route_error: Option<String>,

    /// Why the map could not be brought up
    pub map_error: Option<String>,

    /// Route requests sent and not answered yet
    pub routes_in_flight: usize,

    /// When a share link was last copied
    pub copied_at: Option<Instant>,

    /// Point picked with a right click on the map
    pub picked: PickedPoint,

    actions: Vec<Action>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    /// Provider with the given [`name`](Self::name), OpenStreetMap if unknown
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .unwrap_or(Self::OpenStreetMap)
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
        }
    }
}

/// Something the user asked for while the sidebar was drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    GetDirections,
    /// Forward-geocode the text of a field
    Search(SelectionField),
    PickSuggestion(usize),
    AddWaypoint,
    RemoveWaypoint(usize),
    UseCurrentLocation,
    Recenter,
    RetryLocation,
    ClearRoute,
    CopyShareLink,
    OpenWhatsApp,
    OpenMapLink,
    PickedAsOrigin(LatLng),
    PickedAsDestination(LatLng),
    PickedAsStop(LatLng),
    MoveMyLocation(LatLng),
    DismissPick,
}

/// Autocomplete results for the field that was searched last
#[derive(Debug, Default)]
pub struct Suggestions {
    pub field: Option<SelectionField>,
    pub query: String,
    pub items: Vec<PlaceSelection>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Suggestions {
    /// Start a new search, dropping the previous results
    pub fn begin(&mut self, field: SelectionField, query: impl Into<String>) {
        *self = Self {
            field: Some(field),
            query: query.into(),
            loading: true,
            ..Default::default()
        };
    }

    /// Store search results; answers to an older search are ignored
    pub fn apply(
        &mut self,
        field: SelectionField,
        query: &str,
        result: Result<Vec<PlaceSelection>, GeocodeError>,
    ) -> bool {
        if self.field != Some(field) || self.query != query {
            tracing::debug!("Discarding suggestions for stale query \"{query}\"");
            return false;
        }
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(err) => {
                self.items.clear();
                self.error = Some(err.to_string());
            }
        }
        true
    }

    pub fn is_open_for(&self, field: SelectionField) -> bool {
        self.field == Some(field)
    }

    /// Take the suggestion at `index` and close the list
    pub fn take(&mut self, index: usize) -> Option<(SelectionField, PlaceSelection)> {
        let field = self.field?;
        if index >= self.items.len() {
            return None;
        }
        let selection = self.items.swap_remove(index);
        self.clear();
        Some((field, selection))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_ui_settings(settings, UiSettings::default())
    }

    pub fn with_ui_settings(settings: &Settings, ui_settings: UiSettings) -> Self {
        Self {
            ui_settings,
            store: MapStateStore::new(),
            form: SearchForm::with_initial(
                settings.origin.as_deref(),
                settings.destination.as_deref(),
            ),
            suggestions: Suggestions::default(),
            location: LocationState::default(),
            position_movable: false,
            route_error: None,
            map_error: None,
            routes_in_flight: 0,
            copied_at: None,
            picked: Arc::new(RwLock::new(None)),
            actions: Vec::new(),
        }
    }

    /// Queue an action for the end of the frame
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    pub fn is_routing(&self) -> bool {
        self.routes_in_flight > 0
    }

    /// Device position, if one was published
    pub fn position(&self) -> Option<LatLng> {
        self.location.position.map(|p| p.coords)
    }

    /// Whether the "Copied!" confirmation is still showing
    pub fn copied_visible(&self) -> bool {
        self.copied_at
            .is_some_and(|copied_at| copied_at.elapsed() < COPIED_FEEDBACK)
    }

    /// The right-clicked point, if any
    pub fn picked_point(&self) -> Option<LatLng> {
        self.picked.try_read().ok().and_then(|picked| *picked)
    }

    pub fn clear_picked_point(&mut self) {
        if let Ok(mut picked) = self.picked.try_write() {
            *picked = None;
        }
    }
}
