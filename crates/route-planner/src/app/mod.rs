//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the route overlay and pins
//! - Toggleable sidebar with the search form, stops, route summary and device position
//! - Background routing and geocoding, drained back into the UI every frame
//! - Responsive layout (sidebar from bottom on portrait displays)

mod plugin;
mod position;
pub(crate) mod settings;
mod share;
mod state;
mod surface;
mod tasks;
mod ui_panels;

use crate::app::plugin::RoutePlugin;
use crate::app::position::{DevicePosition, move_device_position};
use crate::app::settings::Settings;
use crate::app::state::{Action, AppState, TilesProvider, UiSettings};
use crate::app::surface::{MAP_CONTAINER_ID, WalkersSurface};
use crate::app::tasks::{TaskEvent, TaskQueue};
use crate::backend::{NominatimGeocoder, OsrmDirections};
use eframe::egui;
use instant::Instant;
use route_planner_lib::provider::{DirectionsService, Geocoder};
use route_planner_lib::{
    Endpoint, LatLng, LocationWatcher, MapOptions, MapService, PlaceSelection, SelectionField,
};
use std::sync::Arc;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Persisted settings (UI preferences only, no places or routes)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    tiles_provider: String,
    sidebar_open: bool,
}

/// Main application structure
pub struct RoutePlannerApp {
    /// Form, store, banners and queued actions
    state: AppState,

    /// Map facade over the walkers surface
    service: MapService<WalkersSurface>,

    /// Device position and its address
    watcher: LocationWatcher<DevicePosition>,

    geocoder: Arc<dyn Geocoder>,

    tasks: TaskQueue,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Zoom used when centering on the device position
    locate_zoom: f64,

    /// Revisions of the store and watcher last drawn as pins
    drawn_revisions: Option<(u64, u64)>,

    /// Revision of the watcher last copied into the UI state
    seen_location_revision: u64,

    /// Whether the camera already moved to the first position fix
    centered_on_fix: bool,
}

impl RoutePlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut state = if !cli_args.ignore_persisted {
            match cc.storage {
                Some(storage) => Self::load_persisted_settings(storage, &cli_args),
                None => AppState::new(&cli_args),
            }
        } else {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            AppState::new(&cli_args)
        };

        let directions: Arc<dyn DirectionsService> =
            Arc::new(OsrmDirections::new(&cli_args.osrm_url));
        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(&cli_args.nominatim_url));

        let mut service = MapService::new(WalkersSurface::new()).with_directions(directions);
        let options = MapOptions {
            center: cli_args.location.unwrap_or(MapOptions::default().center),
            zoom: cli_args.zoom,
            ..Default::default()
        };
        if let Err(err) = service.initialize(MAP_CONTAINER_ID, &options) {
            state.map_error = Some(err.to_string());
        }

        let source = DevicePosition::from_settings(cli_args.location, &cc.egui_ctx);
        state.position_movable = source.is_movable();
        let mut watcher = LocationWatcher::new(source);
        watcher.start_watching();

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut app = Self {
            state,
            service,
            watcher,
            geocoder,
            tasks: TaskQueue::new(cc.egui_ctx.clone()),
            tiles_osm,
            tiles_otm,
            map_memory: MapMemory::default(),
            locate_zoom: cli_args.zoom,
            drawn_revisions: None,
            seen_location_revision: 0,
            centered_on_fix: false,
        };
        app.resolve_initial_places();
        app
    }

    /// Load persisted settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage, cli_args: &Settings) -> AppState {
        if let Some(json) = storage.get_string("persisted_settings")
            && !json.is_empty()
            && let Ok(settings) = serde_json::from_str::<PersistedSettings>(&json)
        {
            tracing::info!("Restored UI settings");
            let ui_settings = UiSettings {
                tiles_provider: TilesProvider::from_name(&settings.tiles_provider),
                sidebar_open: settings.sidebar_open,
            };
            return AppState::with_ui_settings(cli_args, ui_settings);
        }

        tracing::info!("No persisted settings found, starting fresh");
        AppState::new(cli_args)
    }

    /// Geocode startup text that is not already a coordinate
    fn resolve_initial_places(&mut self) {
        for field in [SelectionField::Origin, SelectionField::Destination] {
            let place = match field {
                SelectionField::Destination => self.state.form.destination(),
                _ => self.state.form.origin(),
            };
            let query = place.text.trim().to_string();
            if query.is_empty() || place.typed_coordinate().is_some() {
                continue;
            }
            tracing::info!("Resolving startup {field:?} \"{query}\"");
            self.spawn_search(field, query, true);
        }
    }

    fn spawn_search(&self, field: SelectionField, query: String, auto_commit: bool) {
        let geocoder = self.geocoder.clone();
        self.tasks.spawn(async move {
            let result = geocoder.search(query.clone()).await;
            TaskEvent::Suggestions {
                field,
                query,
                result,
                auto_commit,
            }
        });
    }

    /// Apply the outcomes of finished background tasks
    fn handle_task_events(&mut self) {
        for event in self.tasks.drain() {
            match event {
                TaskEvent::Route(outcome) => {
                    self.state.routes_in_flight = self.state.routes_in_flight.saturating_sub(1);
                    match self.service.complete_route(outcome) {
                        Ok(result) => {
                            self.state.store.set_directions(Some(result));
                            self.state.route_error = None;
                        }
                        Err(err) => self.state.route_error = Some(err.to_string()),
                    }
                }
                TaskEvent::Address { ticket, result } => {
                    self.watcher.apply_address(ticket, result);
                }
                TaskEvent::Suggestions {
                    field,
                    query,
                    result,
                    auto_commit: true,
                } => match result {
                    Ok(mut places) if !places.is_empty() => {
                        self.commit_place(field, places.swap_remove(0));
                    }
                    Ok(_) => tracing::warn!("No match for startup {field:?} \"{query}\""),
                    Err(err) => tracing::warn!("Cannot resolve startup {field:?} \"{query}\": {err}"),
                },
                TaskEvent::Suggestions {
                    field,
                    query,
                    result,
                    auto_commit: false,
                } => {
                    self.state.suggestions.apply(field, &query, result);
                }
            }
        }
    }

    /// Feed the location watcher and follow what it publishes
    fn poll_location(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(ticket) = self.watcher.pump(now) {
            let geocoder = self.geocoder.clone();
            self.tasks.spawn(async move {
                let result = geocoder.reverse_geocode(ticket.position).await;
                TaskEvent::Address { ticket, result }
            });
        }
        if let Some(due) = self.watcher.next_due() {
            ctx.request_repaint_after(due.saturating_duration_since(now));
        }

        if self.watcher.revision() == self.seen_location_revision {
            return;
        }
        self.seen_location_revision = self.watcher.revision();
        self.state.location = self.watcher.state().clone();

        if let Some(position) = self.state.position() {
            self.state
                .form
                .set_current_location(position, &self.state.location.address);
            if !self.centered_on_fix {
                self.centered_on_fix = true;
                self.service.pan_to(position);
                self.service.set_zoom(self.locate_zoom);
            }
        }
    }

    /// Redraw the selection pins when the store or the device position changed
    fn sync_selection_markers(&mut self) {
        let revisions = (self.state.store.revision(), self.watcher.revision());
        if self.drawn_revisions == Some(revisions) {
            return;
        }
        let selection = self.state.store.state();
        match self.service.show_selection(
            self.state.position(),
            selection.destination.as_ref(),
            &selection.waypoints,
        ) {
            Ok(()) => self.drawn_revisions = Some(revisions),
            Err(err) => tracing::debug!("Selection pins not drawn: {err}"),
        }
    }

    fn get_directions(&mut self) {
        let Ok(selection) = self.state.form.submit() else {
            return;
        };
        self.state.store.set_destination(selection.destination.clone());

        let waypoints: Vec<Endpoint> = self
            .state
            .store
            .state()
            .waypoints
            .iter()
            .cloned()
            .map(Endpoint::from)
            .collect();

        match self
            .service
            .begin_route(selection.origin, selection.destination, &waypoints)
        {
            Ok(job) => {
                self.state.routes_in_flight += 1;
                self.state.route_error = None;
                self.tasks.spawn(async move { TaskEvent::Route(job.run().await) });
            }
            Err(err) => {
                tracing::warn!("Route request rejected: {err}");
                self.state.route_error = Some(err.to_string());
            }
        }
    }

    /// Commit a resolved place into `field`
    fn commit_place(&mut self, field: SelectionField, place: PlaceSelection) {
        match field {
            SelectionField::Origin => {
                if let Err(err) = self.state.form.commit_origin(place) {
                    tracing::debug!("Origin not committed: {err}");
                }
            }
            SelectionField::Destination => {
                if self.state.form.commit_destination(place.clone()).is_ok() {
                    self.state.store.set_destination(place);
                }
            }
            SelectionField::Waypoint => {
                if let Ok(stop) = self.state.form.commit_waypoint(place) {
                    self.add_stop(stop);
                }
            }
        }
    }

    fn add_stop(&mut self, stop: PlaceSelection) {
        if !self.state.store.add_waypoint(stop) {
            tracing::info!("Stop not added, one already exists at that point");
        }
    }

    fn search(&mut self, field: SelectionField) {
        let place = match field {
            SelectionField::Origin => self.state.form.origin(),
            SelectionField::Destination => self.state.form.destination(),
            SelectionField::Waypoint => self.state.form.waypoint(),
        };
        let query = place.text.trim().to_string();
        if query.is_empty() {
            return;
        }
        if let Some(location) = place.typed_coordinate() {
            self.commit_place(field, PlaceSelection::from_coordinates(location, &query));
            self.state.suggestions.clear();
            return;
        }
        self.state.suggestions.begin(field, query.clone());
        self.spawn_search(field, query, false);
    }

    fn clear_route(&mut self) {
        if let Err(err) = self.service.clear_route() {
            tracing::debug!("No route overlay to clear: {err}");
        }
        self.service.clear_markers();
        self.state.store.clear_route();
        self.state.form.edit_destination("");
        self.state.suggestions.clear();
        self.state.route_error = None;
    }

    fn recenter(&mut self) {
        match self.state.position() {
            Some(position) => {
                self.service.pan_to(position);
                self.service.set_zoom(self.locate_zoom);
            }
            None => self.watcher.start_watching(),
        }
    }

    fn share_link(&self) -> Option<(String, String)> {
        let position = self.state.position()?;
        let link = share::location_link(position);
        let text = share::share_text(&self.state.location.address, &link);
        Some((link, text))
    }

    fn picked_as(&mut self, point: LatLng, field: SelectionField) {
        self.commit_place(field, PlaceSelection::from_coordinates(point, &point.to_string()));
        self.state.clear_picked_point();
    }

    /// Carry out what the UI asked for this frame
    fn apply_actions(&mut self, ctx: &egui::Context) {
        for action in self.state.take_actions() {
            tracing::trace!("Applying {action:?}");
            match action {
                Action::GetDirections => self.get_directions(),
                Action::Search(field) => self.search(field),
                Action::PickSuggestion(index) => {
                    if let Some((field, place)) = self.state.suggestions.take(index) {
                        self.commit_place(field, place);
                    }
                }
                Action::AddWaypoint => {
                    if let Ok(stop) = self.state.form.take_waypoint() {
                        self.add_stop(stop);
                    }
                }
                Action::RemoveWaypoint(index) => {
                    self.state.store.remove_waypoint(index);
                }
                Action::UseCurrentLocation => {
                    if !self.state.form.use_current_location() {
                        tracing::debug!("No current location to use yet");
                    }
                }
                Action::Recenter => self.recenter(),
                Action::RetryLocation => self.watcher.retry(),
                Action::ClearRoute => self.clear_route(),
                Action::CopyShareLink => {
                    if let Some((_, text)) = self.share_link() {
                        ctx.copy_text(text);
                        self.state.copied_at = Some(Instant::now());
                        ctx.request_repaint_after(share::COPIED_FEEDBACK);
                    }
                }
                Action::OpenWhatsApp => {
                    if let Some(url) = self
                        .share_link()
                        .and_then(|(_, text)| share::whatsapp_link(&text))
                    {
                        ctx.open_url(egui::OpenUrl::new_tab(url));
                    }
                }
                Action::OpenMapLink => {
                    if let Some((link, _)) = self.share_link() {
                        ctx.open_url(egui::OpenUrl::new_tab(link));
                    }
                }
                Action::PickedAsOrigin(point) => self.picked_as(point, SelectionField::Origin),
                Action::PickedAsDestination(point) => {
                    self.picked_as(point, SelectionField::Destination)
                }
                Action::PickedAsStop(point) => self.picked_as(point, SelectionField::Waypoint),
                Action::MoveMyLocation(point) => {
                    if move_device_position(&mut self.watcher, point) {
                        tracing::info!("Moved device position to {point}");
                    }
                    self.state.clear_picked_point();
                }
                Action::DismissPick => self.state.clear_picked_point(),
            }
        }
    }
}

#[profiling::all_functions]
impl eframe::App for RoutePlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_task_events();
        self.poll_location(ctx);
        self.sync_selection_markers();
        self.service.surface_mut().apply_camera(&mut self.map_memory);

        // Render the main sidebar (responsive: side or bottom based on orientation)
        ui_panels::render_sidebar(ctx, &mut self.state);

        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();
        let route_plugin = RoutePlugin::new(
            self.service.surface().route_path().map(<[LatLng]>::to_vec),
            self.service.surface().markers().cloned().collect(),
            self.state.picked.clone(),
        );

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(route_plugin);

                ui.add(map);

                ui_panels::map_overlay_buttons(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );

                if let Some(err) = &self.state.map_error {
                    painter.text(
                        screen_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        err,
                        egui::FontId::proportional(16.0),
                        egui::Color32::RED,
                    );
                }
            });

        self.apply_actions(ctx);
        if self.state.copied_visible() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            tiles_provider: self.state.ui_settings.tiles_provider.name().to_string(),
            sidebar_open: self.state.ui_settings.sidebar_open,
        };

        if let Ok(json) = serde_json::to_string(&settings) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}

impl Drop for RoutePlannerApp {
    fn drop(&mut self) {
        self.service.teardown();
    }
}
