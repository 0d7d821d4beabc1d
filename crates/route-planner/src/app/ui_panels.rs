//! UI panels for the application
//!
//! The sidebar holds the search form, the waypoint list, the route summary and the
//! device position. Widgets never change the planner directly; they queue an
//! [`Action`] that the app applies once the frame is drawn.

use crate::app::state::{Action, AppState, TilesProvider};
use egui::{Color32, RichText, Ui};
use route_planner_lib::{AccuracyLevel, SelectionField, format_accuracy};

const SUCCESS_COLOR: Color32 = Color32::from_rgb(0x34, 0xA8, 0x53);

/// A square button painted over the map at `offset` from its top-right corner
fn map_button(ui: &mut Ui, offset: f32, icon: &str, hover: &str) -> bool {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin + offset);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui
        .allocate_rect(button_rect, egui::Sense::click())
        .on_hover_text(hover);

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );

    response.clicked()
}

/// Sidebar toggle and recenter buttons overlaid on the map
pub fn map_overlay_buttons(ui: &mut Ui, state: &mut AppState) {
    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    if map_button(ui, 0.0, icon, "Toggle sidebar") {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }
    if map_button(ui, 50.0, "⌖", "Center on my location") {
        state.push(Action::Recenter);
    }
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(320.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(320.0)
            .min_width(280.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| render_sidebar_content(ui, state));
    }
}

fn render_sidebar_content(ui: &mut Ui, state: &mut AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.heading("🧭 Route Planner");
            ui.add_space(6.0);

            render_banners(ui, state);

            render_search_section(ui, state);
            ui.add_space(8.0);
            ui.separator();

            render_waypoints_section(ui, state);
            ui.add_space(8.0);
            ui.separator();

            render_route_actions(ui, state);
            render_route_summary(ui, state);

            if state.picked_point().is_some() {
                ui.add_space(8.0);
                ui.separator();
                render_picked_point(ui, state);
            }

            ui.add_space(8.0);
            ui.separator();
            render_location_section(ui, state);

            ui.add_space(8.0);
            ui.separator();
            render_tiles_section(ui, state);
        });
}

fn banner(ui: &mut Ui, color: Color32, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::new()
        .fill(color.gamma_multiply(0.15))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::same(6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
    ui.add_space(4.0);
}

/// Loading and error surfaces, most severe first
fn render_banners(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.map_error {
        banner(ui, Color32::RED, |ui| {
            ui.label(RichText::new(format!("⚠ {err}")).color(Color32::RED));
        });
    }

    if let Some(err) = state.location.error {
        let mut retry = false;
        banner(ui, Color32::RED, |ui| {
            ui.label(RichText::new(format!("⚠ {err}")).color(Color32::RED));
            retry = ui.button("🔄 Try Again").clicked();
        });
        if retry {
            state.push(Action::RetryLocation);
        }
    } else if state.location.is_loading {
        let warn = ui.visuals().warn_fg_color;
        banner(ui, warn, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Locating you...").color(warn));
            });
        });
    }

    if let Some(err) = &state.route_error {
        banner(ui, Color32::RED, |ui| {
            ui.label(RichText::new(format!("⚠ {err}")).color(Color32::RED));
        });
    }

    if let Some(err) = state.form.error() {
        let warn = ui.visuals().warn_fg_color;
        banner(ui, warn, |ui| {
            ui.label(RichText::new(err.to_string()).color(warn));
        });
    }
}

fn field_text(state: &AppState, field: SelectionField) -> String {
    match field {
        SelectionField::Origin => state.form.origin().text.clone(),
        SelectionField::Destination => state.form.destination().text.clone(),
        SelectionField::Waypoint => state.form.waypoint().text.clone(),
    }
}

/// A search input with its button and suggestion list
fn place_input(ui: &mut Ui, state: &mut AppState, field: SelectionField, hint: &str) {
    let mut text = field_text(state, field);
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text(hint)
                .desired_width(ui.available_width() - 36.0),
        );
        if response.changed() {
            state.form.edit(field, text.clone());
        }
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("🔍").on_hover_text("Search").clicked() || submitted {
            state.push(Action::Search(field));
        }
    });
    render_suggestions(ui, state, field);
}

fn render_suggestions(ui: &mut Ui, state: &mut AppState, field: SelectionField) {
    if !state.suggestions.is_open_for(field) {
        return;
    }
    if state.suggestions.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Searching...").small().weak());
        });
        return;
    }
    if let Some(err) = &state.suggestions.error {
        ui.label(
            RichText::new(err)
                .small()
                .color(ui.visuals().warn_fg_color),
        );
        return;
    }

    let mut picked = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        for (index, item) in state.suggestions.items.iter().enumerate() {
            if ui.selectable_label(false, item.label()).clicked() {
                picked = Some(index);
            }
        }
    });
    if let Some(index) = picked {
        state.push(Action::PickSuggestion(index));
    }
}

fn render_search_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("From").strong());
    place_input(ui, state, SelectionField::Origin, "Origin: place or lat,lng");

    let has_location = state.form.current_location().is_some();
    if ui
        .add_enabled(has_location, egui::Button::new("📍 Use current location").small())
        .clicked()
    {
        state.push(Action::UseCurrentLocation);
    }

    ui.add_space(6.0);
    ui.label(RichText::new("To").strong());
    place_input(
        ui,
        state,
        SelectionField::Destination,
        "Destination: place or lat,lng",
    );
}

fn render_waypoints_section(ui: &mut Ui, state: &mut AppState) {
    let waypoints: Vec<String> = state
        .store
        .state()
        .waypoints
        .iter()
        .map(|w| w.label())
        .collect();

    ui.label(RichText::new(format!("🚩 Stops ({})", waypoints.len())).strong());
    ui.add_space(4.0);

    let mut removed = None;
    for (index, label) in waypoints.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{}.", index + 1)).strong());
            ui.label(label.as_str());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("✕").on_hover_text("Remove stop").clicked() {
                    removed = Some(index);
                }
            });
        });
    }
    if let Some(index) = removed {
        state.push(Action::RemoveWaypoint(index));
    }

    place_input(ui, state, SelectionField::Waypoint, "Add a stop");
    if ui.button("➕ Add Stop").clicked() {
        state.push(Action::AddWaypoint);
    }
}

fn render_route_actions(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui| {
        if ui
            .add_enabled(!state.is_routing(), egui::Button::new("🚗 Get Directions"))
            .clicked()
        {
            state.push(Action::GetDirections);
        }
        if ui.button("🗑 Clear Route").clicked() {
            state.push(Action::ClearRoute);
        }
        if state.is_routing() {
            ui.spinner();
        }
    });
}

fn render_route_summary(ui: &mut Ui, state: &AppState) {
    let Some(directions) = &state.store.state().directions else {
        return;
    };
    let primary = directions.primary();

    ui.add_space(8.0);
    ui.label(RichText::new("📊 Route").strong());
    ui.add_space(4.0);

    egui::Grid::new("route_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Distance:");
            ui.label(RichText::new(directions.distance_text()).strong());
            ui.end_row();

            ui.label("Duration:");
            ui.label(RichText::new(directions.duration_text()).strong());
            ui.end_row();

            if primary.legs.len() > 1 {
                ui.label("Total:");
                ui.label(format!(
                    "{} · {}",
                    directions.total_distance_text(),
                    directions.total_duration_text()
                ));
                ui.end_row();

                ui.label("Stops:");
                ui.label(primary.via_locations().count().to_string());
                ui.end_row();
            }

            if directions.routes().len() > 1 {
                ui.label("Alternatives:");
                ui.label((directions.routes().len() - 1).to_string());
                ui.end_row();
            }
        });

    if !primary.summary.is_empty() {
        ui.label(RichText::new(format!("via {}", primary.summary)).small().weak());
    }
}

fn render_picked_point(ui: &mut Ui, state: &mut AppState) {
    let Some(point) = state.picked_point() else {
        return;
    };

    ui.horizontal(|ui| {
        ui.label(RichText::new("📌 Selected point").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                state.push(Action::DismissPick);
            }
        });
    });
    ui.label(RichText::new(point.to_string()).monospace());
    ui.horizontal_wrapped(|ui| {
        if ui.button("Set as origin").clicked() {
            state.push(Action::PickedAsOrigin(point));
        }
        if ui.button("Set as destination").clicked() {
            state.push(Action::PickedAsDestination(point));
        }
        if ui.button("Add as stop").clicked() {
            state.push(Action::PickedAsStop(point));
        }
        if state.position_movable && ui.button("Move my location here").clicked() {
            state.push(Action::MoveMyLocation(point));
        }
    });
}

fn render_location_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("📍 Your Location").strong());
    ui.add_space(4.0);

    let Some(position) = state.location.position else {
        let text = if state.location.is_loading {
            "Waiting for a position fix..."
        } else {
            "Position unknown"
        };
        ui.label(RichText::new(text).weak());
        if ui.button("🎯 Locate me").clicked() {
            state.push(Action::Recenter);
        }
        return;
    };

    egui::Grid::new("location_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Coordinates:");
            ui.label(RichText::new(position.coords.to_string()).monospace());
            ui.end_row();

            ui.label("Accuracy:");
            let accuracy_color = match position.accuracy.map(AccuracyLevel::from_meters) {
                Some(AccuracyLevel::Good) => SUCCESS_COLOR,
                Some(AccuracyLevel::Fair) => ui.visuals().warn_fg_color,
                Some(AccuracyLevel::Poor) => Color32::RED,
                None => ui.visuals().weak_text_color(),
            };
            ui.label(RichText::new(format_accuracy(position.accuracy)).color(accuracy_color));
            ui.end_row();

            ui.label("Address:");
            if state.location.address.is_empty() {
                ui.label(RichText::new("Looking up address...").weak());
            } else {
                ui.label(state.location.address.as_str());
            }
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.horizontal_wrapped(|ui| {
        if ui.button("🎯 Recenter").clicked() {
            state.push(Action::Recenter);
        }
        if state.copied_visible() {
            ui.label(RichText::new("✔ Copied!").color(SUCCESS_COLOR));
        } else if ui.button("📋 Copy link").clicked() {
            state.push(Action::CopyShareLink);
        }
        if ui.button("💬 WhatsApp").clicked() {
            state.push(Action::OpenWhatsApp);
        }
        if ui.button("🗺 Open map").clicked() {
            state.push(Action::OpenMapLink);
        }
    });
}

fn render_tiles_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new("Right-click the map to pick a point")
            .small()
            .weak(),
    );
}
