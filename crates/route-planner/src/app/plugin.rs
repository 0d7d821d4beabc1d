//! Walkers plugin drawing the route overlay and the map pins
//!
//! The plugin is rebuilt every frame from a snapshot of the [`WalkersSurface`]. A right
//! click on the map is reported back through a shared slot so the sidebar can offer
//! actions for the clicked point.
//!
//! [`WalkersSurface`]: crate::app::surface::WalkersSurface

use egui::{Color32, Pos2, Stroke};
use route_planner_lib::{LatLng, MarkerSpec, PinShape, Rgb};
use std::sync::Arc;
use tokio::sync::RwLock;
use walkers::{Plugin, Projector};

const ROUTE_COLOR: Color32 = Color32::from_rgb(0x42, 0x85, 0xF4);
const ROUTE_WIDTH: f32 = 5.0;
const PIN_RADIUS: f32 = 9.0;
const PIN_HEIGHT: f32 = 24.0;
const DOT_RADIUS: f32 = 8.0;

/// Point picked with a right click, shared with the UI
pub type PickedPoint = Arc<RwLock<Option<LatLng>>>;

pub struct RoutePlugin {
    path: Option<Vec<LatLng>>,
    markers: Vec<MarkerSpec>,
    picked: PickedPoint,
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn to_screen(projector: &Projector, position: LatLng) -> Pos2 {
    let screen_vec = projector.project(walkers::lat_lon(position.lat, position.lng));
    Pos2::new(screen_vec.x, screen_vec.y)
}

impl RoutePlugin {
    pub fn new(path: Option<Vec<LatLng>>, markers: Vec<MarkerSpec>, picked: PickedPoint) -> Self {
        Self {
            path,
            markers,
            picked,
        }
    }

    fn render_route(&self, projector: &Projector, painter: &egui::Painter) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let screen_points: Vec<Pos2> = path.iter().map(|p| to_screen(projector, *p)).collect();
        if screen_points.len() < 2 {
            return;
        }

        // White casing under the blue stroke
        painter.add(egui::Shape::line(
            screen_points.clone(),
            Stroke::new(ROUTE_WIDTH + 3.0, Color32::WHITE),
        ));
        painter.add(egui::Shape::line(
            screen_points,
            Stroke::new(ROUTE_WIDTH, ROUTE_COLOR),
        ));
    }

    /// Draw one pin and return the center of its clickable head
    fn render_marker(marker: &MarkerSpec, anchor: Pos2, painter: &egui::Painter) -> (Pos2, f32) {
        let style = &marker.style;
        let background = color(style.background);
        let border = Stroke::new(2.0, color(style.border));

        let (head, radius) = match style.shape {
            PinShape::Circle => {
                let radius = DOT_RADIUS * style.scale;
                painter.circle_filled(anchor, radius + 6.0, background.gamma_multiply(0.25));
                painter.circle(anchor, radius, background, border);
                (anchor, radius)
            }
            PinShape::Pin => {
                let radius = PIN_RADIUS * style.scale;
                let head = anchor - egui::vec2(0.0, PIN_HEIGHT * style.scale - radius);
                painter.add(egui::Shape::convex_polygon(
                    vec![
                        head + egui::vec2(-radius * 0.8, radius * 0.5),
                        head + egui::vec2(radius * 0.8, radius * 0.5),
                        anchor,
                    ],
                    background,
                    border,
                ));
                painter.circle(head, radius, background, border);
                (head, radius)
            }
        };

        if let Some(glyph) = &style.glyph {
            painter.text(
                head,
                egui::Align2::CENTER_CENTER,
                glyph,
                egui::FontId::proportional(11.0 * style.scale),
                color(style.glyph_color),
            );
        } else if style.shape == PinShape::Pin {
            painter.circle_filled(head, radius * 0.35, color(style.glyph_color));
        }
        (head, radius)
    }

    fn render_title(title: &str, head: Pos2, radius: f32, painter: &egui::Painter) {
        let galley = painter.layout_no_wrap(
            title.to_string(),
            egui::FontId::proportional(12.0),
            Color32::WHITE,
        );
        let size = galley.size() + egui::vec2(8.0, 4.0);
        let rect = egui::Rect::from_min_size(
            head - egui::vec2(size.x / 2.0, radius + size.y + 4.0),
            size,
        );
        painter.rect_filled(rect, 4.0, Color32::from_black_alpha(200));
        painter.galley(rect.min + egui::vec2(4.0, 2.0), galley, Color32::WHITE);
    }
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutePlugin::run");

        let painter = ui.painter();
        self.render_route(projector, painter);

        let hover = response.hover_pos();
        let mut hovered_title = None;
        for marker in &self.markers {
            let anchor = to_screen(projector, marker.position);
            let (head, radius) = Self::render_marker(marker, anchor, painter);
            if let (Some(pointer), Some(title)) = (hover, marker.title.as_deref())
                && pointer.distance(head) <= radius
            {
                hovered_title = Some((title, head, radius));
            }
        }
        if let Some((title, head, radius)) = hovered_title {
            Self::render_title(title, head, radius, painter);
        }

        if response.secondary_clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let position = projector.unproject(pointer.to_vec2());
            let point = LatLng::new(position.y(), position.x());
            if let Ok(mut picked) = self.picked.try_write() {
                *picked = Some(point);
            }
            tracing::debug!("Picked map point {point}");
        }
    }
}
