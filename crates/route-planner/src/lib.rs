//! Route Planner - Application Library
//!
//! The egui/eframe shell around `route-planner-lib`: a full-screen slippy map with a
//! search sidebar, plus the HTTP backends for routing (OSRM) and geocoding (Nominatim).

mod app;
mod backend;
mod entrypoints;

pub use app::RoutePlannerApp;

#[cfg(not(target_arch = "wasm32"))]
pub use entrypoints::run::{LaunchError, run_native};

#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;

/// Application name, used for the window title and storage
pub const APP_NAME: &str = "Route Planner";
