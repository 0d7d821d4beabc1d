#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), route_planner::LaunchError> {
    route_planner::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Started from JavaScript through `WebHandle`
}
