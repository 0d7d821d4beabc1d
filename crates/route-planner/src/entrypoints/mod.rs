//! Platform entry points
//!
//! Native builds run eframe inside a multi-threaded tokio runtime so background HTTP
//! requests can be spawned from the UI thread. Web builds are started from JavaScript
//! through [`web::WebHandle`].

pub mod cli;

#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

#[cfg(not(target_arch = "wasm32"))]
pub mod run;

#[cfg(target_arch = "wasm32")]
pub mod web;
