//! Native (desktop) entry point

use crate::{APP_NAME, RoutePlannerApp};

/// Failures that prevent the application from starting
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to create Tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Eframe(#[from] eframe::Error),
}

/// Run the application on native platforms.
///
/// The window is driven from inside a multi-threaded Tokio runtime so that routing and
/// geocoding requests spawned by the UI have an executor.
pub fn run_native() -> Result<(), LaunchError> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        super::logging::setup_logging();

        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 720.0])
                .with_title(APP_NAME),
            ..Default::default()
        };

        eframe::run_native(
            APP_NAME,
            native_options,
            Box::new(|cc| Ok(Box::new(RoutePlannerApp::new(cc)))),
        )
    })?;

    Ok(())
}
