//! Slatepad - focused markdown note editor
//!
//! Notes grouped into sections, slash-command shortcuts, debounced autosave
//! to local storage and PDF export.

mod app;
mod core;
mod ui;

use app::SlatepadApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Slatepad...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Slatepad"),
        ..Default::default()
    };

    eframe::run_native(
        "Slatepad",
        native_options,
        Box::new(|cc| Ok(Box::new(SlatepadApp::new(cc)))),
    )
}
