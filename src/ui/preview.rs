//! Markdown preview panel using egui_commonmark

use eframe::egui;
use egui_commonmark::{CommonMarkCache, CommonMarkViewer};

/// Markdown preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, cache: &mut CommonMarkCache, content: &str) {
        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                if content.trim().is_empty() {
                    Self::show_empty(ui);
                } else {
                    CommonMarkViewer::new().show(ui, cache, content);
                }
            });
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.weak("Nothing to preview yet");
        });
    }
}
