//! Status footer

use eframe::egui;

use crate::core::autosave::SaveStatus;

pub struct FooterPanel;

impl FooterPanel {
    pub fn show(ui: &mut egui::Ui, status: SaveStatus, message: Option<&str>) {
        let state = match status {
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
        };

        ui.horizontal(|ui| {
            ui.small(format!("Focus mode \u{2022} Auto-save enabled \u{2022} {}", state));
            if let Some(message) = message {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(message);
                });
            }
        });
    }
}
