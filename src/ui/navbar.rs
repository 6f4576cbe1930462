//! Title bar with word and character counters

use eframe::egui;

use crate::core::text_stats::{count_chars, count_words};

/// Note title and counters
pub struct NavbarPanel;

impl NavbarPanel {
    /// Show the navbar. Returns true if the title was edited.
    pub fn show(ui: &mut egui::Ui, title: &mut String, content: &str) -> bool {
        let mut changed = false;

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(title)
                    .hint_text("Untitled")
                    .font(egui::FontId::proportional(20.0))
                    .frame(false)
                    .desired_width(ui.available_width() / 2.0),
            );
            changed = response.changed();

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.monospace(format!("{} chars", count_chars(content)));
                ui.separator();
                ui.monospace(format!("{} words", count_words(content)));
            });
        });

        changed
    }
}
