//! Note editor panel

use eframe::egui;
use egui::text::{CCursor, CCursorRange};

use crate::core::editor::{EditorController, KeyOutcome};

/// Markdown editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor. Returns true if the buffer changed this frame.
    pub fn show(
        ui: &mut egui::Ui,
        controller: &mut EditorController,
        buffer: &mut String,
        font_size: f32,
        word_wrap: bool,
    ) -> bool {
        let id = ui.make_persistent_id("note_editor");
        let ctx = ui.ctx().clone();
        let mut changed = false;

        // Cursor left over from a command replaced on the previous frame
        if let Some(cursor) = controller.take_due_cursor() {
            Self::set_cursor(&ctx, id, cursor);
        }

        // Text typed in the same frame would land at the stale cursor of the
        // replaced buffer, so Enter is left to the widget then.
        if ctx.memory(|m| m.has_focus(id))
            && Self::enter_pressed(&ctx)
            && !ctx.input(|i| has_text_input(&i.events))
        {
            if let Some(range) =
                egui::TextEdit::load_state(&ctx, id).and_then(|s| s.cursor.char_range())
            {
                let outcome =
                    controller.on_enter(buffer, range.secondary.index, range.primary.index);
                if let KeyOutcome::Replaced(edit) = outcome {
                    ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
                    *buffer = edit.buffer;
                    changed = true;
                    ctx.request_repaint();
                }
            }
        }

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                let width = if word_wrap {
                    ui.available_width()
                } else {
                    f32::INFINITY
                };
                let response = egui::TextEdit::multiline(buffer)
                    .id(id)
                    .font(egui::FontId::proportional(font_size))
                    .hint_text("Start writing something beautiful...")
                    .frame(false)
                    .desired_width(width)
                    .desired_rows(24)
                    .lock_focus(true)
                    .show(ui);

                if response.response.changed() {
                    changed = true;
                }
            });

        controller.end_frame();
        if controller.has_pending_cursor() {
            ctx.request_repaint();
        }

        changed
    }

    /// Enter without modifiers
    fn enter_pressed(ctx: &egui::Context) -> bool {
        ctx.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.is_none())
    }

    /// Place the caret at a char offset
    fn set_cursor(ctx: &egui::Context, id: egui::Id, cursor: usize) {
        if let Some(mut state) = egui::TextEdit::load_state(ctx, id) {
            state
                .cursor
                .set_char_range(Some(CCursorRange::one(CCursor::new(cursor))));
            state.store(ctx, id);
        }
        ctx.memory_mut(|m| m.request_focus(id));
    }
}

/// Whether any characters were typed this frame
fn has_text_input(events: &[egui::Event]) -> bool {
    events.iter().any(|e| matches!(e, egui::Event::Text(_)))
}

/// Help text listing the available slash commands
pub fn command_help(controller: &EditorController) -> Vec<(String, &'static str)> {
    controller
        .table()
        .commands()
        .into_iter()
        .map(|c| (c.token().to_string(), c.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter() -> egui::Event {
        egui::Event::Key {
            key: egui::Key::Enter,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_enter_alone_has_no_text_input() {
        assert!(!has_text_input(&[enter()]));
        assert!(!has_text_input(&[]));
    }

    #[test]
    fn test_text_with_enter_is_detected() {
        assert!(has_text_input(&[egui::Event::Text("x".to_string()), enter()]));
    }
}
