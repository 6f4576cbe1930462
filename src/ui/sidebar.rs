//! Sidebar listing notes grouped by section

use eframe::egui;

use crate::core::notes::{section_label, Note, Workspace, DEFAULT_SECTION};

/// Change requested from the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    SelectNote(String),
    AddNote(String),
    DeleteNote(String),
    MoveNote { id: String, section: String },
    AddCategory,
    DeleteCategory(String),
    ExportCurrent,
}

/// Sidebar with sections, notes and the export button
pub struct SidebarPanel;

impl SidebarPanel {
    /// Show the sidebar
    pub fn show(ui: &mut egui::Ui, workspace: &Workspace) -> Option<SidebarAction> {
        let mut action = None;

        ui.vertical(|ui| {
            // Header
            ui.horizontal(|ui| {
                ui.heading("Notes");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("+").on_hover_text("New note").clicked() {
                        action = Some(SidebarAction::AddNote(DEFAULT_SECTION.to_string()));
                    }
                    if ui.button("\u{1F5C0}").on_hover_text("New category").clicked() {
                        action = Some(SidebarAction::AddCategory);
                    }
                });
            });

            ui.separator();

            let list_height = (ui.available_height() - 40.0).max(0.0);
            egui::ScrollArea::vertical()
                .id_salt("sidebar_scroll")
                .max_height(list_height)
                .show(ui, |ui| {
                    for section in workspace.sections() {
                        Self::show_section(ui, workspace, &section, &mut action);
                    }

                    // Empty area below the sections gets the sidebar context menu
                    let rest = ui.allocate_response(
                        egui::vec2(ui.available_width(), ui.available_height().max(40.0)),
                        egui::Sense::click(),
                    );
                    rest.context_menu(|ui| {
                        if ui.button("Add Note").clicked() {
                            action = Some(SidebarAction::AddNote(DEFAULT_SECTION.to_string()));
                            ui.close();
                        }
                        if ui.button("Add Category").clicked() {
                            action = Some(SidebarAction::AddCategory);
                            ui.close();
                        }
                    });
                });

            ui.separator();
            if ui
                .add_sized([ui.available_width(), 28.0], egui::Button::new("\u{2B07} Download PDF"))
                .clicked()
            {
                action = Some(SidebarAction::ExportCurrent);
            }
        });

        action
    }

    /// Show one section as a collapsible drop zone
    fn show_section(
        ui: &mut egui::Ui,
        workspace: &Workspace,
        section: &str,
        action: &mut Option<SidebarAction>,
    ) {
        let frame = egui::Frame::new().inner_margin(egui::Margin::same(2));
        let (_, dropped) = ui.dnd_drop_zone::<String, ()>(frame, |ui| {
            ui.set_min_width(ui.available_width());

            let id = ui.make_persistent_id(("section", section));
            let state =
                egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, true);
            let (_, header, _) = state
                .show_header(ui, |ui| {
                    ui.label(egui::RichText::new(section_label(section)).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .small_button("+")
                            .on_hover_text(format!("New note in {}", section_label(section)))
                            .clicked()
                        {
                            *action = Some(SidebarAction::AddNote(section.to_string()));
                        }
                    });
                })
                .body(|ui| {
                    let mut empty = true;
                    for note in workspace.notes_in(section) {
                        empty = false;
                        let selected = note.id == workspace.current_id();
                        Self::show_note(ui, workspace, note, selected, action);
                    }
                    if empty {
                        ui.weak("Drop notes here");
                    }
                });

            header.response.interact(egui::Sense::click()).context_menu(|ui| {
                if ui.button("Add Note").clicked() {
                    *action = Some(SidebarAction::AddNote(section.to_string()));
                    ui.close();
                }
                if ui.button("Add Category").clicked() {
                    *action = Some(SidebarAction::AddCategory);
                    ui.close();
                }
                if section != DEFAULT_SECTION && ui.button("Delete Category").clicked() {
                    *action = Some(SidebarAction::DeleteCategory(section.to_string()));
                    ui.close();
                }
            });
        });

        if let Some(id) = dropped {
            *action = Some(SidebarAction::MoveNote {
                id: (*id).clone(),
                section: section.to_string(),
            });
        }
    }

    /// Show a draggable note entry
    fn show_note(
        ui: &mut egui::Ui,
        workspace: &Workspace,
        note: &Note,
        selected: bool,
        action: &mut Option<SidebarAction>,
    ) {
        let title = if note.title.trim().is_empty() {
            "Untitled"
        } else {
            note.title.as_str()
        };

        ui.horizontal(|ui| {
            let drag = ui.dnd_drag_source(
                egui::Id::new(("note", &note.id)),
                note.id.clone(),
                |ui| ui.selectable_label(selected, format!("\u{1F4C4} {}", title)),
            );
            let label = drag.inner;

            if label.clicked() {
                *action = Some(SidebarAction::SelectNote(note.id.clone()));
            }

            label.context_menu(|ui| {
                ui.menu_button("Move to", |ui| {
                    for section in workspace.sections() {
                        if section == note.section {
                            continue;
                        }
                        if ui.button(section_label(&section)).clicked() {
                            *action = Some(SidebarAction::MoveNote {
                                id: note.id.clone(),
                                section,
                            });
                            ui.close();
                        }
                    }
                });
                if ui.button("Delete").clicked() {
                    *action = Some(SidebarAction::DeleteNote(note.id.clone()));
                    ui.close();
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{1F5D1}").on_hover_text("Delete note").clicked() {
                    *action = Some(SidebarAction::DeleteNote(note.id.clone()));
                }
            });
        });
    }
}
