//! Main application state and UI coordination

use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui;
use egui_commonmark::CommonMarkCache;

use crate::core::autosave::{Autosave, SaveStatus};
use crate::core::config::AppConfig;
use crate::core::editor::EditorController;
use crate::core::export::{export_filename, export_note};
use crate::core::storage::{content_key, FileStore, KeyValueStore, MemoryStore};
use crate::core::notes::Workspace;
use crate::ui::editor::{command_help, EditorPanel};
use crate::ui::footer::FooterPanel;
use crate::ui::navbar::NavbarPanel;
use crate::ui::preview::PreviewPanel;
use crate::ui::sidebar::{SidebarAction, SidebarPanel};

/// Main application state
pub struct SlatepadApp {
    /// Application configuration
    pub config: AppConfig,
    /// Where the configuration is written back, if anywhere
    config_path: Option<PathBuf>,
    /// Local key-value storage
    store: Box<dyn KeyValueStore>,
    /// Notes, sections and selection
    pub workspace: Workspace,
    /// Debounced buffer writes
    autosave: Autosave,
    /// Slash command handling for the editor
    controller: EditorController,
    /// Editing copy of the current note's content
    buffer: String,
    /// Editing copy of the current note's title
    title: String,
    /// Whether sidebar is visible
    pub sidebar_visible: bool,
    /// Last export result shown in the footer
    status_message: Option<String>,
    /// Commonmark cache for preview
    commonmark_cache: CommonMarkCache,
}

impl SlatepadApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {:#}", e);
            AppConfig::default()
        });
        Self::configure_style(&cc.egui_ctx, &config);

        let store: Box<dyn KeyValueStore> = match FileStore::default_path() {
            Some(path) => {
                tracing::info!("Using storage at {}", path.display());
                Box::new(FileStore::open(path))
            }
            None => {
                tracing::warn!("No data directory available, notes will not be persisted");
                Box::new(MemoryStore::new())
            }
        };

        let mut app = Self::with_store(config, store);
        app.config_path = AppConfig::config_path();
        app
    }

    /// Build the application around an already opened store
    pub fn with_store(config: AppConfig, store: Box<dyn KeyValueStore>) -> Self {
        let workspace = Workspace::load(store.as_ref());
        let current = workspace.current();
        let buffer = current.content.clone();
        let title = current.title.clone();

        Self {
            autosave: Autosave::new(config.editor.autosave_delay()),
            controller: EditorController::new(config.editor.variant),
            config,
            config_path: None,
            store,
            workspace,
            buffer,
            title,
            sidebar_visible: true,
            status_message: None,
            commonmark_cache: CommonMarkCache::default(),
        }
    }

    /// Configure theme and text size
    fn configure_style(ctx: &egui::Context, config: &AppConfig) {
        if config.ui.theme == "dark" {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
    }

    /// Record an edit of the current buffer and schedule its autosave
    pub fn on_edit(&mut self, now: Instant) {
        let id = self.workspace.current_id().to_string();
        match self.workspace.set_content(&id, &self.buffer) {
            Ok(true) => {
                self.autosave
                    .schedule(&content_key(&id), &self.buffer, now, self.store.as_mut());
            }
            Ok(false) => {}
            Err(e) => tracing::error!("Failed to update note: {}", e),
        }
    }

    /// Record a title edit; the note list is saved right away
    pub fn on_title_edit(&mut self) {
        let id = self.workspace.current_id().to_string();
        if let Err(e) = self.workspace.rename(&id, &self.title) {
            tracing::error!("Failed to rename note: {}", e);
            return;
        }
        self.persist_workspace();
    }

    /// Write the note list, ignoring storage failures
    fn persist_workspace(&mut self) {
        if let Err(e) = self.workspace.save(self.store.as_mut()) {
            tracing::warn!("Failed to save note list: {}", e);
        }
    }

    /// Reload the editing copies after the selection changed
    fn load_current(&mut self) {
        let note = self.workspace.current();
        self.buffer = note.content.clone();
        self.title = note.title.clone();
        self.controller.reset();
    }

    /// Write the configuration back to disk
    fn save_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }

    /// Show or hide the preview split and remember the choice
    pub fn toggle_preview(&mut self) {
        self.config.ui.show_preview = !self.config.ui.show_preview;
        self.save_config();
    }

    /// Write any pending buffer immediately
    pub fn flush(&mut self) {
        self.autosave.flush(self.store.as_mut());
    }

    /// Apply a sidebar request
    pub fn apply(&mut self, action: SidebarAction) {
        tracing::debug!("Sidebar action: {:?}", action);
        let result = match action {
            SidebarAction::SelectNote(id) => {
                if id == self.workspace.current_id() {
                    return;
                }
                self.flush();
                self.workspace.select(&id)
            }
            SidebarAction::AddNote(section) => {
                self.flush();
                self.workspace.add_note(&section);
                Ok(())
            }
            SidebarAction::DeleteNote(id) => {
                self.autosave.cancel(&content_key(&id));
                self.workspace
                    .delete_note(&id, self.store.as_mut())
                    .map(|_| ())
            }
            SidebarAction::MoveNote { id, section } => self.workspace.move_note(&id, &section),
            SidebarAction::AddCategory => {
                self.workspace.add_category();
                Ok(())
            }
            SidebarAction::DeleteCategory(name) => self.workspace.delete_category(&name),
            SidebarAction::ExportCurrent => {
                self.export_with_dialog();
                return;
            }
        };

        if let Err(e) = result {
            tracing::warn!("Sidebar action failed: {}", e);
            return;
        }
        self.load_current();
        self.persist_workspace();
    }

    /// Ask for a destination and export the current note
    fn export_with_dialog(&mut self) {
        let file_name = export_filename(&self.workspace.current().title);
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("PDF", &["pdf"])
            .save_file()
        else {
            return;
        };

        if let Some(written) = self.export_current_to(&path) {
            if self.config.export.open_after_export {
                if let Err(e) = open::that(&written) {
                    tracing::warn!("Failed to open {}: {}", written.display(), e);
                }
            }
        }
    }

    /// Export the current note to `path`, reporting the outcome in the footer
    pub fn export_current_to(&mut self, path: &Path) -> Option<PathBuf> {
        match export_note(self.workspace.current(), &self.config.export, path) {
            Ok(written) => {
                self.status_message = Some(format!("Exported {}", written.display()));
                Some(written)
            }
            Err(e) => {
                tracing::error!("PDF export failed: {}", e);
                self.status_message = Some(format!("Export failed: {}", e));
                None
            }
        }
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Note").clicked() {
                        self.apply(SidebarAction::AddNote(self.workspace.current().section.clone()));
                        ui.close();
                    }
                    if ui.button("Save Now").clicked() {
                        self.flush();
                        ui.close();
                    }
                    if ui.button("Export PDF...").clicked() {
                        self.apply(SidebarAction::ExportCurrent);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Sidebar").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    if ui.button("Toggle Preview").clicked() {
                        self.toggle_preview();
                        ui.close();
                    }
                });

                ui.menu_button("Commands", |ui| {
                    for (token, description) in command_help(&self.controller) {
                        ui.horizontal(|ui| {
                            ui.monospace(token);
                            ui.label(description);
                        });
                    }
                });
            });
        });
    }
}

impl eframe::App for SlatepadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.autosave.poll(now, self.store.as_mut());
        if let Some(wait) = self.autosave.time_until_due(now) {
            ctx.request_repaint_after(wait);
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            self.flush();
            self.save_config();
        }

        // Handle keyboard shortcuts
        let mut action = None;
        let mut toggle_preview = false;
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(egui::Key::N) {
                action = Some(SidebarAction::AddNote(self.workspace.current().section.clone()));
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::S) {
                self.autosave.flush(self.store.as_mut());
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::B) {
                self.sidebar_visible = !self.sidebar_visible;
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::P) {
                toggle_preview = true;
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::E) {
                action = Some(SidebarAction::ExportCurrent);
            }
        });

        if toggle_preview {
            self.toggle_preview();
        }

        // Render menu bar
        self.render_menu_bar(ctx);

        egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
            ui.add_space(4.0);
            if NavbarPanel::show(ui, &mut self.title, &self.buffer) {
                self.on_title_edit();
            }
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            FooterPanel::show(ui, self.save_status(), self.status_message.as_deref());
        });

        // Render sidebar with the note list
        if self.sidebar_visible {
            egui::SidePanel::left("sidebar")
                .resizable(true)
                .default_width(self.config.ui.sidebar_width)
                .min_width(160.0)
                .show(ctx, |ui| {
                    if let Some(a) = SidebarPanel::show(ui, &self.workspace) {
                        action = Some(a);
                    }
                });
        }

        // Render main content area
        egui::CentralPanel::default().show(ctx, |ui| {
            let font_size = self.config.editor.font_size;
            let word_wrap = self.config.editor.word_wrap;

            let changed = if self.config.ui.show_preview {
                let half = ui.available_width() / 2.0 - 4.0;
                let mut changed = false;
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        changed = EditorPanel::show(
                            ui,
                            &mut self.controller,
                            &mut self.buffer,
                            font_size,
                            word_wrap,
                        );
                    });
                    ui.separator();
                    ui.vertical(|ui| {
                        ui.set_width(half);
                        PreviewPanel::show(ui, &mut self.commonmark_cache, &self.buffer);
                    });
                });
                changed
            } else {
                EditorPanel::show(
                    ui,
                    &mut self.controller,
                    &mut self.buffer,
                    font_size,
                    word_wrap,
                )
            };

            if changed {
                self.on_edit(now);
            }
        });

        if let Some(action) = action {
            self.apply(action);
        }
    }
}
