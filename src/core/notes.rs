//! Note list and section management
//!
//! All note state is owned by [`Workspace`] and changed only through its
//! methods. The caller decides when to persist: structural changes are saved
//! right away, buffer edits go through the debounced autosave.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::storage::{content_key, KeyValueStore, StorageError, NOTES_KEY};

/// Reserved section every note falls back to
pub const DEFAULT_SECTION: &str = "pages";

const DEFAULT_TITLE: &str = "Untitled";

/// A single note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub section: String,
}

/// Errors from note list operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("no note with id {0}")]
    UnknownNote(String),
    #[error("no section named {0}")]
    UnknownSection(String),
    #[error("the \"pages\" section cannot be removed")]
    ReservedSection,
}

/// Persisted form of the note list; buffers are stored under their own keys
#[derive(Debug, Serialize, Deserialize)]
struct SavedWorkspace {
    notes: Vec<SavedNote>,
    #[serde(default)]
    categories: Vec<String>,
    current: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedNote {
    id: String,
    title: String,
    #[serde(default)]
    section: Option<String>,
}

/// Display label for a section ("pages" -> "Pages")
pub fn section_label(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Notes, user categories and the current selection
#[derive(Debug, Clone)]
pub struct Workspace {
    notes: Vec<Note>,
    categories: Vec<String>,
    current: String,
    next_id: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        let mut workspace = Self {
            notes: Vec::new(),
            categories: Vec::new(),
            current: String::new(),
            next_id: 1,
        };
        workspace.add_note(DEFAULT_SECTION);
        workspace
    }
}

impl Workspace {
    /// Load the note list and buffers. Missing or malformed data yields the
    /// default single-note workspace.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(NOTES_KEY) else {
            return Self::default();
        };

        let saved: SavedWorkspace = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Discarding malformed note list: {}", e);
                return Self::default();
            }
        };
        if saved.notes.is_empty() {
            return Self::default();
        }

        let mut workspace = Self {
            notes: Vec::with_capacity(saved.notes.len()),
            categories: Vec::new(),
            current: String::new(),
            next_id: 1,
        };
        for category in saved.categories {
            workspace.ensure_category(&category);
        }
        for note in saved.notes {
            let section = note
                .section
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SECTION.to_string());
            workspace.ensure_category(&section);
            let content = store.get(&content_key(&note.id)).unwrap_or_default();
            workspace.next_id = workspace.next_id.max(id_number(&note.id) + 1);
            workspace.notes.push(Note {
                id: note.id,
                title: note.title,
                content,
                section,
            });
        }

        workspace.current = saved
            .current
            .filter(|id| workspace.get(id).is_some())
            .unwrap_or_else(|| workspace.notes[0].id.clone());

        tracing::info!("Loaded {} notes", workspace.notes.len());
        workspace
    }

    /// Persist the note list (titles, sections, selection)
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let saved = SavedWorkspace {
            notes: self
                .notes
                .iter()
                .map(|n| SavedNote {
                    id: n.id.clone(),
                    title: n.title.clone(),
                    section: Some(n.section.clone()),
                })
                .collect(),
            categories: self.categories.clone(),
            current: Some(self.current.clone()),
        };
        let raw = serde_json::to_string(&saved).map_err(|e| StorageError::Write(e.to_string()))?;
        store.set(NOTES_KEY, &raw)
    }

    #[cfg(test)]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[cfg(test)]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// All sections: the reserved one first, then user categories
    pub fn sections(&self) -> Vec<String> {
        std::iter::once(DEFAULT_SECTION.to_string())
            .chain(self.categories.iter().cloned())
            .collect()
    }

    /// Notes in a section, in creation order
    pub fn notes_in<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.iter().filter(move |n| n.section == section)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Note, WorkspaceError> {
        self.notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| WorkspaceError::UnknownNote(id.to_string()))
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    /// The selected note
    pub fn current(&self) -> &Note {
        self.get(&self.current)
            .unwrap_or(&self.notes[0])
    }

    /// Create a note in `section` and select it
    pub fn add_note(&mut self, section: &str) -> String {
        let section = if section.trim().is_empty() {
            DEFAULT_SECTION
        } else {
            section
        };
        self.ensure_category(section);

        let id = format!("note-{}", self.next_id);
        self.next_id += 1;
        self.notes.push(Note {
            id: id.clone(),
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            section: section.to_string(),
        });
        self.current = id.clone();
        tracing::debug!("Created note {} in {}", id, section);
        id
    }

    /// Select a note
    pub fn select(&mut self, id: &str) -> Result<(), WorkspaceError> {
        if self.get(id).is_none() {
            return Err(WorkspaceError::UnknownNote(id.to_string()));
        }
        self.current = id.to_string();
        Ok(())
    }

    /// Delete a note and its stored buffer. The list is never left empty.
    pub fn delete_note(
        &mut self,
        id: &str,
        store: &mut dyn KeyValueStore,
    ) -> Result<Note, WorkspaceError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| WorkspaceError::UnknownNote(id.to_string()))?;
        let removed = self.notes.remove(index);

        if let Err(e) = store.remove(&content_key(id)) {
            tracing::warn!("Failed to remove stored buffer for {}: {}", id, e);
        }

        if self.notes.is_empty() {
            self.add_note(DEFAULT_SECTION);
        } else if self.current == id {
            let neighbour = index.min(self.notes.len() - 1);
            self.current = self.notes[neighbour].id.clone();
        }

        tracing::debug!("Deleted note {}", id);
        Ok(removed)
    }

    /// Move a note into another section, creating the section if needed
    pub fn move_note(&mut self, id: &str, section: &str) -> Result<(), WorkspaceError> {
        if section.trim().is_empty() {
            return Err(WorkspaceError::UnknownSection(section.to_string()));
        }
        self.get_mut(id)?.section = section.to_string();
        self.ensure_category(section);
        Ok(())
    }

    /// Add a category with a generated unique name
    pub fn add_category(&mut self) -> String {
        let mut n = self.categories.len() + 1;
        let name = loop {
            let candidate = format!("category {}", n);
            if !self.categories.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        self.categories.push(name.clone());
        name
    }

    /// Remove a category; its notes go back to the default section
    pub fn delete_category(&mut self, name: &str) -> Result<(), WorkspaceError> {
        if name == DEFAULT_SECTION {
            return Err(WorkspaceError::ReservedSection);
        }
        let index = self
            .categories
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| WorkspaceError::UnknownSection(name.to_string()))?;
        self.categories.remove(index);

        for note in self.notes.iter_mut().filter(|n| n.section == name) {
            note.section = DEFAULT_SECTION.to_string();
        }
        Ok(())
    }

    /// Rename a note
    pub fn rename(&mut self, id: &str, title: &str) -> Result<(), WorkspaceError> {
        self.get_mut(id)?.title = title.to_string();
        Ok(())
    }

    /// Replace a note's buffer. Returns true if it changed.
    pub fn set_content(&mut self, id: &str, content: &str) -> Result<bool, WorkspaceError> {
        let note = self.get_mut(id)?;
        if note.content == content {
            return Ok(false);
        }
        note.content = content.to_string();
        Ok(true)
    }

    fn ensure_category(&mut self, section: &str) {
        if section != DEFAULT_SECTION && !self.categories.iter().any(|c| c == section) {
            self.categories.push(section.to_string());
        }
    }
}

/// Numeric part of a generated id ("note-12" -> 12)
fn id_number(id: &str) -> u64 {
    id.strip_prefix("note-")
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    #[test]
    fn test_default_has_one_selected_note() {
        let workspace = Workspace::default();
        assert_eq!(workspace.notes().len(), 1);
        assert_eq!(workspace.current().section, DEFAULT_SECTION);
        assert_eq!(workspace.current().title, "Untitled");
        assert_eq!(workspace.sections(), vec!["pages".to_string()]);
    }

    #[test]
    fn test_add_and_select() {
        let mut workspace = Workspace::default();
        let first = workspace.current_id().to_string();
        let second = workspace.add_note("work");
        assert_ne!(first, second);
        assert_eq!(workspace.current_id(), second);
        assert_eq!(workspace.categories(), ["work".to_string()]);

        workspace.select(&first).unwrap();
        assert_eq!(workspace.current_id(), first);
        assert_eq!(
            workspace.select("missing"),
            Err(WorkspaceError::UnknownNote("missing".to_string()))
        );
    }

    #[test]
    fn test_delete_removes_stored_buffer() {
        let mut store = MemoryStore::new();
        let mut workspace = Workspace::default();
        let id = workspace.add_note(DEFAULT_SECTION);
        store.set(&content_key(&id), "body").unwrap();

        workspace.delete_note(&id, &mut store).unwrap();
        assert_eq!(store.get(&content_key(&id)), None);
        assert!(workspace.get(&id).is_none());
        assert_eq!(workspace.notes().len(), 1);
        assert_eq!(workspace.current_id(), workspace.notes()[0].id);
    }

    #[test]
    fn test_deleting_last_note_creates_fresh_one() {
        let mut store = MemoryStore::new();
        let mut workspace = Workspace::default();
        let only = workspace.current_id().to_string();
        workspace.delete_note(&only, &mut store).unwrap();

        assert_eq!(workspace.notes().len(), 1);
        assert_ne!(workspace.current_id(), only);
    }

    #[test]
    fn test_delete_keeps_selection_of_other_note() {
        let mut store = MemoryStore::new();
        let mut workspace = Workspace::default();
        let first = workspace.current_id().to_string();
        let second = workspace.add_note(DEFAULT_SECTION);
        workspace.select(&first).unwrap();

        workspace.delete_note(&second, &mut store).unwrap();
        assert_eq!(workspace.current_id(), first);
    }

    #[test]
    fn test_move_between_sections() {
        let mut workspace = Workspace::default();
        let id = workspace.current_id().to_string();
        workspace.move_note(&id, "ideas").unwrap();

        assert_eq!(workspace.notes_in("ideas").count(), 1);
        assert_eq!(workspace.notes_in(DEFAULT_SECTION).count(), 0);
        assert_eq!(workspace.sections(), vec!["pages".to_string(), "ideas".to_string()]);
        assert!(workspace.move_note("nope", "ideas").is_err());
    }

    #[test]
    fn test_categories() {
        let mut workspace = Workspace::default();
        let a = workspace.add_category();
        let b = workspace.add_category();
        assert_eq!(a, "category 1");
        assert_eq!(b, "category 2");

        let id = workspace.add_note(&a);
        workspace.delete_category(&a).unwrap();
        assert_eq!(workspace.get(&id).unwrap().section, DEFAULT_SECTION);
        assert_eq!(workspace.categories(), [b.clone()]);

        // Name reuse skips the ones still taken
        assert_eq!(workspace.add_category(), "category 3");

        assert_eq!(
            workspace.delete_category(DEFAULT_SECTION),
            Err(WorkspaceError::ReservedSection)
        );
        assert!(workspace.delete_category("unknown").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = MemoryStore::new();
        let mut workspace = Workspace::default();
        let id = workspace.add_note("journal");
        workspace.rename(&id, "Monday").unwrap();
        workspace.set_content(&id, "# Monday\n").unwrap();
        store.set(&content_key(&id), "# Monday\n").unwrap();
        workspace.save(&mut store).unwrap();

        let loaded = Workspace::load(&store);
        assert_eq!(loaded.notes(), workspace.notes());
        assert_eq!(loaded.current_id(), id);
        assert_eq!(loaded.categories(), ["journal".to_string()]);

        // Ids keep increasing after a reload
        let mut loaded = loaded;
        let next = loaded.add_note(DEFAULT_SECTION);
        assert!(workspace.get(&next).is_none());
    }

    #[test]
    fn test_malformed_payload_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(NOTES_KEY, "{\"notes\": 42").unwrap();
        let workspace = Workspace::load(&store);
        assert_eq!(workspace.notes().len(), 1);

        store.set(NOTES_KEY, r#"{"notes": [], "current": null}"#).unwrap();
        assert_eq!(Workspace::load(&store).notes().len(), 1);
    }

    #[test]
    fn test_load_repairs_sections_and_selection() {
        let mut store = MemoryStore::new();
        store
            .set(
                NOTES_KEY,
                r#"{"notes": [{"id": "note-4", "title": "A"}, {"id": "note-9", "title": "B", "section": "misc"}], "current": "gone"}"#,
            )
            .unwrap();
        let workspace = Workspace::load(&store);
        assert_eq!(workspace.current_id(), "note-4");
        assert_eq!(workspace.get("note-4").unwrap().section, DEFAULT_SECTION);
        assert_eq!(workspace.categories(), ["misc".to_string()]);
    }

    #[test]
    fn test_set_content_reports_change() {
        let mut workspace = Workspace::default();
        let id = workspace.current_id().to_string();
        assert!(workspace.set_content(&id, "x").unwrap());
        assert!(!workspace.set_content(&id, "x").unwrap());
    }

    #[test]
    fn test_section_label() {
        assert_eq!(section_label("pages"), "Pages");
        assert_eq!(section_label(""), "");
    }
}
