//! Editing surface controller
//!
//! Sits between key events and the command parser. When Enter turns a command
//! line into formatted markdown the new cursor position cannot be written in
//! the same frame: the text edit widget lays out the replaced buffer first and
//! would overwrite it. The write is therefore deferred to the next frame.

use serde::{Deserialize, Serialize};

use super::commands::{apply_slash_command, CommandMatch, CommandTable};
use super::structured::apply_block_command;

/// Which editing surface is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorVariant {
    /// Plain text with textual substitution
    Plain,
    /// Block-aware editing with toggle semantics
    #[default]
    Structured,
}

/// What the caller should do with the Enter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a command: let the default newline through
    PassThrough,
    /// Consume the key and replace the buffer
    Replaced(CommandMatch),
}

/// Cursor write scheduled to run after the next paint
#[derive(Debug, Default)]
pub struct DeferredCursor {
    pending: Option<usize>,
    /// Set once the frame that rendered the new buffer has finished
    painted: bool,
}

impl DeferredCursor {
    /// Schedule a cursor write, replacing any earlier one
    pub fn schedule(&mut self, cursor: usize) {
        self.pending = Some(cursor);
        self.painted = false;
    }

    /// Mark the end of a frame
    pub fn end_frame(&mut self) {
        if self.pending.is_some() {
            self.painted = true;
        }
    }

    /// Take the cursor if the frame that scheduled it has been painted
    pub fn take_due(&mut self) -> Option<usize> {
        if self.painted {
            self.painted = false;
            self.pending.take()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Controller for the note editor
#[derive(Debug)]
pub struct EditorController {
    variant: EditorVariant,
    table: CommandTable,
    cursor: DeferredCursor,
}

impl EditorController {
    /// Create a controller for the given editing surface
    pub fn new(variant: EditorVariant) -> Self {
        let table = match variant {
            EditorVariant::Plain => CommandTable::plain(),
            EditorVariant::Structured => CommandTable::structured(),
        };
        Self {
            variant,
            table,
            cursor: DeferredCursor::default(),
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Handle Enter with the selection `anchor..cursor` (char offsets)
    pub fn on_enter(&mut self, buffer: &str, anchor: usize, cursor: usize) -> KeyOutcome {
        let result = match self.variant {
            EditorVariant::Plain => apply_slash_command(buffer, cursor, &self.table),
            EditorVariant::Structured => {
                match apply_block_command(buffer, anchor, cursor, &self.table) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::debug!("Slash command ignored: {}", e);
                        None
                    }
                }
            }
        };

        match result {
            Some(edit) => {
                self.cursor.schedule(edit.cursor);
                KeyOutcome::Replaced(edit)
            }
            None => KeyOutcome::PassThrough,
        }
    }

    /// Call once the editor has been drawn for this frame
    pub fn end_frame(&mut self) {
        self.cursor.end_frame();
    }

    /// Cursor position to restore, if its frame has been painted
    pub fn take_due_cursor(&mut self) -> Option<usize> {
        self.cursor.take_due()
    }

    /// Whether a cursor write is still waiting for a repaint
    pub fn has_pending_cursor(&self) -> bool {
        self.cursor.is_pending()
    }

    /// Drop any scheduled cursor write (e.g. when switching notes)
    pub fn reset(&mut self) {
        self.cursor = DeferredCursor::default();
    }
}
