//! Debounced autosave
//!
//! Each edit replaces the pending write and pushes its deadline back, so a
//! burst of typing results in one write once input has been quiet for the
//! configured delay. Time is passed in by the caller, which keeps the
//! scheduler independent of the frame loop.

use std::time::{Duration, Instant};

use super::storage::KeyValueStore;

/// Default quiet period before a write
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// Status shown in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Saving,
}

#[derive(Debug, Clone)]
struct PendingWrite {
    key: String,
    value: String,
    due: Instant,
}

/// Debounced writer for note buffers
#[derive(Debug)]
pub struct Autosave {
    delay: Duration,
    pending: Option<PendingWrite>,
    status: SaveStatus,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            status: SaveStatus::Saved,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Schedule a write, cancelling whatever was pending.
    ///
    /// A pending write for a different key is written out first so switching
    /// keys never loses an edit.
    pub fn schedule(
        &mut self,
        key: &str,
        value: &str,
        now: Instant,
        store: &mut dyn KeyValueStore,
    ) {
        if self.pending.as_ref().is_some_and(|p| p.key != key) {
            self.flush(store);
        }
        self.pending = Some(PendingWrite {
            key: key.to_string(),
            value: value.to_string(),
            due: now + self.delay,
        });
        self.status = SaveStatus::Saving;
    }

    /// Write the pending value if its quiet period has elapsed.
    /// Returns true when a write succeeded.
    pub fn poll(&mut self, now: Instant, store: &mut dyn KeyValueStore) -> bool {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.due);
        due && self.flush(store)
    }

    /// Write the pending value immediately
    pub fn flush(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match store.set(&pending.key, &pending.value) {
            Ok(()) => {
                tracing::debug!("Autosaved {}", pending.key);
                self.status = SaveStatus::Saved;
                true
            }
            Err(e) => {
                // Left in Saving: the next edit schedules the retry.
                tracing::warn!("Autosave of {} failed: {}", pending.key, e);
                false
            }
        }
    }

    /// Discard a pending write for `key` (e.g. the note was deleted)
    pub fn cancel(&mut self, key: &str) {
        if self.pending.as_ref().is_some_and(|p| p.key == key) {
            self.pending = None;
            self.status = SaveStatus::Saved;
        }
    }

    /// Time left before the pending write is due
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }
}
