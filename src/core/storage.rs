//! Local key-value storage
//!
//! Notes and their buffers live in a single JSON object on disk, addressed by
//! string keys. Callers treat the store as best effort: failures are logged
//! and the in-memory state remains authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use thiserror::Error;

/// Key holding the serialized note list
pub const NOTES_KEY: &str = "smart-editor:notes";

/// Namespace prefix for per-note buffers
pub const CONTENT_NAMESPACE: &str = "smart-editor:content:";

/// Storage key for a note's buffer
pub fn content_key(note_id: &str) -> String {
    format!("{}{}", CONTENT_NAMESPACE, note_id)
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to write storage file: {0}")]
    Write(String),
}

/// Minimal key-value interface over persistent storage
pub trait KeyValueStore {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Store backed by a JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Default storage file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "slatepad", "Slatepad")
            .map(|dirs| dirs.data_dir().join("storage.json"))
    }

    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring unreadable storage {}: {:#}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    fn read_entries(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("Malformed storage file {}", path.display()))?;
        Ok(entries)
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
            .map_err(|e| StorageError::Write(format!("{:#}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()
                .map_err(|e| StorageError::Write(format!("{:#}", e)))?;
        }
        Ok(())
    }
}

/// In-memory store, also used when no data directory is available
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    /// Reject writes, as a full or disabled storage would
    pub read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_namespaced() {
        assert_eq!(content_key("note-3"), "smart-editor:content:note-3");
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("a"), None);
        store.set("a", "one").unwrap();
        store.set("b", "two").unwrap();
        store.remove("b").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("a"), Some("one".to_string()));
        assert_eq!(reopened.get("b"), None);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("a"), None);
        store.set("a", "fresh").unwrap();
        assert_eq!(FileStore::open(&path).get("a"), Some("fresh".to_string()));
    }

    #[test]
    fn test_read_only_memory_store_rejects_writes() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.read_only = true;
        assert!(matches!(store.set("k", "w"), Err(StorageError::Unavailable)));
        assert_eq!(store.get("k"), Some("v".to_string()));
    }
}
