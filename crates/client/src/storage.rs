//! Durable key-value storage.
//!
//! A deliberately small surface: opaque string keys and values, shared as
//! `Arc<dyn KeyValueStore>`. The session provider stores its identifier as a
//! plain string; the cart persistence adapter stores a JSON document under a
//! versioned key. `MemoryStore` backs tests and ephemeral runs,
//! `JsonFileStore` backs real installations with a single JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be read or written as JSON.
    #[error("storage encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable string-to-string storage.
///
/// Implementations must be safe to share across tasks; every method is a
/// complete, atomic operation from the caller's point of view.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for a key, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the value for a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// JsonFileStore
// =============================================================================

/// File-backed store: one JSON object, written through on every change.
///
/// The whole document lives in memory behind a mutex, so reads never touch
/// the filesystem after construction and writes serialize the full map.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading the existing document if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("k").expect("get").is_none());
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
        store.remove("k").expect("remove");
        assert!(store.get("k").expect("get").is_none());
    }

    #[test]
    fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        store.remove("missing").expect("remove");
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("gb-store-{}", std::process::id()));
        let path = dir.join("state.json");
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path).expect("open");
            store.set("session", "abc").expect("set");
            store.set("cart", "[1,2]").expect("set");
            store.remove("cart").expect("remove");
        }

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("session").expect("get").as_deref(), Some("abc"));
        assert!(reopened.get("cart").expect("get").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = std::env::temp_dir().join(format!("gb-garbage-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("state.json");
        std::fs::write(&path, "not json").expect("write");

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StorageError::Serde(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
