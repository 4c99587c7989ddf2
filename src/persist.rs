//! Durable blob persistence.
//!
//! The template collection persists as one string blob under one key.
//! `BlobStore` is the boundary: the file-backed implementation keeps one
//! file per key under the data directory with atomic temp-file + rename
//! writes; the in-memory implementation backs tests and storage-less
//! contexts. Absent or unreadable blobs are reported as absent, never as
//! errors.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use parking_lot::RwLock;

/// Key/value blob persistence boundary.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrite the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` file per key under a data directory.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default store directory: `~/.sheetwiz/store`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sheetwiz")
            .join("store")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("[persist] Failed to read blob '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create store directory: {}", self.dir.display())
        })?;

        // Atomic write: write to temp file, then rename
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write blob '{key}'"))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move blob '{key}' into place"))?;

        tracing::debug!("[persist] Wrote {} bytes under '{}'", value.len(), key);
        Ok(())
    }
}

/// In-memory store for tests and contexts without durable storage.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Option<String> {
        self.blobs.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.blobs.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp.path().to_path_buf());

        assert_eq!(store.get("missing"), None);

        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting"), Some("hello".to_string()));

        store.set("greeting", "replaced").unwrap();
        assert_eq!(store.get("greeting"), Some("replaced".to_string()));
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("deep").join("store");
        let store = FileBlobStore::new(nested.clone());

        store.set("key", "value").unwrap();
        assert!(nested.join("key.json").exists());
    }

    #[test]
    fn file_store_leaves_no_temp_file_behind() {
        let temp = TempDir::new().unwrap();
        let store = FileBlobStore::new(temp.path().to_path_buf());

        store.set("key", "value").unwrap();
        assert!(!temp.path().join("key.json.tmp").exists());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
    }
}
