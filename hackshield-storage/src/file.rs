//! File-backed key-value store.
//!
//! Keeps entries in memory and writes the whole map through to a JSON file on
//! every change. The in-memory copy only changes once the file write succeeds.
//! Suitable for the handful of keys an installation persists.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use hackshield_core::error::{HackshieldError, Result};
use hackshield_core::traits::KeyValueStore;

use crate::MemoryStore;

/// Persistent key-value store backed by a JSON object file.
///
/// # File Format
///
/// ```text
/// { "web_device_id": "a1b2c3d4e5", ... }
/// ```
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    /// Serializes write-through so concurrent setters never interleave files
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, loading it if it exists.
    ///
    /// Parent directories are created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let memory = MemoryStore::new();

        if path.exists() {
            let contents = fs::read(&path)?;
            if !contents.is_empty() {
                let entries: HashMap<String, String> = serde_json::from_slice(&contents)
                    .map_err(|e| HackshieldError::Storage(format!("corrupt store {}: {}", path.display(), e)))?;
                debug!(count = entries.len(), "Loaded key-value store");
                memory.replace_all(entries);
            }
        }

        Ok(Self {
            path,
            memory,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the entries, writes it, then publishes it.
    fn update(&self, change: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.memory.entries();
        change(&mut entries);
        self.persist(&entries)?;
        self.memory.replace_all(entries);
        Ok(())
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write atomically (write to temp, then rename)
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.memory.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("web_device_id", "a1b2c3d4e5").unwrap();
            store.set("other", "x").unwrap();
            store.remove("other").unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("web_device_id").unwrap().as_deref(), Some("a1b2c3d4e5"));
        assert!(store.get("other").unwrap().is_none());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("kept", "1").unwrap();

        // A regular file where the parent directory should be fails even as root.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let blocked = FileStore::open(blocker.join("store.json")).unwrap();
        assert!(blocked.set("web_device_id", "a1b2c3d4e5").is_err());
        assert!(blocked.get("web_device_id").unwrap().is_none());

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(store.remove("kept").is_err());
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"not json").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(HackshieldError::Storage(_))));
    }
}
