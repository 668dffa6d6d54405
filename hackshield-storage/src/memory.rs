//! In-memory key-value store.

use std::collections::HashMap;

use parking_lot::RwLock;

use hackshield_core::error::Result;
use hackshield_core::traits::KeyValueStore;

/// Volatile key-value store.
///
/// Thread-safe; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all entries.
    pub fn entries(&self) -> HashMap<String, String> {
        self.entries.read().clone()
    }

    pub(crate) fn replace_all(&self, entries: HashMap<String, String>) {
        *self.entries.write() = entries;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
