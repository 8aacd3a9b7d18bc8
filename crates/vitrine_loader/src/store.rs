use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Exports of a loaded chunk, opaque to the loader.
pub type Exports = Arc<Value>;

/// Process-wide chunk registry. Populated by loaded chunk scripts; injected
/// into the loader so tests can substitute a fresh store per test.
pub trait ChunkStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Exports>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First write wins; returns false when the key was already present.
    /// Entries live for the rest of the process, so concurrent completions
    /// for the same key reconcile to one entry.
    fn insert(&self, key: &str, exports: Exports) -> bool;
}

#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    inner: RwLock<HashMap<String, Exports>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn get(&self, key: &str) -> Option<Exports> {
        self.inner.read().unwrap().get(key).cloned()
    }

    fn insert(&self, key: &str, exports: Exports) -> bool {
        let mut inner = self.inner.write().unwrap();
        if inner.contains_key(key) {
            return false;
        }
        inner.insert(key.to_string(), exports);
        true
    }
}
