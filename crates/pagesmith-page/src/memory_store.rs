//! In-memory persistence store.
//!
//! Intended for tests and for sessions that should not outlive the process.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::{PersistenceError, PersistenceResult, PersistenceStore};

/// Thread-safe in-memory key -> blob map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> PersistenceError {
    PersistenceError::Backend("memory store lock poisoned".to_string())
}

impl PersistenceStore for MemoryStore {
    fn save(&self, key: &str, blob: &[u8]) -> PersistenceResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.get(key).cloned())
    }

    fn clear(&self, key: &str) -> PersistenceResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.load("page").unwrap(), None);

        store.save("page", b"one").unwrap();
        store.save("page", b"two").unwrap();
        assert_eq!(store.load("page").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);

        store.clear("page").unwrap();
        store.clear("page").unwrap();
        assert!(store.is_empty());
    }
}
