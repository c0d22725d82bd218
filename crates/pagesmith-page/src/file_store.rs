//! File-backed persistence store.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! first and are renamed into place, so a crash mid-write leaves the previous
//! snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::{PersistenceError, PersistenceResult, PersistenceStore};

/// Stores blobs as files in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path used for `key`.
    pub fn path_for(&self, key: &str) -> PersistenceResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(PersistenceError::Backend(format!("invalid key: {key:?}")));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl PersistenceStore for FileStore {
    fn save(&self, key: &str, blob: &[u8]) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("Saved {} bytes to {}", blob.len(), path.display());
        Ok(())
    }

    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self, key: &str) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path().join("state"));

        assert_eq!(store.load("page").unwrap(), None);

        store.save("page", b"{}").unwrap();
        assert!(temp.path().join("state/page.json").exists());
        assert_eq!(store.load("page").unwrap(), Some(b"{}".to_vec()));

        store.clear("page").unwrap();
        assert_eq!(store.load("page").unwrap(), None);
        store.clear("page").unwrap();
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let store = FileStore::new("state");

        for key in ["", "../page", "a/b", ".hidden"] {
            assert!(store.path_for(key).is_err(), "accepted {key:?}");
        }
        assert!(store.path_for("pagesmith_canvas_state").is_ok());
    }
}
