//! Persistence store abstraction.
//!
//! A persistence store maps string keys to opaque blobs. The page store
//! never interprets a blob here; decoding (and tolerating garbage) happens
//! in [`crate::snapshot`].

use thiserror::Error;

/// Errors that can occur while saving, loading or clearing blobs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// I/O error from the backing medium
    #[error("I/O error: {0}")]
    Io(String),

    /// The snapshot could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Background persistence needs a Tokio runtime
    #[error("No async runtime available for background persistence")]
    NoRuntime,

    /// The background writer has shut down
    #[error("Persistence worker is no longer running")]
    Closed,

    /// Backend specific failure
    #[error("Persistence backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key -> blob storage backend.
///
/// Methods take `&self`; implementations use interior mutability and must be
/// shareable across threads since writes run on a background task.
pub trait PersistenceStore: Send + Sync {
    /// Store `blob` under `key`, replacing any previous value.
    fn save(&self, key: &str, blob: &[u8]) -> PersistenceResult<()>;

    /// Fetch the blob stored under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>>;

    /// Remove the blob stored under `key`. Clearing a missing key is not an error.
    fn clear(&self, key: &str) -> PersistenceResult<()>;
}
