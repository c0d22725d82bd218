//! Page state for the PageSmith builder.
//!
//! A [`PageStore`] owns the ordered sequence of block instances that makes up
//! a page. Every successful mutation queues a snapshot for a background
//! [`Persister`], which writes it to a [`PersistenceStore`] without ever
//! blocking or failing the mutation itself.

pub mod file_store;
pub mod memory_store;
pub mod persister;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use persister::{FailureSink, Persister};
pub use snapshot::{PageSnapshot, SnapshotError, SNAPSHOT_VERSION};
pub use storage::{PersistenceError, PersistenceStore};
pub use store::{Direction, MoveOutcome, PageError, PageStore, DEFAULT_STATE_KEY};
