//! Background snapshot writer.
//!
//! Mutations hand encoded snapshots to a [`Persister`], which forwards them
//! over a channel to a Tokio task that performs the actual writes. Queueing
//! never blocks, writes happen in the order they were queued, and a burst of
//! saves collapses to the newest one. Failures go to a [`FailureSink`] and
//! are never reported back to the mutating caller.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::storage::{PersistenceError, PersistenceStore};

/// Receives persistence failures. The default sink logs them.
pub type FailureSink = Arc<dyn Fn(&PersistenceError) + Send + Sync>;

enum Command {
    Save(Vec<u8>),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Handle to the background persistence task.
pub struct Persister {
    key: String,
    store: Arc<dyn PersistenceStore>,
    sender: mpsc::UnboundedSender<Command>,
    sink: FailureSink,
}

impl fmt::Debug for Persister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persister").field("key", &self.key).finish()
    }
}

fn log_failure() -> FailureSink {
    Arc::new(|err: &PersistenceError| {
        tracing::warn!("Failed to persist page state: {}", err);
    })
}

impl Persister {
    /// Start the background writer on the current Tokio runtime.
    pub fn spawn(
        store: Arc<dyn PersistenceStore>,
        key: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        Self::spawn_with_sink(store, key, log_failure())
    }

    /// Start the background writer, reporting failures to `sink`.
    pub fn spawn_with_sink(
        store: Arc<dyn PersistenceStore>,
        key: impl Into<String>,
        sink: FailureSink,
    ) -> Result<Self, PersistenceError> {
        let handle = Handle::try_current().map_err(|_| PersistenceError::NoRuntime)?;
        let key = key.into();
        let (sender, receiver) = mpsc::unbounded_channel();

        handle.spawn(run(
            Arc::clone(&store),
            key.clone(),
            receiver,
            Arc::clone(&sink),
        ));

        Ok(Self {
            key,
            store,
            sender,
            sink,
        })
    }

    /// Key this persister writes under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the currently stored blob directly from the backend.
    pub fn load(&self) -> Result<Option<Vec<u8>>, PersistenceError> {
        self.store.load(&self.key)
    }

    /// Queue a snapshot for writing. Returns immediately.
    pub fn save(&self, blob: Vec<u8>) {
        self.send(Command::Save(blob));
    }

    /// Queue removal of the stored snapshot. Returns immediately.
    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    /// Report a failure through this persister's sink.
    pub fn report(&self, err: &PersistenceError) {
        (self.sink)(err);
    }

    /// Wait until everything queued so far has been written (or has failed).
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Flush(ack)).is_err() {
            self.report(&PersistenceError::Closed);
            return;
        }
        let _ = done.await;
    }

    fn send(&self, command: Command) {
        if self.sender.send(command).is_err() {
            self.report(&PersistenceError::Closed);
        }
    }
}

async fn run(
    store: Arc<dyn PersistenceStore>,
    key: String,
    mut receiver: mpsc::UnboundedReceiver<Command>,
    sink: FailureSink,
) {
    let mut pending: Option<Command> = None;

    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match receiver.recv().await {
                Some(command) => command,
                None => break,
            },
        };

        match command {
            Command::Save(mut blob) => {
                // Only the newest queued snapshot matters.
                while let Ok(next) = receiver.try_recv() {
                    match next {
                        Command::Save(newer) => blob = newer,
                        other => {
                            pending = Some(other);
                            break;
                        }
                    }
                }

                let store = Arc::clone(&store);
                let key = key.clone();
                let result = tokio::task::spawn_blocking(move || store.save(&key, &blob)).await;
                report(&sink, result);
            }
            Command::Clear => {
                let store = Arc::clone(&store);
                let key = key.clone();
                let result = tokio::task::spawn_blocking(move || store.clear(&key)).await;
                report(&sink, result);
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }

    tracing::debug!("Persistence worker for '{}' stopped", key);
}

fn report(
    sink: &FailureSink,
    result: Result<Result<(), PersistenceError>, tokio::task::JoinError>,
) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(err)) => sink(&err),
        Err(join) => sink(&PersistenceError::Backend(join.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use crate::storage::PersistenceResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every write so ordering can be checked.
    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<Vec<u8>>>,
    }

    impl PersistenceStore for RecordingStore {
        fn save(&self, _key: &str, blob: &[u8]) -> PersistenceResult<()> {
            self.writes.lock().unwrap().push(blob.to_vec());
            Ok(())
        }

        fn load(&self, _key: &str) -> PersistenceResult<Option<Vec<u8>>> {
            Ok(self.writes.lock().unwrap().last().cloned())
        }

        fn clear(&self, _key: &str) -> PersistenceResult<()> {
            self.writes.lock().unwrap().clear();
            Ok(())
        }
    }

    struct BrokenStore;

    impl PersistenceStore for BrokenStore {
        fn save(&self, _key: &str, _blob: &[u8]) -> PersistenceResult<()> {
            Err(PersistenceError::Io("disk full".to_string()))
        }

        fn load(&self, _key: &str) -> PersistenceResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn clear(&self, _key: &str) -> PersistenceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let result = Persister::spawn(Arc::new(MemoryStore::new()), "page");
        assert!(matches!(result, Err(PersistenceError::NoRuntime)));
    }

    #[tokio::test]
    async fn flush_waits_for_queued_writes() {
        let store = Arc::new(MemoryStore::new());
        let persister = Persister::spawn(store.clone(), "page").unwrap();

        persister.save(b"one".to_vec());
        persister.save(b"two".to_vec());
        persister.flush().await;

        assert_eq!(store.load("page").unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn newest_snapshot_is_written_last() {
        let store = Arc::new(RecordingStore::default());
        let persister = Persister::spawn(store.clone(), "page").unwrap();

        for i in 0..50u8 {
            persister.save(vec![i]);
        }
        persister.flush().await;

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.last(), Some(&vec![49]));
        assert!(writes.windows(2).all(|w| w[0][0] < w[1][0]));
    }

    #[tokio::test]
    async fn clear_is_ordered_after_saves() {
        let store = Arc::new(MemoryStore::new());
        let persister = Persister::spawn(store.clone(), "page").unwrap();

        persister.save(b"state".to_vec());
        persister.clear();
        persister.flush().await;

        assert_eq!(store.load("page").unwrap(), None);
    }

    #[tokio::test]
    async fn failures_go_to_the_sink() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        let sink: FailureSink = Arc::new(move |_err: &PersistenceError| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let persister = Persister::spawn_with_sink(Arc::new(BrokenStore), "page", sink).unwrap();
        persister.save(b"state".to_vec());
        persister.flush().await;

        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }
}
