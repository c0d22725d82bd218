//! File watching for live reload.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that ends a burst of file system events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchEvent {
    /// A saved page snapshot was written or removed
    StateChanged(PathBuf),

    /// A block catalog file changed
    CatalogChanged(PathBuf),
}

/// Watches the state and catalog directories.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths. Paths that do not exist
    /// are skipped.
    ///
    /// Returns the watcher and a channel to receive events. Each burst of
    /// changes is reported once, after it settles.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                let mut pending = BTreeSet::new();
                collect(&event, &mut pending);

                // Keep absorbing until the burst goes quiet.
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    collect(&event, &mut pending);
                }

                for watch_event in pending {
                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn collect(event: &notify::Event, pending: &mut BTreeSet<WatchEvent>) {
    for path in &event.paths {
        if let Some(watch_event) = classify_event(path, &event.kind) {
            pending.insert(watch_event);
        }
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    // Temporary files written before an atomic rename
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    if hidden {
        return None;
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(WatchEvent::StateChanged(path.to_path_buf())),
        Some("yaml") | Some("yml") => Some(WatchEvent::CatalogChanged(path.to_path_buf())),
        _ => None,
    }
}
