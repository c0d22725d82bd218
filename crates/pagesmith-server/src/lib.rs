//! Live preview server for PageSmith pages.
//!
//! Renders the saved page through the exporter on every request and tells
//! connected browsers to reload when the saved state or the block catalog
//! changes on disk.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{PreviewConfig, PreviewServer, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
