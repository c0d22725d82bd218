//! Static export for PageSmith pages.
//!
//! Turns the ordered blocks of a page into a self-contained bundle: an HTML
//! document, a stylesheet and a behavior script, packaged as a zip archive or
//! written to a directory.

pub mod assets;
pub mod bundle;
pub mod exporter;
pub mod templates;

pub use bundle::{ExportBundle, ExportStats, ARCHIVE_NAME, ASSETS_DIR};
pub use exporter::{ExportConfig, ExportError, Exporter, DEFAULT_FRAMEWORK_URL};
