//! CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use pagesmith_page::{FileStore, PageStore, Persister};

use crate::config::Config;

pub mod assist;
pub mod blocks;
pub mod dev;
pub mod export;
pub mod init;
pub mod page;
pub mod serve;

/// Open the saved page with background persistence.
///
/// Callers that mutate the page must `flush` it before returning.
pub fn open_page(config: &Config) -> Result<PageStore> {
    let registry = Arc::new(config.registry());
    let store = Arc::new(FileStore::new(&config.page.state_dir));
    let persister = Persister::spawn(store, config.page.state_key.as_str())
        .context("Failed to start page persistence")?;

    Ok(PageStore::open(registry, persister))
}
