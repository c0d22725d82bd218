//! Static export command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use pagesmith_export::Exporter;

use crate::commands::open_page;
use crate::config::Config;

/// Run the export command.
pub fn run(
    config: &Config,
    output: Option<PathBuf>,
    dir: Option<PathBuf>,
    minify: bool,
) -> Result<()> {
    let page = open_page(config)?;

    let mut options = config.export.options.clone();
    options.minify |= minify;

    let bundle = Exporter::new(options).export_page(&page)?;
    let stats = &bundle.stats;

    if !stats.missing_templates.is_empty() {
        tracing::warn!(
            "{} blocks use templates that are no longer in the catalog",
            stats.missing_templates.len()
        );
    }

    let target = match dir {
        Some(dir) => {
            bundle
                .write_to_dir(&dir)
                .with_context(|| format!("Failed to write {}", dir.display()))?;
            dir
        }
        None => {
            let path = output.unwrap_or_else(|| config.export.output.clone());
            bundle
                .write_zip(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
    };

    tracing::info!(
        "Exported {} blocks in {}ms{}",
        stats.blocks,
        stats.duration_ms,
        if stats.has_form { " (with form handling)" } else { "" }
    );
    tracing::info!("Output: {}", target.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn exports_saved_page_to_dir_and_zip() {
        let temp = tempdir().unwrap();
        let mut config = Config::default();
        config.page.state_dir = temp.path().join("state");
        config.export.output = temp.path().join("site.zip");

        let mut page = open_page(&config).unwrap();
        let id = page.add_block("hero-simple").unwrap();
        page.update_block_content(&id, "h1", "Exported Headline").unwrap();
        page.flush().await;

        run(&config, None, None, false).unwrap();
        assert!(config.export.output.exists());

        let dir = temp.path().join("dist");
        run(&config, None, Some(dir.clone()), true).unwrap();

        let index = fs::read_to_string(dir.join("index.html")).unwrap();
        assert!(index.contains("Exported Headline"));
        assert!(dir.join("style.css").exists());
        assert!(dir.join("script.js").exists());
    }
}
