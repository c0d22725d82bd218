//! Initialize PageSmith in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::DEFAULT_CONFIG;

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing PageSmith...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let root = config_path.parent().unwrap_or_else(|| Path::new("."));
    let blocks_dir = root.join("blocks");
    fs::create_dir_all(&blocks_dir).context("Failed to create blocks directory")?;

    let example = blocks_dir.join("pricing.yaml");
    if !example.exists() || yes {
        fs::write(&example, EXAMPLE_BLOCK).context("Failed to write example block")?;
        tracing::info!("Created {}", example.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'pagesmith blocks' to see the catalog, then 'pagesmith add <template>'.");

    Ok(())
}

const EXAMPLE_BLOCK: &str = r##"# Extra blocks live here. A file holds one template or a list of them.
id: pricing-simple
name: Simple Pricing
category: content
description: One plan with a price and a call to action
markup: |
  <section class="pricing-simple py-16 px-4 text-center">
    <h2 class="text-3xl font-bold mb-4">Simple, Honest Pricing</h2>
    <p class="price text-5xl font-extrabold mb-6">$19/mo</p>
    <a href="#" class="btn-primary">Start Trial</a>
  </section>
css: |
  .pricing-simple .price { color: #2563eb; }
fields:
  - { selector: h2, kind: text, label: Title }
  - { selector: .price, kind: text, label: Price }
  - { selector: a.btn-primary, kind: text, label: Button }
"##;
