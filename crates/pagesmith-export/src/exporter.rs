//! Page exporter.
//!
//! A template's custom CSS appears in the stylesheet once, however many
//! blocks on the page use that template.

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pagesmith_blocks::{BlockInstance, BlockRegistry, Category, Rendered};
use pagesmith_page::PageStore;

use crate::assets::AssetPipeline;
use crate::bundle::{ExportBundle, ExportStats};
use crate::templates::{ShellContext, TemplateEngine};

/// Styling framework loaded by exported pages unless configured otherwise.
pub const DEFAULT_FRAMEWORK_URL: &str = "https://cdn.tailwindcss.com";

/// Configuration for exporting a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Document title
    pub title: String,

    /// Document language
    pub lang: String,

    /// Styling framework script; `None` or empty leaves it out
    pub framework_url: Option<String>,

    /// Minify the stylesheet
    pub minify: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "My Landing Page".to_string(),
            lang: "en".to_string(),
            framework_url: Some(DEFAULT_FRAMEWORK_URL.to_string()),
            minify: false,
        }
    }
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to render document: {0}")]
    TemplateError(String),

    #[error("Failed to minify stylesheet: {0}")]
    MinifyError(String),

    #[error("Failed to write output: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to build archive: {0}")]
    ArchiveError(#[from] zip::result::ZipError),
}

/// Serializes pages into export bundles.
///
/// Export only reads the blocks and the registry, so the same inputs always
/// produce the same markup and stylesheet.
pub struct Exporter {
    config: ExportConfig,
    templates: TemplateEngine,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a page using the registry it was built against.
    pub fn export_page(&self, page: &PageStore) -> Result<ExportBundle, ExportError> {
        self.export(page.registry(), page.blocks())
    }

    /// Export `blocks`, in order, against `registry`.
    ///
    /// Template CSS is emitted once per template, in first-use order.
    pub fn export(
        &self,
        registry: &BlockRegistry,
        blocks: &[BlockInstance],
    ) -> Result<ExportBundle, ExportError> {
        let start = Instant::now();
        let merger = registry.merger();

        let rendered: Vec<Rendered> = blocks.par_iter().map(|block| merger.render(block)).collect();

        let mut missing_templates = Vec::new();
        for missing in rendered.iter().filter_map(|r| r.missing.as_ref()) {
            tracing::warn!("{}", missing);
            missing_templates.push(missing.clone());
        }

        let content = rendered
            .iter()
            .map(|r| r.markup.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let document_markup = self
            .templates
            .render_page(&ShellContext {
                title: self.config.title.clone(),
                lang: self.config.lang.clone(),
                framework_url: self.config.framework_url.clone().filter(|url| !url.is_empty()),
                content,
            })
            .map_err(|e| ExportError::TemplateError(e.to_string()))?;

        let stylesheet = AssetPipeline::generate_css(block_css(registry, blocks));
        let stylesheet = if self.config.minify {
            AssetPipeline::minify_css(&stylesheet).map_err(ExportError::MinifyError)?
        } else {
            stylesheet
        };

        let has_form = blocks
            .iter()
            .filter_map(|block| registry.get(&block.template_id))
            .any(|template| *template.category() == Category::Form);
        let behavior_script = AssetPipeline::generate_js(has_form);

        let stats = ExportStats {
            blocks: blocks.len(),
            missing_templates,
            has_form,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::debug!(
            "Exported {} blocks ({} missing templates) in {}ms",
            stats.blocks,
            stats.missing_templates.len(),
            stats.duration_ms
        );

        Ok(ExportBundle {
            document_markup,
            stylesheet,
            behavior_script,
            stats,
        })
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

/// CSS fragments of the templates in use, once per template, in first-use order.
fn block_css<'a>(registry: &'a BlockRegistry, blocks: &[BlockInstance]) -> Vec<&'a str> {
    let mut seen = HashSet::new();

    blocks
        .iter()
        .filter_map(|block| registry.get(&block.template_id))
        .filter(|template| seen.insert(template.id()))
        .map(|template| template.css())
        .filter(|css| !css.trim().is_empty())
        .collect()
}
