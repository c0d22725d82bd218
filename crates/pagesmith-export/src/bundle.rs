//! Export bundle and its on-disk/archive forms.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use pagesmith_blocks::TemplateMissing;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::exporter::ExportError;

/// Default file name for a downloaded archive.
pub const ARCHIVE_NAME: &str = "my-landing-page.zip";

/// Directory reserved for user assets. Always exported empty.
pub const ASSETS_DIR: &str = "assets";

const DOCUMENT_FILE: &str = "index.html";
const STYLESHEET_FILE: &str = "style.css";
const SCRIPT_FILE: &str = "script.js";

/// Summary of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStats {
    /// Number of blocks exported
    pub blocks: usize,

    /// Blocks rendered as placeholders because their template is unknown
    pub missing_templates: Vec<TemplateMissing>,

    /// Whether form handling was included in the script
    pub has_form: bool,

    /// Export time in milliseconds
    pub duration_ms: u64,
}

/// A self-contained static page.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Contents of `index.html`
    pub document_markup: String,

    /// Contents of `style.css`
    pub stylesheet: String,

    /// Contents of `script.js`
    pub behavior_script: String,

    pub stats: ExportStats,
}

impl ExportBundle {
    /// Package the bundle as a zip archive.
    ///
    /// Entries carry a fixed timestamp, so equal bundles give byte-identical
    /// archives.
    pub fn to_zip(&self) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        for (name, contents) in self.files() {
            zip.start_file(name, options)?;
            zip.write_all(contents.as_bytes())?;
        }
        zip.add_directory(format!("{ASSETS_DIR}/"), options)?;

        Ok(zip.finish()?.into_inner())
    }

    /// Write the archive to `path`.
    pub fn write_zip(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_zip()?)?;
        tracing::info!("Wrote {}", path.display());
        Ok(())
    }

    /// Write the bundle files into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), ExportError> {
        fs::create_dir_all(dir.join(ASSETS_DIR))?;

        for (name, contents) in self.files() {
            fs::write(dir.join(name), contents)?;
        }

        tracing::info!("Wrote site to {}", dir.display());
        Ok(())
    }

    fn files(&self) -> [(&'static str, &str); 3] {
        [
            (DOCUMENT_FILE, self.document_markup.as_str()),
            (STYLESHEET_FILE, self.stylesheet.as_str()),
            (SCRIPT_FILE, self.behavior_script.as_str()),
        ]
    }
}
