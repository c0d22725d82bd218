//! Project configuration (pagesmith.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use pagesmith_assist::{Assistant, CommandService};
use pagesmith_blocks::BlockRegistry;
use pagesmith_export::{ExportConfig, ARCHIVE_NAME};
use pagesmith_page::DEFAULT_STATE_KEY;
use pagesmith_server::PreviewConfig;

/// Configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page: PageSettings,
    pub blocks: BlocksSettings,
    pub export: ExportSettings,
    pub server: ServerSettings,
    pub assist: AssistSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Directory the page state is saved in
    pub state_dir: PathBuf,
    pub state_key: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".pagesmith"),
            state_key: DEFAULT_STATE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlocksSettings {
    /// Directory of extra YAML block templates
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Archive written by `pagesmith export`
    pub output: PathBuf,

    #[serde(flatten)]
    pub options: ExportConfig,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(ARCHIVE_NAME),
            options: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub host: String,
    pub open: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    /// Program and arguments of an external content command
    pub command: Vec<String>,
}

impl Config {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Built-in blocks plus the configured block directory.
    pub fn registry(&self) -> BlockRegistry {
        match &self.blocks.dir {
            Some(dir) => BlockRegistry::with_catalog_dir(dir),
            None => BlockRegistry::with_defaults(),
        }
    }

    /// Content assistant backed by the configured command, if any.
    pub fn assistant(&self) -> Assistant {
        match CommandService::from_argv(&self.assist.command) {
            Some(service) => Assistant::new(Arc::new(service)),
            None => Assistant::offline(),
        }
    }

    pub fn preview(&self) -> PreviewConfig {
        PreviewConfig {
            state_dir: self.page.state_dir.clone(),
            state_key: self.page.state_key.clone(),
            blocks_dir: self.blocks.dir.clone(),
            export: self.export.options.clone(),
            port: self.server.port,
            host: self.server.host.clone(),
            open: self.server.open,
        }
    }
}

pub const DEFAULT_CONFIG: &str = r#"# PageSmith Configuration

[page]
# Directory the page state is saved in
state_dir = ".pagesmith"

[blocks]
# Directory with extra block templates (*.yaml)
dir = "blocks"

[export]
# Archive written by `pagesmith export`
output = "my-landing-page.zip"

# Document title and language
title = "My Landing Page"
lang = "en"

# Styling framework script; set to "" to leave it out
framework_url = "https://cdn.tailwindcss.com"

# Minify the stylesheet
minify = false

[server]
port = 7777
open = true

[assist]
# External command that writes generated copy to stdout.
# It receives the request as JSON on stdin. Leave empty to work offline.
command = []
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/definitely/not/pagesmith.toml")).unwrap();

        assert_eq!(config.page.state_key, DEFAULT_STATE_KEY);
        assert_eq!(config.export.output, PathBuf::from(ARCHIVE_NAME));
        assert_eq!(config.export.options, ExportConfig::default());
        assert_eq!(config.server.port, 7777);
        assert!(config.assist.command.is_empty());
    }

    #[test]
    fn default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();

        assert_eq!(config.blocks.dir, Some(PathBuf::from("blocks")));
        assert_eq!(config.export.options.title, "My Landing Page");
        assert!(!config.export.options.minify);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pagesmith.toml");
        fs::write(
            &path,
            "[export]\ntitle = \"Launch\"\nminify = true\n\n[assist]\ncommand = [\"llm\", \"--quiet\"]\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.export.options.title, "Launch");
        assert!(config.export.options.minify);
        assert_eq!(config.export.options.lang, "en");
        assert_eq!(config.export.output, PathBuf::from(ARCHIVE_NAME));
        assert_eq!(config.assist.command, ["llm", "--quiet"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pagesmith.toml");
        fs::write(&path, "[export\ntitle = ").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn preview_uses_page_and_server_settings() {
        let mut config = Config::default();
        config.server.port = 9000;
        config.page.state_dir = PathBuf::from("state");

        let preview = config.preview();

        assert_eq!(preview.port, 9000);
        assert_eq!(preview.state_dir, PathBuf::from("state"));
        assert_eq!(preview.state_key, DEFAULT_STATE_KEY);
    }
}
