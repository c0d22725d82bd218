//! Block template registry.
//!
//! Holds the catalog in registration order, validates every template on the
//! way in and provides lookup by template id. Components receive the
//! registry explicitly; there is no global catalog.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::merge::Merger;
use crate::template::{BlockTemplate, Category, TemplateDef, TemplateError};

/// Catalog shipped with the crate.
const DEFAULT_CATALOG: &str = include_str!("catalog/default.yaml");

/// A read-only catalog of block templates.
#[derive(Debug, Default, Clone)]
pub struct BlockRegistry {
    /// Templates in registration order
    templates: Vec<BlockTemplate>,

    /// Template id -> index into `templates`
    index: HashMap<String, usize>,
}

impl BlockRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in catalog.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .load_yaml(DEFAULT_CATALOG)
            .expect("Built-in block catalog is invalid");
        registry
    }

    /// Built-in catalog plus any templates found in `dir`.
    ///
    /// A missing directory or unusable files only produce log output.
    pub fn with_catalog_dir(dir: &Path) -> Self {
        let mut registry = Self::with_defaults();

        if dir.exists() {
            match registry.scan(dir) {
                Ok(count) => {
                    tracing::info!("Loaded {} block templates from {}", count, dir.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to scan block directory: {}", e);
                }
            }
        }

        registry
    }

    /// Parse a YAML catalog (one template or a list) and register every template in it.
    ///
    /// Nothing is registered if any template in the catalog is invalid.
    pub fn load_yaml(&mut self, source: &str) -> Result<usize, RegistryError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| RegistryError::Yaml(e.to_string()))?;

        let defs: Vec<TemplateDef> = if value.is_sequence() {
            serde_yaml::from_value(value)
        } else {
            serde_yaml::from_value(value).map(|def| vec![def])
        }
        .map_err(|e| RegistryError::Yaml(e.to_string()))?;

        let mut staged = self.clone();
        for def in &defs {
            staged.register(def.clone())?;
        }

        *self = staged;
        Ok(defs.len())
    }

    /// Create a registry from a YAML catalog.
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.load_yaml(source)?;
        Ok(registry)
    }

    /// Scan a directory for `*.yaml` / `*.yml` catalogs and register their templates.
    ///
    /// Files that fail to parse or validate are skipped with a warning.
    pub fn scan(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        if !dir.exists() {
            return Err(RegistryError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut paths: Vec<_> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| {
                p.is_file()
                    && matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
            })
            .collect();

        // Registration order decides catalog order; keep it independent of the file system.
        paths.sort();

        let mut count = 0;
        for path in paths {
            let source = match fs::read_to_string(&path) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };

            match self.load_yaml(&source) {
                Ok(n) => count += n,
                Err(e) => tracing::warn!("Skipping block catalog {}: {}", path.display(), e),
            }
        }

        Ok(count)
    }

    /// Validate and add one template.
    pub fn register(&mut self, def: TemplateDef) -> Result<(), RegistryError> {
        if self.index.contains_key(&def.id) {
            return Err(RegistryError::DuplicateTemplate(def.id));
        }

        let id = def.id.clone();
        let template = BlockTemplate::from_def(def)
            .map_err(|source| RegistryError::InvalidTemplate { id: id.clone(), source })?;

        self.index.insert(id, self.templates.len());
        self.templates.push(template);
        Ok(())
    }

    /// All templates in catalog order.
    pub fn templates(&self) -> &[BlockTemplate] {
        &self.templates
    }

    /// Templates in one category, in catalog order.
    pub fn templates_in<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a BlockTemplate> + 'a {
        self.templates
            .iter()
            .filter(move |t| t.category() == category)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen: Vec<&Category> = Vec::new();
        for template in &self.templates {
            if !seen.contains(&template.category()) {
                seen.push(template.category());
            }
        }
        seen
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&BlockTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    /// Look up a template by id, failing with [`RegistryError::TemplateNotFound`].
    pub fn template(&self, id: &str) -> Result<&BlockTemplate, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::TemplateNotFound(id.to_string()))
    }

    /// Check if a template exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Content merger bound to this registry.
    pub fn merger(&self) -> Merger<'_> {
        Merger::new(self)
    }
}

/// Errors that can occur with the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Block template not found: {0}")]
    TemplateNotFound(String),

    #[error("Block template registered twice: {0}")]
    DuplicateTemplate(String),

    #[error("Invalid block template '{id}': {source}")]
    InvalidTemplate {
        id: String,
        #[source]
        source: TemplateError,
    },

    #[error("Invalid block catalog: {0}")]
    Yaml(String),

    #[error("Block directory not found: {0}")]
    DirectoryNotFound(String),
}
