//! Placed block instances.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a block instance, unique within a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("blk-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A template placed on a page, with the user's field overrides.
///
/// The instance only records which template it came from; its position is
/// its index in the page's block sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    /// Unique identifier within the page
    pub instance_id: InstanceId,

    /// Template this block was created from
    pub template_id: String,

    /// Field selector -> override text. Missing keys use the template default.
    #[serde(default)]
    pub content: BTreeMap<String, String>,
}

impl BlockInstance {
    /// Create an instance with no overrides.
    pub fn new(instance_id: InstanceId, template_id: impl Into<String>) -> Self {
        Self {
            instance_id,
            template_id: template_id.into(),
            content: BTreeMap::new(),
        }
    }

    /// Set one field override, replacing any previous value.
    pub fn set_field(&mut self, selector: impl Into<String>, value: impl Into<String>) {
        self.content.insert(selector.into(), value.into());
    }

    /// Current override for a field, if any.
    pub fn field(&self, selector: &str) -> Option<&str> {
        self.content.get(selector).map(String::as_str)
    }

    /// Builder-style override, mostly useful in tests and fixtures.
    pub fn with_field(mut self, selector: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(selector, value);
        self
    }
}
