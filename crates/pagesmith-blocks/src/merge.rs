//! Content merging: template markup + instance overrides -> final markup.

use std::collections::BTreeMap;

use crate::instance::{BlockInstance, InstanceId};
use crate::registry::BlockRegistry;
use crate::template::BlockTemplate;

/// Markup produced for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Final markup for the block
    pub markup: String,

    /// Set when the instance's template was not in the registry and a
    /// placeholder was rendered instead
    pub missing: Option<TemplateMissing>,
}

/// An instance referenced a template the registry does not know.
///
/// This is never fatal: page state can outlive catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Template '{template_id}' not found for block {instance_id}")]
pub struct TemplateMissing {
    pub instance_id: InstanceId,
    pub template_id: String,
}

/// Renders block instances against a registry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Merger<'r> {
    registry: &'r BlockRegistry,
}

impl<'r> Merger<'r> {
    pub fn new(registry: &'r BlockRegistry) -> Self {
        Self { registry }
    }

    /// Render one instance. Never fails; a missing template yields a placeholder.
    pub fn render(&self, instance: &BlockInstance) -> Rendered {
        match self.registry.get(&instance.template_id) {
            Some(template) => Rendered {
                markup: merge_content(template, &instance.content),
                missing: None,
            },
            None => Rendered {
                markup: placeholder(&instance.template_id),
                missing: Some(TemplateMissing {
                    instance_id: instance.instance_id.clone(),
                    template_id: instance.template_id.clone(),
                }),
            },
        }
    }
}

/// Substitute `content` overrides into the template's markup.
///
/// Each declared field replaces exactly its resolved slot. Keys that are not
/// declared fields of the template are ignored. Values are plain text and
/// are HTML-escaped on the way in.
pub fn merge_content(template: &BlockTemplate, content: &BTreeMap<String, String>) -> String {
    let markup = template.markup();

    let mut edits: Vec<_> = content
        .iter()
        .filter_map(|(key, value)| match template.field(key) {
            Some(field) => Some((field.slot().range.clone(), value)),
            None => {
                tracing::debug!(
                    "Ignoring unknown field '{}' for template '{}'",
                    key,
                    template.id()
                );
                None
            }
        })
        .collect();

    if edits.is_empty() {
        return markup.to_string();
    }

    // Apply from the back so earlier offsets stay valid.
    edits.sort_by(|(a, _), (b, _)| b.start.cmp(&a.start));

    let mut output = markup.to_string();
    for (range, value) in edits {
        output.replace_range(range, &html_escape::encode_text(value));
    }

    output
}

/// Placeholder for an instance whose template is gone.
fn placeholder(template_id: &str) -> String {
    let id = html_escape::encode_double_quoted_attribute(template_id);
    format!(
        "<!-- pagesmith: missing block template \"{id}\" -->\n<section class=\"pagesmith-missing\" data-template=\"{id}\"></section>"
    )
}
