//! Block template definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selector::{resolve_slot, Selector, Slot};

/// Block category used to group and filter the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Hero,
    Content,
    Form,
    Cta,
    Footer,
    /// Any category not known to this crate
    Other(String),
}

impl Category {
    /// Category tag as written in catalogs.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Hero => "hero",
            Category::Content => "content",
            Category::Form => "form",
            Category::Cta => "cta",
            Category::Footer => "footer",
            Category::Other(tag) => tag,
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "hero" => Category::Hero,
            "content" => Category::Content,
            "form" => Category::Form,
            "cta" => Category::Cta,
            "footer" => Category::Footer,
            _ => Category::Other(tag),
        }
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Category::from(tag.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an editable field is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Single line of text
    #[serde(rename = "text")]
    Text,
    /// Free-form text spanning several lines
    #[serde(rename = "multilineText", alias = "textarea")]
    MultilineText,
}

/// A field as declared in a catalog, before slot resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Element selector the field binds to
    pub selector: String,

    /// Presentation kind
    #[serde(alias = "type")]
    pub kind: FieldKind,

    /// Label shown in editors
    pub label: String,
}

/// A block template as written in a YAML catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Stable identifier, unique within a registry
    pub id: String,

    /// Human readable name
    #[serde(default)]
    pub name: String,

    /// Catalog category
    pub category: Category,

    /// Short description for catalog listings
    #[serde(default)]
    pub description: String,

    /// Raw HTML fragment
    #[serde(alias = "html")]
    pub markup: String,

    /// Small fragment for catalog display
    #[serde(default, alias = "previewHtml")]
    pub preview: String,

    /// Custom style rules emitted once per exported page using this block
    #[serde(default)]
    pub css: String,

    /// Editable fields in declaration order
    #[serde(default, alias = "editableFields")]
    pub fields: Vec<FieldDef>,
}

/// An editable field bound to its slot in the template markup.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableField {
    selector: Selector,
    key: String,
    kind: FieldKind,
    label: String,
    slot: Slot,
}

impl EditableField {
    /// Selector as declared, used as the content key on instances.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parsed selector.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolved slot within the template markup.
    pub fn slot(&self) -> &Slot {
        &self.slot
    }
}

/// An immutable, validated block template.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    id: String,
    name: String,
    category: Category,
    description: String,
    markup: String,
    preview: String,
    css: String,
    fields: Vec<EditableField>,
}

impl BlockTemplate {
    /// Validate a definition and resolve every field to its slot.
    pub fn from_def(def: TemplateDef) -> Result<Self, TemplateError> {
        if def.id.trim().is_empty() {
            return Err(TemplateError::MissingId);
        }

        let mut fields: Vec<EditableField> = Vec::with_capacity(def.fields.len());

        for field in def.fields {
            if fields.iter().any(|f| f.key == field.selector) {
                return Err(TemplateError::DuplicateField(field.selector));
            }

            let selector = Selector::parse(&field.selector)?;
            let slot = resolve_slot(&def.markup, &selector)?
                .ok_or_else(|| TemplateError::UnboundField(field.selector.clone()))?;

            if slot.matches > 1 {
                tracing::debug!(
                    "Field '{}' of template '{}' matches {} elements; only the first is editable",
                    field.selector,
                    def.id,
                    slot.matches
                );
            }

            fields.push(EditableField {
                selector,
                key: field.selector,
                kind: field.kind,
                label: field.label,
                slot,
            });
        }

        // Slots must not overlap or the merge would rewrite one field's text with another's.
        let mut ranges: Vec<_> = fields.iter().map(|f| (f.slot.range.clone(), f.key())).collect();
        ranges.sort_by_key(|(range, _)| (range.start, range.end));
        for pair in ranges.windows(2) {
            let ((a, a_key), (b, b_key)) = (&pair[0], &pair[1]);
            if a.start == b.start || a.end > b.start {
                return Err(TemplateError::SharedSlot {
                    first: a_key.to_string(),
                    second: b_key.to_string(),
                });
            }
        }

        let name = if def.name.is_empty() {
            def.id.clone()
        } else {
            def.name
        };

        Ok(Self {
            id: def.id,
            name,
            category: def.category,
            description: def.description,
            markup: def.markup,
            preview: def.preview,
            css: def.css,
            fields,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Default markup, exactly as declared.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Custom CSS fragment; empty when the template has none.
    pub fn css(&self) -> &str {
        &self.css
    }

    /// Editable fields in declaration order.
    pub fn fields(&self) -> &[EditableField] {
        &self.fields
    }

    /// Look up a field by its selector key.
    pub fn field(&self, key: &str) -> Option<&EditableField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Default text of a field.
    pub fn default_text(&self, key: &str) -> Option<&str> {
        self.field(key).map(|f| f.slot.default_text(&self.markup))
    }
}

/// Errors raised while validating a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("Template is missing an id")]
    MissingId,

    #[error("Invalid selector: '{0}'")]
    InvalidSelector(String),

    #[error("Selector '{0}' does not match any element in the markup")]
    UnboundField(String),

    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("Selector '{selector}' matches <{tag}>, which can not hold text")]
    VoidElement { selector: String, tag: String },

    #[error("Selector '{selector}' matches a <{tag}> that is never closed")]
    UnclosedElement { selector: String, tag: String },

    #[error("Fields '{first}' and '{second}' resolve to the same text")]
    SharedSlot { first: String, second: String },
}
