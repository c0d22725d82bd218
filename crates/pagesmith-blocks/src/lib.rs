//! Block templates, placed block instances and content merging.
//!
//! A [`BlockRegistry`] holds the catalog of reusable page sections. Each
//! template declares which text inside its markup is editable; those fields
//! are resolved to concrete [`Slot`]s once, when the template is registered.
//! A [`BlockInstance`] is a placed occurrence of a template carrying field
//! overrides, and the [`Merger`] turns an instance back into markup.

pub mod instance;
pub mod merge;
pub mod registry;
pub mod selector;
pub mod template;

pub use instance::{BlockInstance, InstanceId};
pub use merge::{merge_content, Merger, Rendered, TemplateMissing};
pub use registry::{BlockRegistry, RegistryError};
pub use selector::{Selector, Slot};
pub use template::{BlockTemplate, Category, EditableField, FieldKind, TemplateDef, TemplateError};
