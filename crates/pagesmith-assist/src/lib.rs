//! Content assistance for block fields.
//!
//! A [`ContentGenerator`] is the remote text-generation collaborator. The
//! [`Assistant`] wraps one and degrades to the local [`FallbackGenerator`]
//! whenever the service fails, so callers always get text back.

pub mod assistant;
pub mod command;
pub mod content;
pub mod fallback;
pub mod prompt;
pub mod service;

pub use assistant::{Assistant, ContentSource, Generated, PendingContent};
pub use command::CommandService;
pub use content::{ContentType, GenerationContext, StyleSuggestion};
pub use fallback::FallbackGenerator;
pub use prompt::CompletionRequest;
pub use service::{ContentGenerator, GenerationError, OfflineService};
