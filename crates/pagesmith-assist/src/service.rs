//! The content generation service boundary.

use async_trait::async_trait;
use pagesmith_blocks::Category;

use crate::content::{ContentType, GenerationContext, StyleSuggestion};

/// Errors reported by a content generation service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Content service unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to reach content service: {0}")]
    Transport(String),

    #[error("Content service failed: {0}")]
    Backend(String),

    #[error("Content service returned no text")]
    EmptyResponse,

    #[error("Generation was cancelled")]
    Cancelled,
}

/// A text-generation backend.
///
/// Implementations own their timeout and retry policy.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate text of `content_type` for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        context: &GenerationContext,
    ) -> Result<String, GenerationError>;

    /// Rewrite `content` following `instructions`.
    async fn improve(&self, content: &str, instructions: &str) -> Result<String, GenerationError>;

    /// Suggest a style for a block. Not every backend supports this.
    async fn suggest_style(
        &self,
        _category: &Category,
        _prompt: &str,
    ) -> Result<StyleSuggestion, GenerationError> {
        Err(GenerationError::Unavailable(
            "style suggestions are not supported".to_string(),
        ))
    }
}

/// The service used when nothing is configured. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

#[async_trait]
impl ContentGenerator for OfflineService {
    async fn generate(
        &self,
        _prompt: &str,
        _content_type: ContentType,
        _context: &GenerationContext,
    ) -> Result<String, GenerationError> {
        Err(offline())
    }

    async fn improve(&self, _content: &str, _instructions: &str) -> Result<String, GenerationError> {
        Err(offline())
    }
}

fn offline() -> GenerationError {
    GenerationError::Unavailable("no content service configured".to_string())
}
