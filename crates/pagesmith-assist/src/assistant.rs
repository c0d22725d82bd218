//! Service-with-fallback wrapper and cancellable requests.

use std::sync::Arc;

use pagesmith_blocks::Category;
use tokio::sync::oneshot;

use crate::content::{ContentType, GenerationContext, StyleSuggestion};
use crate::fallback::FallbackGenerator;
use crate::service::{ContentGenerator, GenerationError, OfflineService};

/// Which generator produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Service,
    Fallback,
}

/// Text returned by the [`Assistant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub source: ContentSource,
}

/// Wraps a [`ContentGenerator`] and falls back to local generation on failure.
#[derive(Clone)]
pub struct Assistant {
    service: Arc<dyn ContentGenerator>,
    fallback: FallbackGenerator,
}

impl Assistant {
    pub fn new(service: Arc<dyn ContentGenerator>) -> Self {
        Self {
            service,
            fallback: FallbackGenerator::new(),
        }
    }

    /// Assistant without a service; everything comes from the fallback.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineService))
    }

    /// Generate field text. Always returns text.
    pub async fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        context: &GenerationContext,
    ) -> Generated {
        match self.service.generate(prompt, content_type, context).await {
            Ok(text) if !text.trim().is_empty() => Generated {
                text,
                source: ContentSource::Service,
            },
            result => {
                log_fallback(result.err());
                Generated {
                    text: self.fallback.generate(prompt, content_type, context),
                    source: ContentSource::Fallback,
                }
            }
        }
    }

    /// Rewrite existing text. Always returns text.
    pub async fn improve(&self, content: &str, instructions: &str) -> Generated {
        match self.service.improve(content, instructions).await {
            Ok(text) if !text.trim().is_empty() => Generated {
                text,
                source: ContentSource::Service,
            },
            result => {
                log_fallback(result.err());
                Generated {
                    text: self.fallback.improve(content, instructions),
                    source: ContentSource::Fallback,
                }
            }
        }
    }

    /// Suggest a style for a block.
    pub async fn suggest_style(&self, category: &Category, prompt: &str) -> StyleSuggestion {
        match self.service.suggest_style(category, prompt).await {
            Ok(style) => style,
            Err(err) => {
                log_fallback(Some(err));
                self.fallback.suggest_style(category, prompt)
            }
        }
    }

    /// Start generating in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_generate(
        &self,
        prompt: impl Into<String>,
        content_type: ContentType,
        context: GenerationContext,
    ) -> PendingContent {
        let assistant = self.clone();
        let prompt = prompt.into();
        let (sender, receiver) = oneshot::channel();

        tokio::spawn(async move {
            let generated = assistant.generate(&prompt, content_type, &context).await;
            if sender.send(generated).is_err() {
                tracing::debug!("Discarded generated {} for cancelled request", content_type);
            }
        });

        PendingContent { receiver }
    }
}

fn log_fallback(err: Option<GenerationError>) {
    match err {
        Some(err) => tracing::warn!("{}; using local fallback", err),
        None => tracing::warn!("Content service returned empty text; using local fallback"),
    }
}

/// An in-flight generation.
///
/// Dropping or cancelling it discards the result. The service call itself
/// runs to completion.
#[derive(Debug)]
pub struct PendingContent {
    receiver: oneshot::Receiver<Generated>,
}

impl PendingContent {
    /// Stop waiting; the result will be ignored.
    pub fn cancel(self) {}

    /// Wait for the result.
    pub async fn wait(self) -> Result<Generated, GenerationError> {
        self.receiver.await.map_err(|_| GenerationError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct Canned(&'static str);

    #[async_trait]
    impl ContentGenerator for Canned {
        async fn generate(
            &self,
            _prompt: &str,
            _content_type: ContentType,
            _context: &GenerationContext,
        ) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }

        async fn improve(&self, _content: &str, _instructions: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    /// Blocks until released, then counts completions.
    struct Gate {
        release: Notify,
        completed: AtomicUsize,
    }

    #[async_trait]
    impl ContentGenerator for Gate {
        async fn generate(
            &self,
            _prompt: &str,
            _content_type: ContentType,
            _context: &GenerationContext,
        ) -> Result<String, GenerationError> {
            self.release.notified().await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok("late".to_string())
        }

        async fn improve(&self, _content: &str, _instructions: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Backend("unused".to_string()))
        }
    }

    #[tokio::test]
    async fn uses_service_text_when_available() {
        let assistant = Assistant::new(Arc::new(Canned("Hello There")));

        let generated = assistant
            .generate("x", ContentType::Headline, &GenerationContext::default())
            .await;

        assert_eq!(generated.text, "Hello There");
        assert_eq!(generated.source, ContentSource::Service);
    }

    #[tokio::test]
    async fn offline_cta_falls_back_to_candidates() {
        let assistant = Assistant::offline();

        let generated = assistant
            .generate("for our newsletter", ContentType::Cta, &GenerationContext::default())
            .await;

        assert_eq!(generated.source, ContentSource::Fallback);
        assert!(!generated.text.is_empty());
        assert_eq!(
            generated.text,
            FallbackGenerator::new().generate(
                "for our newsletter",
                ContentType::Cta,
                &GenerationContext::default()
            )
        );
    }

    #[tokio::test]
    async fn blank_service_text_falls_back() {
        let assistant = Assistant::new(Arc::new(Canned("   ")));

        let improved = assistant.improve("Try it", "persuasive").await;

        assert_eq!(improved.text, "Try it Today");
        assert_eq!(improved.source, ContentSource::Fallback);
    }

    #[tokio::test]
    async fn style_falls_back_when_unsupported() {
        let assistant = Assistant::new(Arc::new(Canned("x")));

        let style = assistant.suggest_style(&Category::Hero, "").await;

        assert_eq!(style.padding, "5rem 2rem");
    }

    #[tokio::test]
    async fn spawned_request_can_be_awaited() {
        let pending = Assistant::new(Arc::new(Canned("Async Copy"))).spawn_generate(
            "x",
            ContentType::Paragraph,
            GenerationContext::default(),
        );

        assert_eq!(pending.wait().await.unwrap().text, "Async Copy");
    }

    #[tokio::test]
    async fn cancelled_request_discards_the_late_result() {
        let gate = Arc::new(Gate {
            release: Notify::new(),
            completed: AtomicUsize::new(0),
        });
        let assistant = Assistant::new(gate.clone());

        let pending = assistant.spawn_generate("x", ContentType::Headline, GenerationContext::default());
        pending.cancel();

        gate.release.notify_one();
        for _ in 0..100 {
            if gate.completed.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(gate.completed.load(Ordering::SeqCst), 1);
    }
}
