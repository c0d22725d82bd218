//! Prompt shaping for completion-style backends.

use pagesmith_blocks::Category;
use serde::Serialize;

use crate::content::{ContentType, GenerationContext};

const COPYWRITER: &str = "You are an expert copywriter specializing in high-converting landing \
pages. You understand marketing psychology, persuasive writing, and web design best practices.";

const AUDIENCE: &str = "Target audience: Professional and business users";

const IMPROVE_SYSTEM: &str = "You are an expert copywriter and content optimizer specializing in \
conversion-focused web copy.

Your task is to improve existing content based on specific instructions while maintaining:
- The original intent and meaning
- Appropriate tone and voice
- SEO-friendly language
- Conversion optimization principles
- Professional quality

Always return only the improved content, no explanations or quotes.";

/// A fully shaped completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Request for new field text.
    pub fn generate(prompt: &str, content_type: ContentType, context: &GenerationContext) -> Self {
        Self {
            system: system_prompt(content_type, context),
            user: user_prompt(prompt, content_type, context),
            max_tokens: max_tokens(content_type),
            temperature: 0.7,
        }
    }

    /// Request to rewrite existing text.
    pub fn improve(content: &str, instructions: &str) -> Self {
        Self {
            system: IMPROVE_SYSTEM.to_string(),
            user: format!(
                "Improve this content: \"{content}\"\n\nInstructions: {instructions}\n\n\
                 Return only the improved version."
            ),
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

/// Token budget per content type.
pub fn max_tokens(content_type: ContentType) -> u32 {
    match content_type {
        ContentType::Headline => 50,
        ContentType::Cta => 20,
        ContentType::Paragraph => 200,
    }
}

fn system_prompt(content_type: ContentType, context: &GenerationContext) -> String {
    let block = context
        .block_category
        .as_ref()
        .map(Category::as_str)
        .unwrap_or("general");

    let (task, tone, kind) = match content_type {
        ContentType::Headline => (
            "create compelling headlines that:
- Grab attention immediately
- Communicate clear value propositions
- Are optimized for conversion
- Use power words and emotional triggers
- Are concise but impactful (under 10 words when possible)",
            "Professional, confident, action-oriented",
            "headline",
        ),
        ContentType::Paragraph => (
            "write engaging paragraphs that:
- Support the main headline or message
- Provide clear benefits and value
- Use persuasive language and social proof
- Are scannable and easy to read
- Are 2-4 sentences long",
            "Professional, trustworthy, benefit-focused",
            "paragraph",
        ),
        ContentType::Cta => (
            "create high-converting call-to-action button text that:
- Creates urgency and desire
- Uses action-oriented language
- Is short and punchy (2-4 words ideal)
- Focuses on benefits, not features",
            "Direct, action-oriented, benefit-driven",
            "button",
        ),
    };

    format!(
        "{COPYWRITER}\n\nYour task is to {task}\n\nBlock context: {block}\n{AUDIENCE}\n\
         Tone: {tone}\n\nReturn only the {kind} text, no quotes or explanations."
    )
}

fn user_prompt(prompt: &str, content_type: ContentType, context: &GenerationContext) -> String {
    let mut shaped = prompt.trim().to_string();

    match context.block_category {
        Some(Category::Hero) => {
            shaped.push_str(" This is for a hero section that needs to make a strong first impression.")
        }
        Some(Category::Cta) => {
            shaped.push_str(" This is for a call-to-action section designed to convert visitors.")
        }
        _ if context.is_features() => {
            shaped.push_str(" This is for a features section highlighting key benefits.")
        }
        _ => {}
    }

    shaped.push_str(match content_type {
        ContentType::Headline => {
            " Create a headline that would make someone stop scrolling and pay attention."
        }
        ContentType::Paragraph => {
            " Write body text that supports the main message and persuades readers to take action."
        }
        ContentType::Cta => " Create button text that makes people want to click immediately.",
    });

    shaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_limits_follow_content_type() {
        assert_eq!(max_tokens(ContentType::Headline), 50);
        assert_eq!(max_tokens(ContentType::Cta), 20);
        assert_eq!(max_tokens(ContentType::Paragraph), 200);
        assert_eq!(CompletionRequest::improve("x", "y").max_tokens, 300);
    }

    #[test]
    fn system_prompt_names_block_context() {
        let hero = CompletionRequest::generate(
            "launch",
            ContentType::Headline,
            &GenerationContext::for_category(Category::Hero),
        );
        let general =
            CompletionRequest::generate("launch", ContentType::Headline, &GenerationContext::default());

        assert!(hero.system.contains("Block context: hero"));
        assert!(general.system.contains("Block context: general"));
        assert!(hero.system.contains("Return only the headline text"));
    }

    #[test]
    fn user_prompt_gains_section_and_type_hints() {
        let request = CompletionRequest::generate(
            "  a budgeting app ",
            ContentType::Cta,
            &GenerationContext::for_category(Category::Cta),
        );

        assert!(request.user.starts_with("a budgeting app This is for a call-to-action section"));
        assert!(request.user.ends_with("want to click immediately."));
    }

    #[test]
    fn features_hint_covers_content_and_features_tags() {
        for category in [Category::Content, Category::from("features")] {
            let request = CompletionRequest::generate(
                "a budgeting app",
                ContentType::Paragraph,
                &GenerationContext::for_category(category),
            );
            assert!(request.user.contains("This is for a features section"));
        }
    }

    #[test]
    fn improve_request_quotes_the_content() {
        let request = CompletionRequest::improve("Fast pages", "more formal");

        assert!(request.user.contains("\"Fast pages\""));
        assert!(request.user.contains("Instructions: more formal"));
    }
}
