//! Offline text generation.
//!
//! Picks from fixed candidate lists, steered by a few keyword checks on the
//! prompt. Without a keyword match the pick is derived from a hash of the
//! prompt, so the same prompt always yields the same text.

use std::sync::LazyLock;

use pagesmith_blocks::Category;
use regex::Regex;

use crate::content::{ContentType, GenerationContext, StyleSuggestion};

const HEADLINES: &[&str] = &[
    "Transform Your Online Presence Today",
    "Build Beautiful Websites Without Code",
    "Create Landing Pages That Convert",
    "Design Like a Pro, No Experience Required",
    "Your Vision, Our Technology",
    "Websites That Work As Hard As You Do",
    "Stunning Designs Made Simple",
    "Unlock Your Website's Potential",
];

const PARAGRAPHS: &[&str] = &[
    "Our intuitive drag-and-drop builder makes website creation accessible to everyone. No coding \
     skills required, just your creativity and our powerful tools. Build professional-looking pages \
     in minutes that would normally take days with traditional methods.",
    "Stand out from the competition with a beautifully designed website that captures your brand's \
     essence. Our templates are crafted by professional designers and optimized for engagement, \
     ensuring your visitors stay longer and convert better.",
    "Every business deserves a great website. Our platform provides enterprise-level features at \
     prices small businesses can afford. Start with our free tier and scale as you grow, with no \
     hidden fees or complicated upgrade paths.",
    "Join thousands of satisfied customers who have transformed their online presence with our \
     platform. Our average user launches their first page within 30 minutes of signing up, and \
     reports a 40% increase in engagement compared to their old websites.",
];

const HERO_PARAGRAPH: &str = "Create stunning landing pages in minutes with our intuitive \
drag-and-drop builder. No coding required. Start with professionally designed templates and \
customize every element to match your brand. Launch faster and convert better with PageSmith.";

const FEATURES_PARAGRAPH: &str = "Our platform offers everything you need to build high-converting \
pages. Enjoy responsive designs, SEO optimization, fast loading speeds, and built-in analytics, all \
without touching a line of code. Focus on growing your business while we handle the technical \
details.";

const CTAS: &[&str] = &[
    "Get Started Free",
    "Start Building Now",
    "Try It Free",
    "Launch Your Site",
    "Join Free For 14 Days",
    "See It In Action",
    "Create Your Page",
    "Start Your Free Trial",
];

static PROFESSIONAL_WORDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    substitutions(&[
        ("amazing", "exceptional"),
        ("great", "premium"),
        ("good", "high-quality"),
        ("fast", "efficient"),
        ("easy", "streamlined"),
    ])
});

static ENHANCED_WORDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    substitutions(&[
        ("website", "professional website"),
        ("build", "create"),
        ("make", "design"),
        ("get", "obtain"),
    ])
});

fn substitutions(pairs: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs
        .iter()
        .map(|(word, replacement)| {
            let pattern = format!(r"(?i)\b{word}\b");
            (Regex::new(&pattern).expect("valid word pattern"), *replacement)
        })
        .collect()
}

/// Local generator used when the content service is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate text for `prompt`. Never empty.
    pub fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        context: &GenerationContext,
    ) -> String {
        let lower = prompt.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let text = match content_type {
            ContentType::Headline => {
                if has(&["professional"]) {
                    "Professional Websites Built in Minutes"
                } else if has(&["easy", "simple"]) {
                    "Simple Website Building for Everyone"
                } else if has(&["fast", "quick"]) {
                    "Launch Your Website in Record Time"
                } else {
                    pick(HEADLINES, prompt)
                }
            }
            ContentType::Paragraph => match context.block_category {
                Some(Category::Hero) => HERO_PARAGRAPH,
                _ if context.is_features() => FEATURES_PARAGRAPH,
                _ => pick(PARAGRAPHS, prompt),
            },
            ContentType::Cta => {
                if has(&["buy", "purchase"]) {
                    "Buy Now"
                } else if has(&["learn", "more"]) {
                    "Learn More"
                } else if has(&["contact", "support"]) {
                    "Contact Us"
                } else {
                    pick(CTAS, prompt)
                }
            }
        };

        text.to_string()
    }

    /// Rewrite `content` following `instructions`.
    pub fn improve(&self, content: &str, instructions: &str) -> String {
        let lower = instructions.to_lowercase();

        if lower.contains("professional") {
            substitute(content, &PROFESSIONAL_WORDS)
        } else if lower.contains("concise") || lower.contains("shorter") {
            concise(content)
        } else if lower.contains("persuasive") || lower.contains("conversion") {
            persuasive(content)
        } else {
            substitute(content, &ENHANCED_WORDS)
        }
    }

    /// Suggest a style for a block of `category`.
    pub fn suggest_style(&self, category: &Category, prompt: &str) -> StyleSuggestion {
        let lower = prompt.to_lowercase();

        StyleSuggestion {
            background_color: background_color(category, &lower).to_string(),
            text_color: text_color(category, &lower).to_string(),
            font_family: font_family(&lower).to_string(),
            padding: padding(category).to_string(),
            border_radius: "0.5rem".to_string(),
        }
    }
}

/// Stable pick from `candidates` keyed by `prompt` (FNV-1a).
fn pick(candidates: &'static [&'static str], prompt: &str) -> &'static str {
    let hash = prompt
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3));
    candidates[(hash % candidates.len() as u64) as usize]
}

fn substitute(content: &str, words: &[(Regex, &'static str)]) -> String {
    let mut text = content.to_string();
    for (pattern, replacement) in words {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

fn concise(content: &str) -> String {
    if content.chars().count() <= 100 {
        return content.to_string();
    }

    let sentences: Vec<&str> = content.split('.').take(2).collect();
    format!("{}.", sentences.join("."))
}

fn persuasive(content: &str) -> String {
    if content.contains('?') {
        content.to_string()
    } else if content.chars().count() < 50 {
        format!("{content} Today")
    } else {
        format!("{content} Start now and see the difference.")
    }
}

fn background_color(category: &Category, prompt: &str) -> &'static str {
    const PREFERENCES: &[(&str, &str)] = &[
        ("blue", "#1e40af"),
        ("green", "#047857"),
        ("purple", "#7e22ce"),
        ("dark", "#1f2937"),
        ("light", "#f3f4f6"),
    ];

    if let Some((_, color)) = PREFERENCES.iter().find(|(word, _)| prompt.contains(word)) {
        return *color;
    }

    match category {
        Category::Hero => "linear-gradient(135deg, #3b82f6 0%, #8b5cf6 100%)",
        Category::Form => "#f9fafb",
        Category::Cta => "#2563eb",
        Category::Footer => "#111827",
        _ => "#ffffff",
    }
}

fn text_color(category: &Category, prompt: &str) -> &'static str {
    let dark = matches!(category, Category::Hero | Category::Cta | Category::Footer)
        || prompt.contains("dark");

    if dark {
        "#ffffff"
    } else {
        "#111827"
    }
}

fn font_family(prompt: &str) -> &'static str {
    let has = |words: &[&str]| words.iter().any(|w| prompt.contains(w));

    if has(&["modern", "clean"]) {
        "Inter, system-ui, sans-serif"
    } else if has(&["professional", "business"]) {
        "Montserrat, Arial, sans-serif"
    } else if has(&["creative", "unique"]) {
        "Poppins, sans-serif"
    } else if has(&["classic", "traditional"]) {
        "Georgia, serif"
    } else {
        "system-ui, sans-serif"
    }
}

fn padding(category: &Category) -> &'static str {
    match category {
        Category::Hero => "5rem 2rem",
        Category::Content | Category::Cta => "4rem 2rem",
        _ => "3rem 2rem",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generate(prompt: &str, content_type: ContentType) -> String {
        FallbackGenerator::new().generate(prompt, content_type, &GenerationContext::default())
    }

    #[test]
    fn cta_comes_from_candidates_or_keyword_override() {
        for prompt in ["", "something catchy", "a podcast", "x"] {
            let cta = generate(prompt, ContentType::Cta);
            assert!(!cta.is_empty());
            assert!(CTAS.contains(&cta.as_str()), "unexpected cta {cta:?}");
        }

        assert_eq!(generate("Purchase the plan", ContentType::Cta), "Buy Now");
        assert_eq!(generate("learn about us", ContentType::Cta), "Learn More");
        assert_eq!(generate("reach support", ContentType::Cta), "Contact Us");
    }

    #[test]
    fn headline_keywords_take_priority() {
        assert_eq!(
            generate("A PROFESSIONAL and fast site", ContentType::Headline),
            "Professional Websites Built in Minutes"
        );
        assert_eq!(
            generate("keep it simple", ContentType::Headline),
            "Simple Website Building for Everyone"
        );
        assert_eq!(
            generate("quick launch", ContentType::Headline),
            "Launch Your Website in Record Time"
        );
    }

    #[test]
    fn picks_are_stable_per_prompt() {
        let first = generate("a bakery in Lisbon", ContentType::Headline);
        let second = generate("a bakery in Lisbon", ContentType::Headline);

        assert_eq!(first, second);
        assert!(HEADLINES.contains(&first.as_str()));
    }

    #[test]
    fn paragraph_follows_block_category() {
        let fallback = FallbackGenerator::new();

        let hero = fallback.generate(
            "anything",
            ContentType::Paragraph,
            &GenerationContext::for_category(Category::Hero),
        );
        let features = fallback.generate(
            "anything",
            ContentType::Paragraph,
            &GenerationContext::for_category(Category::Content),
        );
        let other = fallback.generate("anything", ContentType::Paragraph, &GenerationContext::default());

        assert_eq!(hero, HERO_PARAGRAPH);
        assert_eq!(features, FEATURES_PARAGRAPH);
        assert!(PARAGRAPHS.contains(&other.as_str()));
    }

    #[test]
    fn features_tagged_blocks_get_the_features_paragraph() {
        let fallback = FallbackGenerator::new();

        for tag in ["features", "Features"] {
            let text = fallback.generate(
                "anything",
                ContentType::Paragraph,
                &GenerationContext::for_category(Category::from(tag)),
            );
            assert_eq!(text, FEATURES_PARAGRAPH);
        }

        let pricing = fallback.generate(
            "anything",
            ContentType::Paragraph,
            &GenerationContext::for_category(Category::from("pricing")),
        );
        assert!(PARAGRAPHS.contains(&pricing.as_str()));
    }

    #[test]
    fn improves_by_instruction() {
        let fallback = FallbackGenerator::new();

        assert_eq!(
            fallback.improve("An Amazing and easy tool", "more professional"),
            "An exceptional and streamlined tool"
        );
        assert_eq!(fallback.improve("Short text", "make it shorter"), "Short text");
        assert_eq!(
            fallback.improve(&PARAGRAPHS[2], "concise please"),
            "Every business deserves a great website. Our platform provides enterprise-level \
             features at prices small businesses can afford."
        );
        assert_eq!(fallback.improve("Try it", "persuasive"), "Try it Today");
        assert_eq!(fallback.improve("Why wait?", "conversion"), "Why wait?");
        assert_eq!(
            fallback.improve("We build a website together", "polish"),
            "We create a professional website together"
        );
    }

    #[test]
    fn style_prefers_prompt_colours() {
        let fallback = FallbackGenerator::new();

        let dark_footer = fallback.suggest_style(&Category::Footer, "");
        assert_eq!(dark_footer.background_color, "#111827");
        assert_eq!(dark_footer.text_color, "#ffffff");

        let green_form = fallback.suggest_style(&Category::Form, "Green and modern");
        assert_eq!(green_form.background_color, "#047857");
        assert_eq!(green_form.text_color, "#111827");
        assert_eq!(green_form.font_family, "Inter, system-ui, sans-serif");
        assert_eq!(green_form.padding, "3rem 2rem");
    }
}
