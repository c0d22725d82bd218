//! Request and response types shared by generators.

use std::fmt;
use std::str::FromStr;

use pagesmith_blocks::Category;
use serde::{Deserialize, Serialize};

/// Kind of text being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Headline,
    Paragraph,
    Cta,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Headline => "headline",
            ContentType::Paragraph => "paragraph",
            ContentType::Cta => "cta",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "headline" => Ok(ContentType::Headline),
            "paragraph" => Ok(ContentType::Paragraph),
            "cta" => Ok(ContentType::Cta),
            other => Err(format!(
                "unknown content type '{other}', expected headline, paragraph or cta"
            )),
        }
    }
}

/// Where the generated text will be used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    /// Category of the block holding the field
    pub block_category: Option<Category>,
}

impl GenerationContext {
    pub fn for_category(category: Category) -> Self {
        Self {
            block_category: Some(category),
        }
    }

    /// Whether the copy is for a features section. Catalogs may tag such
    /// blocks `content` or `features`.
    pub fn is_features(&self) -> bool {
        match &self.block_category {
            Some(Category::Content) => true,
            Some(Category::Other(tag)) => tag.eq_ignore_ascii_case("features"),
            _ => false,
        }
    }
}

/// Suggested visual treatment for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSuggestion {
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub padding: String,
    pub border_radius: String,
}
