//! Field selectors and slot resolution.
//!
//! A selector names an element by tag and/or class (`h1`, `.title`,
//! `button.cta`). Resolving a selector against block markup yields a
//! [`Slot`]: the byte range of the text that an override replaces.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::template::TemplateError;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// An element selector: optional tag name plus zero or more classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a selector such as `h2`, `.headline` or `p.lead.muted`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let source = source.trim();
        let invalid = || TemplateError::InvalidSelector(source.to_string());

        if source.is_empty() || source.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let mut parts = source.split('.');
        let tag = parts.next().unwrap_or_default();

        let tag = if tag.is_empty() {
            None
        } else if tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && tag.starts_with(|c: char| c.is_ascii_alphabetic())
        {
            Some(tag.to_ascii_lowercase())
        } else {
            return Err(invalid());
        };

        let classes: Vec<String> = parts.map(str::to_string).collect();
        if classes.iter().any(String::is_empty) || (tag.is_none() && classes.is_empty()) {
            return Err(invalid());
        }

        Ok(Self { tag, classes })
    }

    /// Tag name this selector requires, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Classes this selector requires.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether an opening tag with the given name and raw attribute text matches.
    pub fn matches(&self, tag: &str, attrs: &str) -> bool {
        if let Some(ref wanted) = self.tag {
            if !wanted.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if self.classes.is_empty() {
            return true;
        }

        let class_attr = class_attribute(attrs).unwrap_or_default();
        self.classes
            .iter()
            .all(|wanted| class_attr.split_whitespace().any(|c| c == wanted))
    }
}

impl FromStr for Selector {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref tag) = self.tag {
            f.write_str(tag)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

/// The addressable text of one editable field inside a template's markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Byte range of the default text (may be empty).
    pub range: Range<usize>,

    /// How many elements in the markup matched the selector.
    ///
    /// Only the first match is ever addressable; a count above one marks a
    /// template whose other matches can not be edited.
    pub matches: usize,
}

impl Slot {
    /// Default text of this slot within `markup`.
    pub fn default_text<'m>(&self, markup: &'m str) -> &'m str {
        &markup[self.range.clone()]
    }
}

/// A tag found while scanning markup.
#[derive(Debug, Clone)]
enum Token<'m> {
    Open {
        name: &'m str,
        attrs: &'m str,
        self_closing: bool,
        span: Range<usize>,
    },
    Close {
        name: &'m str,
        span: Range<usize>,
    },
    Comment {
        span: Range<usize>,
    },
}

impl Token<'_> {
    fn span(&self) -> &Range<usize> {
        match self {
            Token::Open { span, .. } | Token::Close { span, .. } | Token::Comment { span } => span,
        }
    }
}

fn tokenize(markup: &str) -> Vec<Token<'_>> {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"<!--[\s\S]*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#,
        )
        .expect("Invalid tag regex")
    });

    TAG_RE
        .captures_iter(markup)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let span = whole.start()..whole.end();

            let Some(name) = caps.get(2) else {
                return Some(Token::Comment { span });
            };

            if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                Some(Token::Close {
                    name: name.as_str(),
                    span,
                })
            } else {
                Some(Token::Open {
                    name: name.as_str(),
                    attrs: caps.get(3).map(|m| m.as_str()).unwrap_or(""),
                    self_closing: caps.get(4).is_some_and(|m| !m.as_str().is_empty()),
                    span,
                })
            }
        })
        .collect()
}

fn class_attribute(attrs: &str) -> Option<&str> {
    static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("Invalid class regex")
    });

    let caps = CLASS_RE.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Resolve `selector` against `markup`.
///
/// Returns `Ok(None)` when nothing matches. The slot covers the first
/// non-whitespace text run inside the first matching element, trimmed of
/// surrounding whitespace; an element without text yields an empty slot
/// right after its opening tag.
pub fn resolve_slot(markup: &str, selector: &Selector) -> Result<Option<Slot>, TemplateError> {
    let tokens = tokenize(markup);

    let matching: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| match token {
            Token::Open { name, attrs, .. } if selector.matches(name, attrs) => Some(i),
            _ => None,
        })
        .collect();

    let Some(&first) = matching.first() else {
        return Ok(None);
    };

    let Token::Open {
        name,
        self_closing,
        span: open_span,
        ..
    } = &tokens[first]
    else {
        return Ok(None);
    };

    if *self_closing || is_void(name) {
        return Err(TemplateError::VoidElement {
            selector: selector.to_string(),
            tag: name.to_string(),
        });
    }

    // Find the matching close tag, tracking nested elements of the same name.
    let mut depth = 1usize;
    let mut close_at = None;
    for (i, token) in tokens.iter().enumerate().skip(first + 1) {
        match token {
            Token::Open {
                name: other,
                self_closing: false,
                ..
            } if other.eq_ignore_ascii_case(name) && !is_void(other) => depth += 1,
            Token::Close { name: other, .. } if other.eq_ignore_ascii_case(name) => {
                depth -= 1;
                if depth == 0 {
                    close_at = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    let Some(close_at) = close_at else {
        return Err(TemplateError::UnclosedElement {
            selector: selector.to_string(),
            tag: name.to_string(),
        });
    };

    let content_start = open_span.end;
    let mut cursor = content_start;
    let inner = tokens[first + 1..=close_at].iter();

    for token in inner {
        let gap = cursor..token.span().start;
        if let Some(range) = trimmed_text(markup, gap) {
            return Ok(Some(Slot {
                range,
                matches: matching.len(),
            }));
        }
        cursor = token.span().end;
    }

    Ok(Some(Slot {
        range: content_start..content_start,
        matches: matching.len(),
    }))
}

/// Shrink `range` to its non-whitespace core, or `None` if it is blank.
fn trimmed_text(markup: &str, range: Range<usize>) -> Option<Range<usize>> {
    let text = &markup[range.clone()];
    let leading = text.len() - text.trim_start().len();
    let trailing = text.len() - text.trim_end().len();

    if leading == text.len() {
        return None;
    }

    Some(range.start + leading..range.end - trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_text<'m>(markup: &'m str, selector: &str) -> Option<&'m str> {
        let selector = Selector::parse(selector).unwrap();
        resolve_slot(markup, &selector)
            .unwrap()
            .map(|slot| slot.default_text(markup))
    }

    #[test]
    fn parses_selector_forms() {
        let tag = Selector::parse("H1").unwrap();
        assert_eq!(tag.tag(), Some("h1"));
        assert!(tag.classes().is_empty());

        let class = Selector::parse(".lead").unwrap();
        assert_eq!(class.tag(), None);
        assert_eq!(class.classes(), ["lead".to_string()]);

        let both = Selector::parse("p.lead.muted").unwrap();
        assert_eq!(both.to_string(), "p.lead.muted");
    }

    #[test]
    fn rejects_malformed_selectors() {
        for bad in ["", "h1 p", ".", "p..x", "1h", "#id"] {
            assert!(Selector::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn matches_whole_class_tokens() {
        let selector = Selector::parse(".grid").unwrap();
        assert!(selector.matches("div", r#" class="grid md:grid-cols-3""#));
        assert!(!selector.matches("div", r#" class="md:grid-cols-3""#));
        assert!(!selector.matches("div", ""));
    }

    #[test]
    fn slot_excludes_surrounding_whitespace() {
        let markup = "<button class=\"btn\">\n    Get Started\n  </button>";
        assert_eq!(slot_text(markup, "button"), Some("Get Started"));
    }

    #[test]
    fn slot_skips_nested_markup_before_text() {
        let markup = "<div class=\"card\">\n  <span class=\"icon\"></span>\n  <h3>Fast</h3>\n</div>";
        assert_eq!(slot_text(markup, ".card"), Some("Fast"));
    }

    #[test]
    fn slot_binds_first_match_and_counts_the_rest() {
        let markup = "<h3>One</h3><h3>Two</h3>";
        let selector = Selector::parse("h3").unwrap();
        let slot = resolve_slot(markup, &selector).unwrap().unwrap();

        assert_eq!(slot.default_text(markup), "One");
        assert_eq!(slot.matches, 2);
    }

    #[test]
    fn empty_element_yields_empty_slot_after_open_tag() {
        let markup = "<form><textarea rows=\"4\"></textarea></form>";
        let selector = Selector::parse("textarea").unwrap();
        let slot = resolve_slot(markup, &selector).unwrap().unwrap();

        assert!(slot.range.is_empty());
        assert_eq!(&markup[..slot.range.start], "<form><textarea rows=\"4\">");
    }

    #[test]
    fn comments_are_not_text() {
        let markup = "<p><!-- note --> Visible</p>";
        assert_eq!(slot_text(markup, "p"), Some("Visible"));
    }

    #[test]
    fn void_elements_are_not_addressable() {
        let selector = Selector::parse("input").unwrap();
        let result = resolve_slot(r#"<input type="text" placeholder="Name">"#, &selector);
        assert!(matches!(result, Err(TemplateError::VoidElement { .. })));
    }

    #[test]
    fn unmatched_selector_resolves_to_none() {
        assert_eq!(slot_text("<p>Hi</p>", "h1"), None);
    }

    #[test]
    fn unclosed_element_is_an_error() {
        let selector = Selector::parse("p").unwrap();
        let result = resolve_slot("<div><p>Hi</div>", &selector);
        assert!(matches!(result, Err(TemplateError::UnclosedElement { .. })));
    }

    #[test]
    fn attribute_values_may_contain_angle_brackets() {
        let markup = r#"<a title="a > b" class="link">Go</a>"#;
        assert_eq!(slot_text(markup, "a.link"), Some("Go"));
    }
}
