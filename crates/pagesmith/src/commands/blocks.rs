//! Block catalog listing.

use pagesmith_blocks::{BlockRegistry, Category};

use crate::config::Config;

/// Run the blocks command.
pub fn run(config: &Config, category: Option<&str>) {
    let registry = config.registry();
    print!("{}", render_catalog(&registry, category.map(Category::from)));
}

fn render_catalog(registry: &BlockRegistry, only: Option<Category>) -> String {
    let mut out = String::new();

    for category in registry.categories() {
        if only.as_ref().is_some_and(|c| c != category) {
            continue;
        }

        out.push_str(&format!("{category}\n"));
        for template in registry.templates_in(category) {
            out.push_str(&format!("  {:<16} {}", template.id(), template.name()));
            if !template.description().is_empty() {
                out.push_str(&format!(" - {}", template.description()));
            }
            out.push('\n');

            for field in template.fields() {
                out.push_str(&format!("      {:<14} {}\n", field.key(), field.label()));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_templates_with_fields() {
        let registry = BlockRegistry::with_defaults();
        let listing = render_catalog(&registry, None);

        assert!(listing.starts_with("hero\n  hero-simple"));
        assert!(listing.contains("contact-form"));
        assert!(listing.contains("      h1"));
    }

    #[test]
    fn filters_one_category() {
        let registry = BlockRegistry::with_defaults();
        let listing = render_catalog(&registry, Some(Category::Form));

        assert!(listing.starts_with("form\n"));
        assert!(listing.contains("contact-form"));
        assert!(!listing.contains("hero-simple"));
    }
}
