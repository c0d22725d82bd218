//! Stylesheet and behavior script generation.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Build the stylesheet: base rules, then each block fragment in the
    /// order given, then the responsive utilities.
    pub fn generate_css<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
        let blocks = fragments
            .into_iter()
            .map(str::trim_end)
            .filter(|css| !css.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut css = String::with_capacity(BASE_CSS.len() + blocks.len() + RESPONSIVE_CSS.len());
        css.push_str(BASE_CSS);
        css.push_str("/* Custom block styles */\n");
        if !blocks.is_empty() {
            css.push_str(&blocks);
            css.push('\n');
        }
        css.push('\n');
        css.push_str(RESPONSIVE_CSS);
        css
    }

    /// Build the behavior script. Form handling is only included when the
    /// page contains a form block.
    pub fn generate_js(include_form_handling: bool) -> String {
        let mut js = String::from(SCRIPT_PRELUDE);
        if include_form_handling {
            js.push_str(FORM_HANDLING_JS);
        }
        js.push_str(SCRIPT_EPILOGUE);
        js
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

/// Marker present in the script only when form handling is included.
pub const FORM_HANDLING_MARKER: &str = "// Form handling";

const BASE_CSS: &str = r#"/* PageSmith Generated Styles */

/* Reset and base styles */
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    line-height: 1.6;
    color: #333;
}

"#;

const RESPONSIVE_CSS: &str = r#"/* Responsive utilities */
@media (max-width: 768px) {
    .container {
        padding: 0 1rem;
    }

    .grid {
        grid-template-columns: 1fr;
    }
}
"#;

const SCRIPT_PRELUDE: &str = r##"// PageSmith Generated JavaScript

document.addEventListener('DOMContentLoaded', function() {
    // Smooth scrolling for anchor links
    document.querySelectorAll('a[href^="#"]').forEach(anchor => {
        anchor.addEventListener('click', function (e) {
            const target = document.querySelector(this.getAttribute('href'));
            if (target) {
                e.preventDefault();
                target.scrollIntoView({ behavior: 'smooth' });
            }
        });
    });
"##;

const FORM_HANDLING_JS: &str = r#"
    // Form handling
    document.querySelectorAll('form').forEach(form => {
        form.addEventListener('submit', function(e) {
            e.preventDefault();

            const data = Object.fromEntries(new FormData(this));

            // Replace with your own submission logic
            console.log('Form submitted:', data);
            alert('Thank you for your message! We\'ll get back to you soon.');

            this.reset();
        });
    });
"#;

const SCRIPT_EPILOGUE: &str = "});\n";
