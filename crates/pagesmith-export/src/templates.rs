//! Document shell for exported pages.

use minijinja::{context, Environment};

/// Values substituted into the document shell.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShellContext {
    /// Document title
    pub title: String,
    /// `lang` attribute of the root element
    pub lang: String,
    /// Styling framework script loaded after the stylesheet, if any.
    /// Quotes and angle brackets are escaped for the `src` attribute.
    pub framework_url: Option<String>,
    /// Concatenated block markup, inserted verbatim
    pub content: String,
}

/// Renders the HTML document around the block markup.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        Self { env }
    }

    /// Render the full document.
    pub fn render_page(&self, context: &ShellContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;

        tmpl.render(context! {
            title => &context.title,
            lang => &context.lang,
            framework_url => context
                .framework_url
                .as_deref()
                .map(|url| html_escape::encode_double_quoted_attribute(url).into_owned()),
            content => &context.content,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// The behavior script must stay the last element before </body>.
const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <link rel="stylesheet" href="style.css">
{%- if framework_url %}
    <script src="{{ framework_url | safe }}"></script>
{%- endif %}
</head>
<body>
{{ content | safe }}
    <script src="script.js"></script>
</body>
</html>
"##;
