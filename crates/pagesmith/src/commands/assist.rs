//! Content assistance commands.

use anyhow::{Context, Result};
use pagesmith_assist::{ContentSource, ContentType, Generated, GenerationContext};
use pagesmith_blocks::Category;

use crate::commands::open_page;
use crate::config::Config;

fn report(generated: &Generated) {
    if generated.source == ContentSource::Fallback {
        tracing::info!("Generated locally (no content service available)");
    }
}

/// Generate copy, printing it or storing it in a block field.
pub async fn generate(
    config: &Config,
    content_type: ContentType,
    prompt: &str,
    category: Option<String>,
    target: Option<(String, String)>,
) -> Result<()> {
    let assistant = config.assistant();

    let Some((block, selector)) = target else {
        let context = GenerationContext {
            block_category: category.map(Category::from),
        };
        let generated = assistant.generate(prompt, content_type, &context).await;
        report(&generated);
        println!("{}", generated.text);
        return Ok(());
    };

    let mut page = open_page(config)?;
    let id = page.resolve(&block)?;

    // The block's own category unless one was given.
    let block_category = category.map(Category::from).or_else(|| {
        page.get(&id)
            .and_then(|b| page.registry().get(&b.template_id))
            .map(|t| t.category().clone())
    });
    let context = GenerationContext { block_category };

    let generated = assistant.generate(prompt, content_type, &context).await;
    report(&generated);

    page.update_block_content(&id, &selector, generated.text.as_str())?;
    page.flush().await;

    println!("{}", generated.text);
    Ok(())
}

/// Rewrite a field's current text and store the result.
pub async fn improve(config: &Config, block: &str, selector: &str, instructions: &str) -> Result<()> {
    let mut page = open_page(config)?;
    let id = page.resolve(block)?;

    let current = page
        .get(&id)
        .and_then(|b| {
            b.field(selector).map(str::to_string).or_else(|| {
                page.registry()
                    .get(&b.template_id)
                    .and_then(|t| t.default_text(selector))
                    .map(str::to_string)
            })
        })
        .with_context(|| format!("Block {id} has no text for '{selector}'"))?;

    let improved = config.assistant().improve(&current, instructions).await;
    report(&improved);

    page.update_block_content(&id, selector, improved.text.as_str())?;
    page.flush().await;

    println!("{}", improved.text);
    Ok(())
}

/// Print a style suggestion as JSON.
pub async fn style(config: &Config, category: &str, prompt: &str) -> Result<()> {
    let suggestion = config
        .assistant()
        .suggest_style(&Category::from(category), prompt)
        .await;

    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}
