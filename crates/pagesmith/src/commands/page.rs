//! Page editing commands.

use anyhow::Result;
use pagesmith_page::{Direction, MoveOutcome, PageStore};

use crate::commands::open_page;
use crate::config::Config;

/// Print the blocks on the page.
pub fn list(config: &Config) -> Result<()> {
    let page = open_page(config)?;
    print!("{}", render_page(&page));
    Ok(())
}

fn render_page(page: &PageStore) -> String {
    if page.is_empty() {
        return "The page is empty. Add a block with 'pagesmith add <template>'.\n".to_string();
    }

    let mut out = String::new();
    for (index, block) in page.blocks().iter().enumerate() {
        let known = if page.registry().contains(&block.template_id) {
            ""
        } else {
            " (missing template)"
        };
        out.push_str(&format!(
            "{}. {}  {}{}\n",
            index + 1,
            block.instance_id,
            block.template_id,
            known
        ));

        for (selector, value) in &block.content {
            out.push_str(&format!("     {selector} = {value:?}\n"));
        }
    }
    out
}

pub async fn add(config: &Config, template: &str) -> Result<()> {
    let mut page = open_page(config)?;
    let id = page.add_block(template)?;
    page.flush().await;

    println!("{id}");
    tracing::info!("Added {} at position {}", template, page.len());
    Ok(())
}

pub async fn edit(config: &Config, block: &str, selector: &str, value: &str) -> Result<()> {
    let mut page = open_page(config)?;
    let id = page.resolve(block)?;

    if let Some(template) = page
        .get(&id)
        .and_then(|b| page.registry().get(&b.template_id))
    {
        if template.field(selector).is_none() {
            tracing::warn!(
                "'{}' is not an editable field of {}; the value will not show",
                selector,
                template.id()
            );
        }
    }

    page.update_block_content(&id, selector, value)?;
    page.flush().await;

    tracing::info!("Updated {} {}", id, selector);
    Ok(())
}

pub async fn remove(config: &Config, block: &str) -> Result<()> {
    let mut page = open_page(config)?;
    let id = page.resolve(block)?;
    let removed = page.delete_block(&id)?;
    page.flush().await;

    tracing::info!("Removed {} ({})", removed.instance_id, removed.template_id);
    Ok(())
}

pub async fn move_block(config: &Config, block: &str, direction: Direction) -> Result<()> {
    let mut page = open_page(config)?;
    let id = page.resolve(block)?;

    match page.move_block(&id, direction)? {
        MoveOutcome::Moved => {
            page.flush().await;
            tracing::info!("Moved {} {}", id, direction);
        }
        MoveOutcome::NoOp => {
            tracing::info!("{} is already at the {}", id, edge(direction));
        }
    }
    Ok(())
}

fn edge(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "top",
        Direction::Down => "bottom",
    }
}

pub async fn clear(config: &Config) -> Result<()> {
    let mut page = open_page(config)?;
    let count = page.len();
    page.clear();
    page.flush().await;

    tracing::info!("Removed {} blocks", count);
    Ok(())
}
