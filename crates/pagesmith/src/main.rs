//! PageSmith CLI - compose landing pages from blocks and export them.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use pagesmith_assist::ContentType;
use pagesmith_page::Direction;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Compose landing pages from blocks and export them as static sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to pagesmith.toml config file
    #[arg(short, long, default_value = "pagesmith.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create pagesmith.toml and a block directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the block catalog
    Blocks {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the blocks on the page
    List,

    /// Append a block to the page
    Add {
        /// Template id from the catalog
        template: String,
    },

    /// Change the text of one field
    Edit {
        /// Block id or a unique prefix of it
        block: String,
        /// Field selector, e.g. "h1" or ".subtitle"
        selector: String,
        value: String,
    },

    /// Remove a block from the page
    Remove {
        /// Block id or a unique prefix of it
        block: String,
    },

    /// Move a block up or down
    Move {
        /// Block id or a unique prefix of it
        block: String,
        direction: Direction,
    },

    /// Remove every block and the saved page state
    Clear,

    /// Export the page as a zip archive or a directory
    Export {
        /// Archive path (defaults to config or "my-landing-page.zip")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write files into this directory instead of an archive
        #[arg(short, long, conflicts_with = "output")]
        dir: Option<PathBuf>,

        /// Minify the stylesheet
        #[arg(long)]
        minify: bool,
    },

    /// Generate copy for a field
    Generate {
        /// headline, paragraph or cta
        content_type: ContentType,

        /// What the copy is about
        prompt: String,

        /// Category of the block the copy is for
        #[arg(short, long)]
        category: Option<String>,

        /// Store the result in a block field: <block> <selector>
        #[arg(long, num_args = 2, value_names = ["BLOCK", "SELECTOR"])]
        apply: Option<Vec<String>>,
    },

    /// Rewrite the text of a field
    Improve {
        /// Block id or a unique prefix of it
        block: String,
        selector: String,

        /// e.g. "more professional", "shorter", "persuasive"
        instructions: String,
    },

    /// Suggest a style for a block category
    Style {
        category: String,

        #[arg(default_value = "")]
        prompt: String,
    },

    /// Preview the page with live reload
    Dev {
        /// Port to listen on (defaults to config or 7777)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Serve an exported directory
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "dist")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    if let Commands::Init { yes } = cli.command {
        return commands::init::run(&cli.config, yes);
    }

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Blocks { category } => {
            commands::blocks::run(&config, category.as_deref());
        }
        Commands::List => {
            commands::page::list(&config)?;
        }
        Commands::Add { template } => {
            commands::page::add(&config, &template).await?;
        }
        Commands::Edit {
            block,
            selector,
            value,
        } => {
            commands::page::edit(&config, &block, &selector, &value).await?;
        }
        Commands::Remove { block } => {
            commands::page::remove(&config, &block).await?;
        }
        Commands::Move { block, direction } => {
            commands::page::move_block(&config, &block, direction).await?;
        }
        Commands::Clear => {
            commands::page::clear(&config).await?;
        }
        Commands::Export {
            output,
            dir,
            minify,
        } => {
            commands::export::run(&config, output, dir, minify)?;
        }
        Commands::Generate {
            content_type,
            prompt,
            category,
            apply,
        } => {
            let target = apply.and_then(|args| match <[String; 2]>::try_from(args) {
                Ok([block, selector]) => Some((block, selector)),
                Err(_) => None,
            });
            commands::assist::generate(&config, content_type, &prompt, category, target).await?;
        }
        Commands::Improve {
            block,
            selector,
            instructions,
        } => {
            commands::assist::improve(&config, &block, &selector, &instructions).await?;
        }
        Commands::Style { category, prompt } => {
            commands::assist::style(&config, &category, &prompt).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&config, port, !no_open).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(port, dir).await?;
        }
    }

    Ok(())
}
