//! Live preview command.

use anyhow::Result;
use pagesmith_server::PreviewServer;

use crate::config::Config;

/// Run the preview server.
pub async fn run(config: &Config, port: Option<u16>, open: bool) -> Result<()> {
    let mut preview = config.preview();
    if let Some(port) = port {
        preview.port = port;
    }
    preview.open &= open;

    tracing::info!("Starting preview server on port {}", preview.port);

    PreviewServer::new(preview).start().await?;

    Ok(())
}
