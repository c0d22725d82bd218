//! Content service backed by an external command.
//!
//! The command receives a [`CompletionRequest`] as JSON on stdin and prints
//! the generated text on stdout. Any model client can be plugged in this way.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::content::{ContentType, GenerationContext};
use crate::prompt::CompletionRequest;
use crate::service::{ContentGenerator, GenerationError};

/// Runs a local program for each request.
#[derive(Debug, Clone)]
pub struct CommandService {
    program: String,
    args: Vec<String>,
}

impl CommandService {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| GenerationError::Transport(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GenerationError::Transport(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that ignores its input may close stdin early.
            if let Err(e) = stdin.write_all(&payload).await {
                tracing::debug!("Content command closed stdin: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::Backend(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout)
            .trim()
            .trim_matches('"')
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for CommandService {
    async fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        context: &GenerationContext,
    ) -> Result<String, GenerationError> {
        self.complete(&CompletionRequest::generate(prompt, content_type, context))
            .await
    }

    async fn improve(&self, content: &str, instructions: &str) -> Result<String, GenerationError> {
        self.complete(&CompletionRequest::improve(content, instructions))
            .await
    }
}
