//! Language model access for answer and summary generation.
//!
//! Generation goes through a locally installed Ollama binary rather than a
//! hosted API, keeping the whole pipeline offline-capable.

use crate::error::{Result, SkueError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Trait for text generation backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model, for display.
    fn model_name(&self) -> &str;
}

/// Runs `ollama run <model>` with the prompt on stdin.
pub struct OllamaClient {
    binary: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(model: &str) -> Self {
        Self {
            binary: "ollama".to_string(),
            model: model.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Use a non-PATH ollama executable.
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(prompt_len = prompt.len(), "running ollama");

        let spawn_result = Command::new(&self.binary)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawn_result {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SkueError::ToolNotFound(self.binary.clone()));
            }
            Err(e) => {
                return Err(SkueError::Llm(format!("failed to start ollama: {e}")));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                SkueError::Llm(format!(
                    "ollama timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| SkueError::Llm(format!("ollama failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SkueError::Llm(format!(
                "ollama run '{}' failed: {}",
                self.model,
                stderr.trim()
            )));
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if answer.is_empty() {
            return Err(SkueError::Llm("empty response from ollama".to_string()));
        }
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_configuration() {
        let client = OllamaClient::new("llama3.2")
            .with_binary("/usr/local/bin/ollama")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(client.model_name(), "llama3.2");
        assert_eq!(client.binary, "/usr/local/bin/ollama");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_tool_not_found() {
        let client = OllamaClient::new("llama3.2").with_binary("definitely-not-a-real-binary");
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, SkueError::ToolNotFound(_)));
    }
}
