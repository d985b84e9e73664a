//! Ollama embeddings over the local HTTP API.

use super::Embedder;
use crate::error::{Result, SkueError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_HOST: &str = "http://localhost:11434";

/// Embedder backed by a locally running Ollama daemon.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    host: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Create an embedder with the default model.
    pub fn new() -> Self {
        Self::with_config("nomic-embed-text", 768)
    }

    /// Create an embedder with a custom model and dimension count.
    pub fn with_config(model: &str, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: DEFAULT_HOST.to_string(),
            model: model.to_string(),
            dimensions,
        }
    }

    /// Point the embedder at a non-default Ollama host.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.trim_end_matches('/').to_string();
        self
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.host);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                SkueError::Embedding(format!(
                    "Could not reach Ollama at {}: {}. Is 'ollama serve' running?",
                    self.host, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SkueError::Embedding(format!(
                "Ollama embedding request failed ({status}): {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(SkueError::Embedding("Empty embedding response".to_string()));
        }
        Ok(parsed.embedding)
    }
}

impl Default for OllamaEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_one(text).await
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // The embeddings endpoint takes one prompt at a time.
        let mut all_embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            all_embeddings.push(self.embed_one(text).await?);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
