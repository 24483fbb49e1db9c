//! Embedding client
//!
//! Uses an Ollama-compatible embedding API for generating dense vectors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use tontouma_core::{Embedder, ProviderError};

/// Embedding provider configuration
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// API endpoint
    pub base_url: String,
    /// Model name
    pub model: String,
    pub timeout_ms: u64,
    pub attempts: u32,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "qwen3-embedding:0.6b".to_string(),
            timeout_ms: 30_000,
            attempts: 2,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// HTTP embedder
pub struct HttpEmbedder {
    config: HttpEmbedderConfig,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let request = EmbedRequest {
            model: self.config.model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.config.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("empty embeddings array".to_string()))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.embed_once(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Embedding attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
