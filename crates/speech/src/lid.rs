//! Spoken-language identification client
//!
//! Thin client over a classifier sidecar. The classifier speaks its own
//! code space; mapping into the router vocabulary happens in the gateway.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use tontouma_core::{AudioPayload, LanguageGuess, LanguageIdentifier, ProviderError};

/// Classifier sidecar configuration
#[derive(Debug, Clone)]
pub struct HttpLidConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub attempts: u32,
}

impl Default for HttpLidConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8091".to_string(),
            timeout_ms: 10_000,
            attempts: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LidResponse {
    language: String,
    #[serde(default)]
    confidence: f32,
}

/// HTTP language classifier
pub struct HttpLanguageClassifier {
    config: HttpLidConfig,
    client: Client,
}

impl HttpLanguageClassifier {
    pub fn new(config: HttpLidConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn identify_once(&self, audio: &AudioPayload) -> Result<LanguageGuess, ProviderError> {
        let response = self
            .client
            .post(format!("{}/identify", self.config.base_url))
            .header("Content-Type", audio.format.mime())
            .body(audio.data.clone())
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

        let parsed: LidResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(LanguageGuess {
            code: parsed.language,
            confidence: parsed.confidence,
        })
    }
}

#[async_trait]
impl LanguageIdentifier for HttpLanguageClassifier {
    async fn identify(&self, audio: &AudioPayload) -> Result<LanguageGuess, ProviderError> {
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.identify_once(audio).await {
                Ok(guess) => return Ok(guess),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Language identification attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn provider_name(&self) -> &str {
        "http-lid"
    }
}
