//! General-purpose HTTP speech providers
//!
//! These talk to OpenAI-compatible endpoints and serve as the guaranteed
//! last resort for every language. Provider-specific code spaces stay
//! inside this module: the transcription endpoint takes ISO-639-1 hints and
//! has none for Wolof, in which case the hint is omitted and the engine
//! auto-detects internally.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tontouma_core::{
    AudioArtifact, AudioFormat, AudioPayload, AudioStore, Language, ProviderError, SpeechToText,
    TextToSpeech,
};

/// Language hint in the transcription endpoint's code space.
///
/// Returns `None` when the endpoint has no code for the language; the
/// provider then auto-detects.
pub fn transcription_hint(language: Language) -> Option<&'static str> {
    match language {
        Language::French => Some("fr"),
        Language::English => Some("en"),
        Language::Arabic => Some("ar"),
        Language::Spanish => Some("es"),
        Language::Wolof => None,
    }
}

/// Configuration shared by the general STT and TTS providers
#[derive(Debug, Clone)]
pub struct HttpSpeechConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Synthesis voice (ignored by the STT provider)
    pub voice: String,
    pub timeout_ms: u64,
    pub attempts: u32,
}

impl Default for HttpSpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            voice: "alloy".to_string(),
            timeout_ms: 30_000,
            attempts: 2,
        }
    }
}

fn build_client(timeout_ms: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// General-purpose speech-to-text over an OpenAI-compatible endpoint
pub struct HttpStt {
    config: HttpSpeechConfig,
    client: Client,
}

impl HttpStt {
    pub fn new(config: HttpSpeechConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout_ms)?;
        Ok(Self { config, client })
    }

    async fn transcribe_once(
        &self,
        audio: &AudioPayload,
        hint: Option<&'static str>,
    ) -> Result<String, ProviderError> {
        let part = Part::bytes(audio.data.clone())
            .file_name(format!("audio.{}", audio.format.extension()))
            .mime_str(audio.format.mime())
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());
        if let Some(code) = hint {
            form = form.text("language", code);
        }

        let mut request = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.config.base_url))
            .multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(parsed.text)
    }
}

#[async_trait]
impl SpeechToText for HttpStt {
    async fn transcribe(
        &self,
        audio: &AudioPayload,
        language: Option<Language>,
    ) -> Result<String, ProviderError> {
        let hint = language.and_then(transcription_hint);
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.transcribe_once(audio, hint).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "General STT attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn provider_name(&self) -> &str {
        "http-stt"
    }
}

/// General-purpose text-to-speech over an OpenAI-compatible endpoint
pub struct HttpTts {
    config: HttpSpeechConfig,
    client: Client,
    artifacts: Arc<dyn AudioStore>,
}

impl HttpTts {
    pub fn new(
        config: HttpSpeechConfig,
        artifacts: Arc<dyn AudioStore>,
    ) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout_ms)?;
        Ok(Self {
            config,
            client,
            artifacts,
        })
    }

    async fn synthesize_once(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "input": text,
            "voice": self.config.voice,
            "response_format": "mp3",
        });

        let mut request = self
            .client
            .post(format!("{}/v1/audio/speech", self.config.base_url))
            .json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TextToSpeech for HttpTts {
    async fn synthesize(
        &self,
        text: &str,
        _language: Language,
    ) -> Result<AudioArtifact, ProviderError> {
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.synthesize_once(text).await {
                Ok(bytes) => {
                    return self
                        .artifacts
                        .store(bytes, AudioFormat::Mp3)
                        .await
                        .map_err(|e| ProviderError::Storage(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "General TTS attempt failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn provider_name(&self) -> &str {
        "http-tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_hint_code_space() {
        assert_eq!(transcription_hint(Language::French), Some("fr"));
        assert_eq!(transcription_hint(Language::Spanish), Some("es"));
        // Wolof has no code in the general transcriber's vocabulary.
        assert_eq!(transcription_hint(Language::Wolof), None);
    }
}
