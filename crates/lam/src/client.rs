//! LAfricaMobile HTTP client
//!
//! Shared client for the three LAfricaMobile endpoints this engine uses:
//! speech-to-text, text-to-speech and translation. Authentication is a
//! password grant returning a bearer token; the token is cached and
//! refreshed once on a 401 before the request is retried.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;

use tontouma_core::{AudioPayload, Language, ProviderError};

/// Client configuration
#[derive(Debug, Clone)]
pub struct LamClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Total attempts per operation, including the first
    pub attempts: u32,
}

impl Default for LamClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lam-api.lafricamobile.com".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_ms: 60_000,
            attempts: 2,
        }
    }
}

/// Map a language into LAfricaMobile's own code space.
pub fn lam_language_code(language: Language) -> &'static str {
    match language {
        Language::Wolof => "wolof",
        Language::French => "french",
        Language::English => "english",
        Language::Arabic => "arabic",
        Language::Spanish => "spanish",
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    #[serde(default)]
    transcription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    path_audio: Option<String>,
}

/// Shared LAfricaMobile API client
pub struct LamClient {
    config: LamClientConfig,
    client: Client,
    token: RwLock<Option<String>>,
}

impl LamClient {
    pub fn new(config: LamClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn authenticate(&self) -> Result<String, ProviderError> {
        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(ProviderError::NotConfigured(
                "LAfricaMobile credentials missing".to_string(),
            ));
        }

        tracing::info!("Authenticating against LAfricaMobile");
        let response = self
            .client
            .post(format!("{}/login", self.config.base_url))
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
                ("grant_type", "password"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        *self.token.write().await = Some(login.access_token.clone());
        Ok(login.access_token)
    }

    async fn bearer(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.authenticate().await
    }

    /// Transcribe a Wolof audio payload.
    pub async fn stt(&self, audio: &AudioPayload, language: Language) -> Result<String, ProviderError> {
        let lang = lam_language_code(language);
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.stt_once(audio, lang).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        "LAfricaMobile STT attempt failed"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn stt_once(&self, audio: &AudioPayload, lang: &str) -> Result<String, ProviderError> {
        let send = |token: String| {
            let part = Part::bytes(audio.data.clone())
                .file_name(format!("audio.{}", audio.format.extension()))
                .mime_str(audio.format.mime())
                .unwrap_or_else(|_| Part::bytes(audio.data.clone()));
            let form = Form::new()
                .part("audio", part)
                .text("to_lang", lang.to_string());
            self.client
                .post(format!("{}/stt/", self.config.base_url))
                .bearer_auth(token)
                .multipart(form)
                .send()
        };

        let mut response = send(self.bearer().await?).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token expired: refresh once and retry the request.
            response = send(self.authenticate().await?).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SttResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed.transcription.ok_or_else(|| {
            ProviderError::InvalidResponse("missing 'transcription' field".to_string())
        })
    }

    /// Translate text into the target language.
    pub async fn translate(&self, text: &str, to: Language) -> Result<String, ProviderError> {
        let to_lang = lam_language_code(to);
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.translate_once(text, to_lang).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        to_lang,
                        error = %e,
                        "LAfricaMobile translation attempt failed"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn translate_once(&self, text: &str, to_lang: &str) -> Result<String, ProviderError> {
        let payload = serde_json::json!({ "text": text, "to_lang": to_lang });

        let send = |token: String| {
            self.client
                .post(format!("{}/tts/translate", self.config.base_url))
                .bearer_auth(token)
                .json(&payload)
                .send()
        };

        let mut response = send(self.bearer().await?).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            response = send(self.authenticate().await?).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed.translated_text.ok_or_else(|| {
            ProviderError::InvalidResponse("missing 'translated_text' field".to_string())
        })
    }

    /// Synthesize speech and download the resulting audio.
    ///
    /// The API returns a URL to the rendered file; this method fetches it
    /// and hands back the raw bytes together with the file extension from
    /// the URL (empty when the URL carries none).
    pub async fn tts(
        &self,
        text: &str,
        language: Language,
    ) -> Result<(Vec<u8>, String), ProviderError> {
        let lang = lam_language_code(language);
        let mut last_error = ProviderError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.tts_once(text, lang).await {
                Ok(audio) => return Ok(audio),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        "LAfricaMobile TTS attempt failed"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn tts_once(&self, text: &str, lang: &str) -> Result<(Vec<u8>, String), ProviderError> {
        let payload = serde_json::json!({
            "text": text,
            "to_lang": lang,
            "pitch": 0.0,
            "speed": 1.0,
        });

        let send = |token: String| {
            self.client
                .post(format!("{}/tts/", self.config.base_url))
                .bearer_auth(token)
                .json(&payload)
                .send()
        };

        let mut response = send(self.bearer().await?).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            response = send(self.authenticate().await?).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TtsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let url = parsed.path_audio.ok_or_else(|| {
            ProviderError::InvalidResponse("missing 'path_audio' field".to_string())
        })?;

        let extension = url
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();

        tracing::debug!(url = %url, "Downloading synthesized audio");
        let download = self.client.get(&url).send().await?;
        let status = download.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: format!("audio download failed for {}", url),
            });
        }

        let bytes = download
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok((bytes.to_vec(), extension))
    }
}
