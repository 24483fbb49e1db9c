//! Provider trait implementations backed by the LAfricaMobile client

use crate::client::LamClient;
use async_trait::async_trait;
use std::sync::Arc;

use tontouma_core::{
    AudioArtifact, AudioFormat, AudioPayload, AudioStore, Language, ProviderError, SpeechToText,
    TextToSpeech, Translator,
};

/// Wolof-specialized speech-to-text
pub struct LamSpeechToText {
    client: Arc<LamClient>,
}

impl LamSpeechToText {
    pub fn new(client: Arc<LamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for LamSpeechToText {
    async fn transcribe(
        &self,
        audio: &AudioPayload,
        language: Option<Language>,
    ) -> Result<String, ProviderError> {
        if let Some(summary) = audio.wav_summary() {
            if summary.sample_rate != 16_000 || summary.channels != 1 {
                tracing::warn!(
                    sample_rate = summary.sample_rate,
                    channels = summary.channels,
                    "Audio is not 16kHz mono; LAfricaMobile transcription quality may degrade"
                );
            }
        }
        self.client
            .stt(audio, language.unwrap_or(Language::Wolof))
            .await
    }

    fn provider_name(&self) -> &str {
        "lafricamobile-stt"
    }
}

/// Wolof-specialized text-to-speech
pub struct LamTextToSpeech {
    client: Arc<LamClient>,
    artifacts: Arc<dyn AudioStore>,
}

impl LamTextToSpeech {
    pub fn new(client: Arc<LamClient>, artifacts: Arc<dyn AudioStore>) -> Self {
        Self { client, artifacts }
    }
}

#[async_trait]
impl TextToSpeech for LamTextToSpeech {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<AudioArtifact, ProviderError> {
        let (bytes, extension) = self.client.tts(text, language).await?;

        let format = match extension.as_str() {
            "mp3" => AudioFormat::Mp3,
            "ogg" => AudioFormat::Ogg,
            // The API does not always carry an extension; WAV is its default.
            _ => AudioFormat::Wav,
        };

        self.artifacts
            .store(bytes, format)
            .await
            .map_err(|e| ProviderError::Storage(e.to_string()))
    }

    fn provider_name(&self) -> &str {
        "lafricamobile-tts"
    }
}

/// Translation between Wolof and the working language
pub struct LamTranslator {
    client: Arc<LamClient>,
}

impl LamTranslator {
    pub fn new(client: Arc<LamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for LamTranslator {
    async fn translate(
        &self,
        text: &str,
        _from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        self.client.translate(text, to).await
    }

    fn provider_name(&self) -> &str {
        "lafricamobile-translate"
    }
}
