//! Speech provider traits

use crate::audio::{AudioArtifact, AudioPayload};
use crate::error::ProviderError;
use crate::language::Language;
use async_trait::async_trait;

/// Speech-to-Text provider
///
/// Implementations are thin clients over external engines; the gateway owns
/// the fallback policy between them.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio payload.
    ///
    /// `language` is a best-effort hint. Providers that cannot honor the
    /// hint (no matching code in their own vocabulary) must ignore it and
    /// detect internally rather than fail.
    async fn transcribe(
        &self,
        audio: &AudioPayload,
        language: Option<Language>,
    ) -> Result<String, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Text-to-Speech provider
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text into a stored audio artifact.
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<AudioArtifact, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Spoken-language classification result, in the classifier's own code space
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    /// Language code as emitted by the classifier
    pub code: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

/// Spoken-language identification provider
#[async_trait]
pub trait LanguageIdentifier: Send + Sync {
    async fn identify(&self, audio: &AudioPayload) -> Result<LanguageGuess, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
