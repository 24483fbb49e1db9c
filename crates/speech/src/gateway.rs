//! Speech gateway
//!
//! Owns the provider routing policy: which chain of providers handles a
//! given language, in which order, and what happens when one fails. A
//! provider failure never escapes this module as-is; callers either get a
//! result from a fallback or a single well-defined gateway error.

use std::sync::Arc;
use thiserror::Error;

use tontouma_core::{
    AudioArtifact, AudioPayload, Language, LanguageIdentifier, SpeechToText, TextToSpeech,
};

/// Gateway failure after every provider in the chain was tried
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("all transcription providers failed for {language}")]
    TranscriptionFailed { language: Language },

    #[error("all synthesis providers failed for {language}")]
    SynthesisFailed { language: Language },
}

/// A transcription together with the language it was resolved against
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub language: Language,
}

/// Speech gateway with per-language provider chains
pub struct SpeechGateway {
    classifier: Arc<dyn LanguageIdentifier>,
    bridge_stt: Arc<dyn SpeechToText>,
    general_stt: Arc<dyn SpeechToText>,
    bridge_tts: Arc<dyn TextToSpeech>,
    general_tts: Arc<dyn TextToSpeech>,
    bridge_language: Language,
    working_language: Language,
}

impl SpeechGateway {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: Arc<dyn LanguageIdentifier>,
        bridge_stt: Arc<dyn SpeechToText>,
        general_stt: Arc<dyn SpeechToText>,
        bridge_tts: Arc<dyn TextToSpeech>,
        general_tts: Arc<dyn TextToSpeech>,
        bridge_language: Language,
        working_language: Language,
    ) -> Self {
        Self {
            classifier,
            bridge_stt,
            general_stt,
            bridge_tts,
            general_tts,
            bridge_language,
            working_language,
        }
    }

    /// Transcribe audio, resolving the target language first.
    ///
    /// A forced language skips detection entirely. Otherwise the classifier
    /// runs and its code is mapped into the router vocabulary; an
    /// unmappable or failed classification degrades to the working language
    /// so the request can still proceed.
    pub async fn transcribe(
        &self,
        audio: &AudioPayload,
        forced: Option<Language>,
    ) -> Result<Transcription, SpeechError> {
        let language = match forced {
            Some(language) => language,
            None => self.detect_language(audio).await,
        };

        let chain: Vec<&Arc<dyn SpeechToText>> = if language == self.bridge_language {
            vec![&self.bridge_stt, &self.general_stt]
        } else {
            vec![&self.general_stt]
        };

        for provider in chain {
            match provider.transcribe(audio, Some(language)).await {
                Ok(text) => {
                    tracing::info!(
                        provider = provider.provider_name(),
                        language = language.code(),
                        chars = text.len(),
                        "Transcription succeeded"
                    );
                    return Ok(Transcription { text, language });
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.provider_name(),
                        language = language.code(),
                        error = %e,
                        "Transcription provider failed, trying next"
                    );
                }
            }
        }

        Err(SpeechError::TranscriptionFailed { language })
    }

    /// Synthesize text in the given language.
    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<AudioArtifact, SpeechError> {
        let chain: Vec<&Arc<dyn TextToSpeech>> = if language == self.bridge_language {
            vec![&self.bridge_tts, &self.general_tts]
        } else {
            vec![&self.general_tts]
        };

        for provider in chain {
            match provider.synthesize(text, language).await {
                Ok(artifact) => {
                    tracing::info!(
                        provider = provider.provider_name(),
                        language = language.code(),
                        "Synthesis succeeded"
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.provider_name(),
                        language = language.code(),
                        error = %e,
                        "Synthesis provider failed, trying next"
                    );
                }
            }
        }

        Err(SpeechError::SynthesisFailed { language })
    }

    async fn detect_language(&self, audio: &AudioPayload) -> Language {
        match self.classifier.identify(audio).await {
            Ok(guess) => match Language::from_str_loose(&guess.code) {
                Some(language) => {
                    tracing::info!(
                        code = %guess.code,
                        confidence = guess.confidence,
                        language = language.code(),
                        "Language identified"
                    );
                    language
                }
                None => {
                    tracing::warn!(
                        code = %guess.code,
                        confidence = guess.confidence,
                        "Classifier code outside router vocabulary, using working language"
                    );
                    self.working_language
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Language identification failed, using working language");
                self.working_language
            }
        }
    }
}
