//! Translation bridge
//!
//! Active only when a request's effective language equals the bridge
//! language. Inbound text is translated into the working language for the
//! model; outbound replies are translated back for display. A provider
//! failure in either direction falls back to the untranslated text and is
//! never raised to the caller: a reply in the wrong language beats no reply.

use std::sync::Arc;
use tontouma_core::{Language, Translator};

/// Bridge between the bridge language and the model's working language
pub struct TranslationBridge {
    translator: Arc<dyn Translator>,
    bridge_language: Language,
    working_language: Language,
}

impl TranslationBridge {
    pub fn new(
        translator: Arc<dyn Translator>,
        bridge_language: Language,
        working_language: Language,
    ) -> Self {
        Self {
            translator,
            bridge_language,
            working_language,
        }
    }

    pub fn bridge_language(&self) -> Language {
        self.bridge_language
    }

    /// Whether the bridge applies to a request in `language`.
    pub fn applies_to(&self, language: Language) -> bool {
        language == self.bridge_language
    }

    /// Translate inbound bridge-language text into the working language.
    ///
    /// Falls back to the original text unmodified when the provider fails.
    pub async fn to_processing(&self, text: &str) -> String {
        match self
            .translator
            .translate(text, self.bridge_language, self.working_language)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    provider = self.translator.provider_name(),
                    error = %e,
                    "Inbound translation failed, keeping original text"
                );
                text.to_string()
            }
        }
    }

    /// Translate an outbound working-language reply into the bridge
    /// language for display and audio rendering.
    ///
    /// Falls back to the original text unmodified when the provider fails.
    pub async fn to_display(&self, text: &str) -> String {
        match self
            .translator
            .translate(text, self.working_language, self.bridge_language)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    provider = self.translator.provider_name(),
                    error = %e,
                    "Outbound translation failed, keeping original text"
                );
                text.to_string()
            }
        }
    }
}
