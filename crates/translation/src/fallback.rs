//! Primary/secondary translator chain

use async_trait::async_trait;
use std::sync::Arc;
use tontouma_core::{Language, ProviderError, Translator};

/// Tries a primary translator and falls back to a secondary one when the
/// primary fails.
pub struct FallbackTranslator {
    primary: Arc<dyn Translator>,
    fallback: Arc<dyn Translator>,
}

impl FallbackTranslator {
    pub fn new(primary: Arc<dyn Translator>, fallback: Arc<dyn Translator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Translator for FallbackTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        match self.primary.translate(text, from, to).await {
            Ok(translated) => Ok(translated),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.provider_name(),
                    fallback = self.fallback.provider_name(),
                    error = %e,
                    "Primary translator failed, trying fallback"
                );
                self.fallback.translate(text, from, to).await
            }
        }
    }

    fn provider_name(&self) -> &str {
        "fallback"
    }
}
