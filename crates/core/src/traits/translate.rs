//! Translation provider trait

use crate::error::ProviderError;
use crate::language::Language;
use async_trait::async_trait;

/// Text translation provider
///
/// Errors are surfaced to the caller; the translation bridge decides whether
/// to fall back to the untranslated text.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
