//! Pass-through translator

use async_trait::async_trait;
use tontouma_core::{Language, ProviderError, Translator};

/// Identity translator, for deployments without a translation provider and
/// for tests.
#[derive(Debug, Default)]
pub struct NoopTranslator;

impl NoopTranslator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(
        &self,
        text: &str,
        _from: Language,
        _to: Language,
    ) -> Result<String, ProviderError> {
        Ok(text.to_string())
    }

    fn provider_name(&self) -> &str {
        "noop"
    }
}
