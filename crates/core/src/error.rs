//! Shared error types

use thiserror::Error;

/// Failure of an external provider (speech, translation, model, embedding).
///
/// Providers must surface a distinguishable failure so callers can apply
/// their fallback policy; none of these variants should ever reach the
/// public reply surface directly.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("artifact storage failed: {0}")]
    Storage(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured timeout; report zero and
            // let the caller's logs carry the budget.
            ProviderError::Timeout(0)
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Failure of a session/message or entity store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
