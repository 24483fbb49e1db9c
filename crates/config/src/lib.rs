//! Layered configuration for the Tontouma conversational engine
//!
//! Settings are loaded from `config/default`, an optional per-environment
//! file, and `TONTOUMA__`-prefixed environment variables, in increasing
//! priority. Secrets (provider credentials, API keys) are expected to come
//! from the environment.

mod settings;

pub use settings::{
    load_settings, AudioStoreConfig, CallBudget, DialogueConfig, EmbeddingsConfig,
    GeneralSttConfig, GeneralTtsConfig, LamConfig, LanguageConfig, LidConfig, LlmConfig,
    ObservabilityConfig, ProvidersConfig, RetrievalConfig, RuntimeEnvironment, Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured default level applies.
pub fn init_tracing(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.observability.log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
