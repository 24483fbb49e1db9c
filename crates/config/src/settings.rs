//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use tontouma_core::Language;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Language handling
    #[serde(default)]
    pub languages: LanguageConfig,

    /// Dialogue engine bounds
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// External provider endpoints and budgets
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Audio artifact storage
    #[serde(default)]
    pub audio: AudioStoreConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.languages.validate()?;
        self.dialogue.validate()?;
        self.providers.validate(self.environment)?;
        self.retrieval.validate()?;
        Ok(())
    }
}

/// Language handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language requiring translation before and after model processing
    #[serde(default = "default_bridge_language")]
    pub bridge: String,

    /// Language the model operates in
    #[serde(default = "default_working_language")]
    pub working: String,
}

fn default_bridge_language() -> String {
    "wo".to_string()
}

fn default_working_language() -> String {
    "fr".to_string()
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            bridge: default_bridge_language(),
            working: default_working_language(),
        }
    }
}

impl LanguageConfig {
    pub fn bridge_language(&self) -> Language {
        Language::from_str_loose(&self.bridge).unwrap_or(Language::Wolof)
    }

    pub fn working_language(&self) -> Language {
        Language::from_str_loose(&self.working).unwrap_or(Language::French)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("languages.bridge", &self.bridge), ("languages.working", &self.working)] {
            if Language::from_str_loose(value).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("unknown language '{}'", value),
                });
            }
        }
        if self.bridge_language() == self.working_language() {
            return Err(ConfigError::InvalidValue {
                field: "languages".to_string(),
                message: "bridge and working language must differ".to_string(),
            });
        }
        Ok(())
    }
}

/// Dialogue engine bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Number of past turns replayed into the model prompt
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Hard ceiling on tool invocations within a single request
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_history_turns() -> usize {
    10
}

fn default_max_tool_rounds() -> usize {
    5
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl DialogueConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tool_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_tool_rounds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_tool_rounds > 20 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_tool_rounds".to_string(),
                message: "unreasonably high (maximum 20)".to_string(),
            });
        }
        Ok(())
    }
}

/// Timeout and retry budget applied to one external provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallBudget {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Total attempts, including the first (so 2 = one retry)
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_attempts() -> u32 {
    2
}

impl Default for CallBudget {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            attempts: default_attempts(),
        }
    }
}

/// All external provider settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// LAfricaMobile (Wolof STT/TTS/translation)
    #[serde(default)]
    pub lam: LamConfig,

    /// General-purpose speech-to-text
    #[serde(default)]
    pub stt: GeneralSttConfig,

    /// General-purpose text-to-speech
    #[serde(default)]
    pub tts: GeneralTtsConfig,

    /// Spoken-language classifier
    #[serde(default)]
    pub lid: LidConfig,

    /// Language model
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding model
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
}

impl ProvidersConfig {
    fn validate(&self, environment: RuntimeEnvironment) -> Result<(), ConfigError> {
        if environment.is_strict() {
            if self.llm.api_key.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "providers.llm.api_key".to_string(),
                    message: "required outside development".to_string(),
                });
            }
            if self.lam.username.is_empty() || self.lam.password.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "providers.lam".to_string(),
                    message: "credentials required outside development".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// LAfricaMobile provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LamConfig {
    #[serde(default = "default_lam_base_url")]
    pub base_url: String,

    /// Set via TONTOUMA__PROVIDERS__LAM__USERNAME
    #[serde(default)]
    pub username: String,

    /// Set via TONTOUMA__PROVIDERS__LAM__PASSWORD
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_lam_budget")]
    pub budget: CallBudget,
}

fn default_lam_base_url() -> String {
    "https://lam-api.lafricamobile.com".to_string()
}

fn default_lam_budget() -> CallBudget {
    CallBudget {
        timeout_ms: 60_000,
        attempts: 2,
    }
}

impl Default for LamConfig {
    fn default() -> Self {
        Self {
            base_url: default_lam_base_url(),
            username: String::new(),
            password: String::new(),
            budget: default_lam_budget(),
        }
    }
}

/// General-purpose STT provider (OpenAI-compatible transcription endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSttConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_stt_model")]
    pub model: String,

    #[serde(default)]
    pub budget: CallBudget,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

impl Default for GeneralSttConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_stt_model(),
            budget: CallBudget::default(),
        }
    }
}

/// General-purpose TTS provider (OpenAI-compatible speech endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralTtsConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_tts_model")]
    pub model: String,

    #[serde(default = "default_tts_voice")]
    pub voice: String,

    #[serde(default)]
    pub budget: CallBudget,
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

impl Default for GeneralTtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_tts_model(),
            voice: default_tts_voice(),
            budget: CallBudget::default(),
        }
    }
}

/// Spoken-language classifier sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LidConfig {
    #[serde(default = "default_lid_base_url")]
    pub base_url: String,

    #[serde(default = "default_lid_budget")]
    pub budget: CallBudget,
}

fn default_lid_base_url() -> String {
    "http://127.0.0.1:8091".to_string()
}

fn default_lid_budget() -> CallBudget {
    CallBudget {
        timeout_ms: 10_000,
        attempts: 2,
    }
}

impl Default for LidConfig {
    fn default() -> Self {
        Self {
            base_url: default_lid_base_url(),
            budget: default_lid_budget(),
        }
    }
}

/// Language model provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Set via TONTOUMA__PROVIDERS__LLM__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_budget")]
    pub budget: CallBudget,
}

fn default_llm_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_llm_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_llm_max_tokens() -> usize {
    1024
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_budget() -> CallBudget {
    CallBudget {
        timeout_ms: 60_000,
        attempts: 2,
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_llm_max_tokens(),
            temperature: default_llm_temperature(),
            budget: default_llm_budget(),
        }
    }
}

/// Embedding provider (Ollama-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embeddings_base_url")]
    pub base_url: String,

    #[serde(default = "default_embeddings_model")]
    pub model: String,

    #[serde(default)]
    pub budget: CallBudget,
}

fn default_embeddings_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embeddings_model() -> String {
    "qwen3-embedding:0.6b".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_embeddings_base_url(),
            model: default_embeddings_model(),
            budget: CallBudget::default(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Enable knowledge retrieval
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Number of passages injected into the prompt
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_true() -> bool {
    true
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: default_top_k(),
        }
    }
}

impl RetrievalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_k".to_string(),
                message: "must be at least 1 when retrieval is enabled".to_string(),
            });
        }
        Ok(())
    }
}

/// Audio artifact storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStoreConfig {
    /// Directory where synthesized and uploaded audio files are written
    #[serde(default = "default_audio_dir")]
    pub dir: String,
}

fn default_audio_dir() -> String {
    "uploads".to_string()
}

impl Default for AudioStoreConfig {
    fn default() -> Self {
        Self {
            dir: default_audio_dir(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (TONTOUMA__ prefix, __ separator)
/// 2. config/{env} (if env specified)
/// 3. config/default
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("TONTOUMA")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.languages.bridge_language(), Language::Wolof);
        assert_eq!(settings.languages.working_language(), Language::French);
        assert_eq!(settings.dialogue.max_tool_rounds, 5);
        assert_eq!(settings.retrieval.top_k, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_language_validation() {
        let mut settings = Settings::default();
        settings.languages.bridge = "klingon".to_string();
        assert!(settings.validate().is_err());

        settings.languages.bridge = "fr".to_string();
        // Bridge must differ from the working language.
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_dialogue_validation() {
        let mut settings = Settings::default();
        settings.dialogue.max_tool_rounds = 0;
        assert!(settings.validate().is_err());

        settings.dialogue.max_tool_rounds = 50;
        assert!(settings.validate().is_err());

        settings.dialogue.max_tool_rounds = 5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_strict_environment_requires_credentials() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());

        settings.providers.llm.api_key = Some("key".to_string());
        settings.providers.lam.username = "user".to_string();
        settings.providers.lam.password = "pass".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_retrieval_validation() {
        let mut settings = Settings::default();
        settings.retrieval.top_k = 0;
        assert!(settings.validate().is_err());

        settings.retrieval.enabled = false;
        assert!(settings.validate().is_ok());
    }
}
