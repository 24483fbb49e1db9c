//! Composition root
//!
//! Builds the orchestrator from settings and injected stores. Everything is
//! constructed exactly once here and threaded through constructors; no
//! service is created lazily at request time.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::engine::{DialogueEngine, EngineConfig};
use crate::orchestrator::{Orchestrator, OrchestratorDeps};
use tontouma_config::Settings;
use tontouma_core::{
    AudioStore, EntityDirectory, GlobalLanguageOverride, KnowledgeIndex, ProviderError,
    SessionStore, StoreError,
};
use tontouma_lam::{LamClient, LamClientConfig, LamSpeechToText, LamTextToSpeech, LamTranslator};
use tontouma_llm::{ClaudeBackend, ClaudeConfig, LlmError};
use tontouma_rag::{HttpEmbedder, HttpEmbedderConfig, Retriever};
use tontouma_scheduling::{AppointmentScheduler, SchedulingStore};
use tontouma_speech::{
    FsAudioStore, HttpLanguageClassifier, HttpLidConfig, HttpSpeechConfig, HttpStt, HttpTts,
    SpeechGateway,
};
use tontouma_tools::scheduling_registry;
use tontouma_translation::TranslationBridge;

/// External stores supplied by the embedding application
pub struct EngineStores {
    pub sessions: Arc<dyn SessionStore>,
    pub entities: Arc<dyn EntityDirectory>,
    pub scheduling: Arc<dyn SchedulingStore>,
    pub knowledge: Arc<dyn KnowledgeIndex>,
}

/// Startup failures
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("model setup failed: {0}")]
    Llm(#[from] LlmError),

    #[error("storage setup failed: {0}")]
    Store(#[from] StoreError),
}

/// Build the orchestrator from settings and stores.
pub fn build_orchestrator(
    settings: &Settings,
    stores: EngineStores,
) -> Result<Orchestrator, BootstrapError> {
    let bridge_language = settings.languages.bridge_language();
    let working_language = settings.languages.working_language();

    let artifacts: Arc<dyn AudioStore> = Arc::new(FsAudioStore::new(&settings.audio.dir)?);

    let lam = Arc::new(LamClient::new(LamClientConfig {
        base_url: settings.providers.lam.base_url.clone(),
        username: settings.providers.lam.username.clone(),
        password: settings.providers.lam.password.clone(),
        timeout_ms: settings.providers.lam.budget.timeout_ms,
        attempts: settings.providers.lam.budget.attempts,
    })?);

    let classifier = Arc::new(HttpLanguageClassifier::new(HttpLidConfig {
        base_url: settings.providers.lid.base_url.clone(),
        timeout_ms: settings.providers.lid.budget.timeout_ms,
        attempts: settings.providers.lid.budget.attempts,
    })?);

    let general_stt = Arc::new(HttpStt::new(HttpSpeechConfig {
        base_url: settings.providers.stt.base_url.clone(),
        api_key: settings.providers.stt.api_key.clone(),
        model: settings.providers.stt.model.clone(),
        voice: String::new(),
        timeout_ms: settings.providers.stt.budget.timeout_ms,
        attempts: settings.providers.stt.budget.attempts,
    })?);

    let general_tts = Arc::new(HttpTts::new(
        HttpSpeechConfig {
            base_url: settings.providers.tts.base_url.clone(),
            api_key: settings.providers.tts.api_key.clone(),
            model: settings.providers.tts.model.clone(),
            voice: settings.providers.tts.voice.clone(),
            timeout_ms: settings.providers.tts.budget.timeout_ms,
            attempts: settings.providers.tts.budget.attempts,
        },
        artifacts.clone(),
    )?);

    let speech = Arc::new(SpeechGateway::new(
        classifier,
        Arc::new(LamSpeechToText::new(lam.clone())),
        general_stt,
        Arc::new(LamTextToSpeech::new(lam.clone(), artifacts.clone())),
        general_tts,
        bridge_language,
        working_language,
    ));

    let bridge = Arc::new(TranslationBridge::new(
        Arc::new(LamTranslator::new(lam)),
        bridge_language,
        working_language,
    ));

    let retriever = if settings.retrieval.enabled {
        let embedder = Arc::new(HttpEmbedder::new(HttpEmbedderConfig {
            base_url: settings.providers.embeddings.base_url.clone(),
            model: settings.providers.embeddings.model.clone(),
            timeout_ms: settings.providers.embeddings.budget.timeout_ms,
            attempts: settings.providers.embeddings.budget.attempts,
        })?);
        Some(Arc::new(Retriever::new(
            embedder,
            stores.knowledge,
            settings.retrieval.top_k,
        )))
    } else {
        None
    };

    let llm = Arc::new(ClaudeBackend::new(ClaudeConfig {
        api_key: settings
            .providers
            .llm
            .api_key
            .clone()
            .unwrap_or_else(|| std::env::var("ANTHROPIC_API_KEY").unwrap_or_default()),
        model: settings.providers.llm.model.clone(),
        max_tokens: settings.providers.llm.max_tokens,
        temperature: settings.providers.llm.temperature,
        timeout: Duration::from_millis(settings.providers.llm.budget.timeout_ms),
        attempts: settings.providers.llm.budget.attempts,
        endpoint: settings.providers.llm.endpoint.clone(),
    })?);

    let scheduler = Arc::new(AppointmentScheduler::new(stores.scheduling));
    let registry = Arc::new(scheduling_registry(scheduler));

    let engine = DialogueEngine::new(
        llm,
        registry,
        stores.sessions.clone(),
        EngineConfig {
            max_tool_rounds: settings.dialogue.max_tool_rounds,
        },
    );

    tracing::info!(
        bridge = bridge_language.code(),
        working = working_language.code(),
        retrieval = settings.retrieval.enabled,
        "Engine assembled"
    );

    Ok(Orchestrator::new(OrchestratorDeps {
        entities: stores.entities,
        sessions: stores.sessions,
        audio_store: artifacts,
        speech,
        bridge,
        retriever,
        engine,
        global_language: Arc::new(GlobalLanguageOverride::new()),
        history_turns: settings.dialogue.history_turns,
        working_language,
    }))
}
