//! End-to-end orchestration tests with scripted providers
//!
//! Everything external is mocked: model, speech providers, classifier,
//! translator, audio storage. The stores, scheduler, tools, engine and
//! orchestrator are the real implementations.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use tontouma_agent::{
    AgentError, DialogueEngine, EngineConfig, MemoryEntityDirectory, MemorySessionStore,
    Orchestrator, OrchestratorDeps, FALLBACK_REPLY,
};
use tontouma_core::llm_types::ToolCall;
use tontouma_core::{
    AudioArtifact, AudioFormat, AudioPayload, AudioStore, GlobalLanguageOverride, Language,
    LanguageGuess, LanguageIdentifier, MessageRole, ProviderError, SessionStore, SpeechToText,
    StoreError, TextToSpeech, Translator,
};
use tontouma_llm::{LlmBackend, LlmError, Message, ModelReply, StopKind, ToolDefinition};
use tontouma_scheduling::{AppointmentScheduler, Doctor, MemorySchedulingStore, TimeSlot};
use tontouma_speech::SpeechGateway;
use tontouma_tools::scheduling_registry;
use tontouma_translation::TranslationBridge;

// ---------------------------------------------------------------------------
// Scripted providers
// ---------------------------------------------------------------------------

struct ScriptedLlm {
    replies: Mutex<VecDeque<ModelReply>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<ModelReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }

    fn text(text: &str) -> ModelReply {
        ModelReply {
            text: text.to_string(),
            tool_calls: Vec::new(),
            stop: StopKind::Complete,
        }
    }

    fn tool_call(name: &str, arguments: serde_json::Value) -> ModelReply {
        let arguments: HashMap<String, serde_json::Value> = arguments
            .as_object()
            .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        ModelReply {
            text: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: name.to_string(),
                arguments,
            }],
            stop: StopKind::ToolUse,
        }
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    async fn generate(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError> {
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| LlmError::Api("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Always requests the same tool, forever.
struct LoopingLlm {
    arguments: serde_json::Value,
}

#[async_trait]
impl LlmBackend for LoopingLlm {
    async fn generate(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError> {
        Ok(ScriptedLlm::tool_call(
            "get_available_slots",
            self.arguments.clone(),
        ))
    }

    fn model_name(&self) -> &str {
        "looping"
    }
}

struct FixedStt {
    text: Option<String>,
}

#[async_trait]
impl SpeechToText for FixedStt {
    async fn transcribe(
        &self,
        _audio: &AudioPayload,
        _language: Option<Language>,
    ) -> Result<String, ProviderError> {
        self.text
            .clone()
            .ok_or_else(|| ProviderError::Network("stt down".to_string()))
    }

    fn provider_name(&self) -> &str {
        "fixed-stt"
    }
}

struct FixedTts {
    fail: bool,
}

#[async_trait]
impl TextToSpeech for FixedTts {
    async fn synthesize(
        &self,
        _text: &str,
        language: Language,
    ) -> Result<AudioArtifact, ProviderError> {
        if self.fail {
            Err(ProviderError::Network("tts down".to_string()))
        } else {
            Ok(AudioArtifact::new(
                format!("reply-{}.mp3", language.code()),
                "audio/mpeg",
            ))
        }
    }

    fn provider_name(&self) -> &str {
        "fixed-tts"
    }
}

struct FixedLid {
    code: &'static str,
}

#[async_trait]
impl LanguageIdentifier for FixedLid {
    async fn identify(&self, _audio: &AudioPayload) -> Result<LanguageGuess, ProviderError> {
        Ok(LanguageGuess {
            code: self.code.to_string(),
            confidence: 0.95,
        })
    }

    fn provider_name(&self) -> &str {
        "fixed-lid"
    }
}

/// Marks the direction of every translation so tests can assert routing.
struct TaggingTranslator {
    fail: bool,
}

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        if self.fail {
            Err(ProviderError::Network("translator down".to_string()))
        } else {
            Ok(format!("{}>{}:{}", from.code(), to.code(), text))
        }
    }

    fn provider_name(&self) -> &str {
        "tagging"
    }
}

struct NullAudioStore;

#[async_trait]
impl AudioStore for NullAudioStore {
    async fn store(
        &self,
        _bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<AudioArtifact, StoreError> {
        Ok(AudioArtifact::new(
            format!("stored.{}", format.extension()),
            format.mime(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    orchestrator: Orchestrator,
    sessions: Arc<MemorySessionStore>,
    scheduling: Arc<MemorySchedulingStore>,
    instance_id: Uuid,
    doctor_id: Uuid,
}

fn next_monday() -> NaiveDate {
    let today = Utc::now().date_naive();
    let mut date = today + Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

struct HarnessOptions {
    llm: Arc<dyn LlmBackend>,
    translator_fails: bool,
    stt_text: Option<String>,
    lid_code: &'static str,
}

fn harness(options: HarnessOptions) -> Harness {
    let sessions = Arc::new(MemorySessionStore::new());
    let entities = Arc::new(MemoryEntityDirectory::new());
    let entity_id = entities.add_entity("Centre de Santé de Hann Bel-Air", None);
    let instance_id = entities.add_instance(entity_id, "guichet");

    let scheduling = Arc::new(MemorySchedulingStore::new());
    let doctor = Doctor {
        id: Uuid::new_v4(),
        entity_id,
        first_name: "Awa".to_string(),
        last_name: "Ndiaye".to_string(),
        specialty: Some("Cardiologie".to_string()),
        is_active: true,
        consultation_minutes: 30,
    };
    let doctor_id = doctor.id;
    scheduling.add_doctor(doctor);
    scheduling.add_time_slot(TimeSlot::weekly(doctor_id, Weekday::Mon, t(9, 0), t(11, 0)));

    let scheduler = Arc::new(AppointmentScheduler::new(scheduling.clone()));
    let registry = Arc::new(scheduling_registry(scheduler));

    let engine = DialogueEngine::new(
        options.llm,
        registry,
        sessions.clone(),
        EngineConfig::default(),
    );

    let speech = Arc::new(SpeechGateway::new(
        Arc::new(FixedLid {
            code: options.lid_code,
        }),
        Arc::new(FixedStt {
            text: options.stt_text.clone(),
        }),
        Arc::new(FixedStt {
            text: options.stt_text,
        }),
        Arc::new(FixedTts { fail: false }),
        Arc::new(FixedTts { fail: false }),
        Language::Wolof,
        Language::French,
    ));

    let bridge = Arc::new(TranslationBridge::new(
        Arc::new(TaggingTranslator {
            fail: options.translator_fails,
        }),
        Language::Wolof,
        Language::French,
    ));

    let orchestrator = Orchestrator::new(OrchestratorDeps {
        entities,
        sessions: sessions.clone(),
        audio_store: Arc::new(NullAudioStore),
        speech,
        bridge,
        retriever: None,
        engine,
        global_language: Arc::new(GlobalLanguageOverride::new()),
        history_turns: 10,
        working_language: Language::French,
    });

    Harness {
        orchestrator,
        sessions,
        scheduling,
        instance_id,
        doctor_id,
    }
}

fn default_options(llm: Arc<dyn LlmBackend>) -> HarnessOptions {
    HarnessOptions {
        llm,
        translator_fails: false,
        stt_text: Some("je voudrais un rendez-vous".to_string()),
        lid_code: "fr",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_text_message_round_trip() {
    let llm = ScriptedLlm::new(vec![
        ScriptedLlm::text("Bonjour, comment puis-je vous aider ?"),
        ScriptedLlm::text("Très bien."),
    ]);
    let h = harness(default_options(llm));

    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "Bonjour", None, None)
        .await
        .unwrap();

    assert_eq!(reply.response_text, "Bonjour, comment puis-je vous aider ?");
    assert_eq!(reply.language, Language::French);
    assert_eq!(reply.transcript, "Bonjour");
    assert_eq!(
        reply.response_audio.as_ref().unwrap().path,
        "reply-fr.mp3"
    );
    // user + assistant
    assert_eq!(h.sessions.message_count(), 2);

    // The follow-up lands in the same implicitly resumed session.
    let second = h
        .orchestrator
        .handle_text_message(h.instance_id, "Merci", None, None)
        .await
        .unwrap();
    assert_eq!(second.session_id, reply.session_id);
    assert_eq!(second.speaker_id, reply.speaker_id);
    assert_eq!(h.sessions.message_count(), 4);
}

#[tokio::test]
async fn test_unknown_instance_is_rejected() {
    let h = harness(default_options(ScriptedLlm::new(vec![])));
    let err = h
        .orchestrator
        .handle_text_message(Uuid::new_v4(), "Bonjour", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_pinned_session_is_rejected() {
    let h = harness(default_options(ScriptedLlm::new(vec![])));
    let err = h
        .orchestrator
        .handle_text_message(h.instance_id, "Bonjour", None, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_global_override_and_per_request_priority() {
    let llm = ScriptedLlm::new(vec![
        ScriptedLlm::text("réponse une"),
        ScriptedLlm::text("réponse deux"),
    ]);
    let h = harness(default_options(llm));

    h.orchestrator
        .global_language()
        .set(Some(Language::English));

    // Global override applies when the request carries none.
    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "hello", None, None)
        .await
        .unwrap();
    assert_eq!(reply.language, Language::English);

    // A per-request override beats the global one.
    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "hola", Some("es"), None)
        .await
        .unwrap();
    assert_eq!(reply.language, Language::Spanish);
}

#[tokio::test]
async fn test_bridge_round_trip_stores_dual_content() {
    let llm = ScriptedLlm::new(vec![ScriptedLlm::text("Voici les horaires.")]);
    let h = harness(default_options(llm));

    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "naka nga def", Some("wo"), None)
        .await
        .unwrap();

    assert_eq!(reply.language, Language::Wolof);
    // Outbound reply was translated back into Wolof for display.
    assert_eq!(reply.response_text, "fr>wo:Voici les horaires.");
    // Synthesis ran against the display language.
    assert_eq!(reply.response_audio.unwrap().path, "reply-wo.mp3");

    let history = h.sessions.history(reply.session_id, 10).await.unwrap();
    assert_eq!(history.len(), 2);

    // User message: original Wolof on display, French translation for the model.
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].body.display, "naka nga def");
    assert_eq!(
        history[0].body.processing.as_deref(),
        Some("wo>fr:naka nga def")
    );

    // Assistant message: Wolof display, French source kept as processing text.
    assert_eq!(history[1].role, MessageRole::Assistant);
    assert_eq!(history[1].body.display, "fr>wo:Voici les horaires.");
    assert_eq!(
        history[1].body.processing.as_deref(),
        Some("Voici les horaires.")
    );
}

#[tokio::test]
async fn test_bridge_translator_failure_keeps_original_text() {
    let llm = ScriptedLlm::new(vec![ScriptedLlm::text("Réponse.")]);
    let mut options = default_options(llm);
    options.translator_fails = true;
    let h = harness(options);

    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "naka nga def", Some("wo"), None)
        .await
        .unwrap();

    // Both directions fell back to the untranslated text.
    assert_eq!(reply.response_text, "Réponse.");
    let history = h.sessions.history(reply.session_id, 10).await.unwrap();
    assert_eq!(history[0].body.processing.as_deref(), Some("naka nga def"));
}

#[tokio::test]
async fn test_tool_loop_exhaustion_degrades_to_fallback() {
    let llm = Arc::new(LoopingLlm {
        arguments: json!({ "date": next_monday().to_string() }),
    });
    let h = harness(default_options(llm));

    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "des créneaux ?", None, None)
        .await
        .unwrap();

    assert_eq!(reply.response_text, FALLBACK_REPLY);

    let history = h.sessions.history(reply.session_id, 20).await.unwrap();
    let tool_messages = history
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .count();
    assert_eq!(tool_messages, 5);
    // user + five tool results + assistant fallback
    assert_eq!(history.len(), 7);
}

#[tokio::test]
async fn test_booking_through_the_tool_loop() {
    let h_date = next_monday().to_string();
    let llm = ScriptedLlm::new(vec![
        ScriptedLlm::tool_call(
            "book_appointment",
            json!({
                "doctor_id": "placeholder",
                "date": h_date,
                "start_time": "09:00",
                "patient_name": "Moussa Diop",
                "patient_phone": "+221770000002",
            }),
        ),
        ScriptedLlm::text("Votre rendez-vous est pris pour lundi à 9h."),
    ]);
    let h = harness(default_options(llm.clone()));

    // Patch the scripted call with the real doctor id.
    {
        let mut replies = llm.replies.lock();
        if let Some(first) = replies.front_mut() {
            first.tool_calls[0]
                .arguments
                .insert("doctor_id".to_string(), json!(h.doctor_id.to_string()));
        }
    }

    let reply = h
        .orchestrator
        .handle_text_message(h.instance_id, "réserve-moi lundi 9h", None, None)
        .await
        .unwrap();

    assert_eq!(reply.response_text, "Votre rendez-vous est pris pour lundi à 9h.");
    assert_eq!(h.scheduling.appointment_count(), 1);

    let history = h.sessions.history(reply.session_id, 10).await.unwrap();
    let tool_message = history
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .expect("tool result persisted");
    assert!(tool_message.body.display.contains("\"success\":true"));
    assert!(tool_message.body.display.contains("Dr. Awa Ndiaye"));
}

#[tokio::test]
async fn test_voice_message_flow() {
    let llm = ScriptedLlm::new(vec![ScriptedLlm::text("Bien sûr, quel jour ?")]);
    let h = harness(default_options(llm));

    let reply = h
        .orchestrator
        .handle_voice_message(
            h.instance_id,
            AudioPayload::wav(vec![0u8; 128]),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(reply.transcript, "je voudrais un rendez-vous");
    assert_eq!(reply.language, Language::French);
    assert_eq!(reply.response_text, "Bien sûr, quel jour ?");
    assert!(reply.response_audio.is_some());

    // The inbound audio was kept with the user message.
    let history = h.sessions.history(reply.session_id, 10).await.unwrap();
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].audio.as_ref().unwrap().path, "stored.wav");
}

#[tokio::test]
async fn test_voice_transcription_failure_degrades() {
    let mut options = default_options(ScriptedLlm::new(vec![]));
    options.stt_text = None;
    let h = harness(options);

    let reply = h
        .orchestrator
        .handle_voice_message(
            h.instance_id,
            AudioPayload::wav(vec![0u8; 128]),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(reply.response_text, FALLBACK_REPLY);
    assert!(reply.transcript.is_empty());
    // Nothing was persisted for a request with no usable transcript.
    assert_eq!(h.sessions.message_count(), 0);
}

#[tokio::test]
async fn test_voice_detection_routes_to_wolof_chain() {
    let llm = ScriptedLlm::new(vec![ScriptedLlm::text("Réponse en français.")]);
    let mut options = default_options(llm);
    options.lid_code = "wo";
    options.stt_text = Some("dama bëgg rendez-vous".to_string());
    let h = harness(options);

    let reply = h
        .orchestrator
        .handle_voice_message(
            h.instance_id,
            AudioPayload::wav(vec![0u8; 128]),
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(reply.language, Language::Wolof);
    // Reply crossed the bridge on the way out.
    assert_eq!(reply.response_text, "fr>wo:Réponse en français.");
}
