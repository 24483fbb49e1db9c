//! Request orchestration
//!
//! The exposed surface of the engine: one entry point for text messages,
//! one for voice messages. Per request: resolve the effective language,
//! normalize input through the translation bridge, persist the user
//! message, retrieve knowledge context, run the dialogue engine, restore
//! the display language, synthesize audio, persist the assistant message.
//!
//! Every dependency is injected at construction; the only ambient state is
//! the operator's global language override, which each request snapshots
//! once at entry.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::{DialogueEngine, DialogueRequest};
use tontouma_core::{
    resolve_language, AudioArtifact, AudioPayload, AudioStore, EntityDirectory,
    GlobalLanguageOverride, Language, MessageBody, MessageRole, NewMessage, SessionStore,
    Speaker, Session, StoreError,
};
use tontouma_rag::{format_context, Retriever};
use tontouma_speech::SpeechGateway;
use tontouma_translation::TranslationBridge;

/// Orchestrator failures surfaced to the transport layer.
///
/// `NotFound` is the only rejection; provider faults degrade inside the
/// flow and still produce a well-formed reply.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("instance not found: {0}")]
    NotFound(Uuid),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The reply returned for every handled message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub speaker_id: Uuid,
    pub session_id: Uuid,
    /// What the user said, in the display language
    pub transcript: String,
    /// The assistant answer, in the display language
    pub response_text: String,
    /// Synthesized rendering of the answer, when synthesis succeeded
    pub response_audio: Option<AudioArtifact>,
    /// Effective language of the exchange
    pub language: Language,
}

/// Orchestrator dependencies, injected once at startup
pub struct OrchestratorDeps {
    pub entities: Arc<dyn EntityDirectory>,
    pub sessions: Arc<dyn SessionStore>,
    pub audio_store: Arc<dyn AudioStore>,
    pub speech: Arc<SpeechGateway>,
    pub bridge: Arc<TranslationBridge>,
    /// `None` disables retrieval
    pub retriever: Option<Arc<Retriever>>,
    pub engine: DialogueEngine,
    pub global_language: Arc<GlobalLanguageOverride>,
    /// Past turns replayed into the prompt
    pub history_turns: usize,
    pub working_language: Language,
}

/// Conversational orchestration engine
pub struct Orchestrator {
    deps: OrchestratorDeps,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps) -> Self {
        Self { deps }
    }

    /// Admin surface: the process-wide forced language.
    pub fn global_language(&self) -> &GlobalLanguageOverride {
        &self.deps.global_language
    }

    /// Handle a text message.
    pub async fn handle_text_message(
        &self,
        instance_id: Uuid,
        text: &str,
        forced_language: Option<&str>,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, AgentError> {
        let instance = self
            .deps
            .entities
            .instance(instance_id)
            .await?
            .ok_or(AgentError::NotFound(instance_id))?;

        // Snapshot the operator override once; later admin writes only
        // affect subsequent requests.
        let global = self.deps.global_language.get();

        // Text carries no audio to classify; without an override the
        // exchange runs in the working language.
        let language = resolve_language(forced_language, global, self.deps.working_language);

        let (speaker, session) = self.resolve_session(instance.entity_id, session_id).await?;

        let reply = self
            .converse(&instance_id, instance.entity_id, &session, language, text, None)
            .await?;

        Ok(ChatReply {
            speaker_id: speaker.id,
            session_id: session.id,
            ..reply
        })
    }

    /// Handle a voice message.
    pub async fn handle_voice_message(
        &self,
        instance_id: Uuid,
        audio: AudioPayload,
        forced_language: Option<&str>,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, AgentError> {
        let instance = self
            .deps
            .entities
            .instance(instance_id)
            .await?
            .ok_or(AgentError::NotFound(instance_id))?;

        let global = self.deps.global_language.get();

        // A per-request or operator override skips detection entirely;
        // otherwise the gateway classifies the audio.
        let forced = forced_language
            .and_then(Language::parse_override)
            .or(global);

        let (speaker, session) = self.resolve_session(instance.entity_id, session_id).await?;

        let transcription = match self.deps.speech.transcribe(&audio, forced).await {
            Ok(transcription) => transcription,
            Err(e) => {
                // No usable transcript: degrade to the apologetic reply in
                // the best language guess we have.
                tracing::error!(error = %e, "Transcription failed, degrading reply");
                let language = forced.unwrap_or(self.deps.working_language);
                return Ok(self
                    .degraded_reply(&speaker, &session, language, String::new())
                    .await);
            }
        };

        // Keep the inbound audio alongside the user message.
        let inbound_audio = match self.deps.audio_store.store(audio.data, audio.format).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                tracing::warn!(error = %e, "Could not store inbound audio");
                None
            }
        };

        let reply = self
            .converse(
                &instance_id,
                instance.entity_id,
                &session,
                transcription.language,
                &transcription.text,
                inbound_audio,
            )
            .await?;

        Ok(ChatReply {
            speaker_id: speaker.id,
            session_id: session.id,
            ..reply
        })
    }

    async fn resolve_session(
        &self,
        entity_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<(Speaker, Session), AgentError> {
        let speaker = self.deps.sessions.get_or_create_default_speaker().await?;

        let session = match session_id {
            Some(pinned) => self
                .deps
                .sessions
                .get_session(pinned)
                .await?
                .filter(|s| s.entity_id == entity_id)
                .ok_or(AgentError::SessionNotFound(pinned))?,
            None => {
                self.deps
                    .sessions
                    .get_or_create_active_session(entity_id, speaker.id)
                    .await?
            }
        };

        Ok((speaker, session))
    }

    /// Shared conversational flow once language and session are resolved.
    async fn converse(
        &self,
        instance_id: &Uuid,
        entity_id: Uuid,
        session: &Session,
        language: Language,
        display_text: &str,
        inbound_audio: Option<AudioArtifact>,
    ) -> Result<ChatReply, AgentError> {
        tracing::info!(
            instance_id = %instance_id,
            session_id = %session.id,
            language = language.code(),
            "Handling message"
        );

        let bridged = self.deps.bridge.applies_to(language);

        // Inbound normalization: the model only ever sees processing text.
        let processing_text = if bridged {
            self.deps.bridge.to_processing(display_text).await
        } else {
            display_text.to_string()
        };

        // History is captured before the new user message is appended so
        // the prompt does not duplicate the current utterance.
        let history = self
            .deps
            .sessions
            .history(session.id, self.deps.history_turns)
            .await?;

        let user_body = if bridged {
            MessageBody::bridged(display_text, processing_text.clone())
        } else {
            MessageBody::monolingual(display_text)
        };
        let mut user_message = NewMessage::new(session.id, MessageRole::User, user_body);
        if let Some(artifact) = inbound_audio {
            user_message = user_message.with_audio(artifact);
        }
        self.deps.sessions.append_message(user_message).await?;

        // Retrieval is read-only and optional; failures degrade to "no
        // context" rather than aborting the request.
        let context = match &self.deps.retriever {
            Some(retriever) => match retriever.retrieve(entity_id, &processing_text).await {
                Ok(passages) => format_context(&passages),
                Err(e) => {
                    tracing::warn!(error = %e, "Retrieval failed, continuing without context");
                    None
                }
            },
            None => None,
        };

        let system_prompt = self.system_prompt(entity_id, language).await;

        let response_processing = self
            .deps
            .engine
            .respond(DialogueRequest {
                entity_id,
                session_id: session.id,
                system_prompt: &system_prompt,
                context,
                history: &history,
                user_text: &processing_text,
            })
            .await;

        // Outbound restoration: only the display language reaches the user
        // and the synthesizer.
        let response_display = if bridged {
            self.deps.bridge.to_display(&response_processing).await
        } else {
            response_processing.clone()
        };

        let response_audio = match self
            .deps
            .speech
            .synthesize(&response_display, language)
            .await
        {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                tracing::warn!(error = %e, "Synthesis failed, replying without audio");
                None
            }
        };

        let assistant_body = if bridged {
            MessageBody::bridged(response_display.clone(), response_processing)
        } else {
            MessageBody::monolingual(response_display.clone())
        };
        let mut assistant_message =
            NewMessage::new(session.id, MessageRole::Assistant, assistant_body);
        if let Some(artifact) = &response_audio {
            assistant_message = assistant_message.with_audio(artifact.clone());
        }
        self.deps.sessions.append_message(assistant_message).await?;

        Ok(ChatReply {
            speaker_id: session.speaker_id,
            session_id: session.id,
            transcript: display_text.to_string(),
            response_text: response_display,
            response_audio,
            language,
        })
    }

    /// Build the apologetic reply used when no transcript could be produced.
    async fn degraded_reply(
        &self,
        speaker: &Speaker,
        session: &Session,
        language: Language,
        transcript: String,
    ) -> ChatReply {
        let text = crate::engine::FALLBACK_REPLY.to_string();
        let display = if self.deps.bridge.applies_to(language) {
            self.deps.bridge.to_display(&text).await
        } else {
            text
        };

        let response_audio = self
            .deps
            .speech
            .synthesize(&display, language)
            .await
            .ok();

        ChatReply {
            speaker_id: speaker.id,
            session_id: session.id,
            transcript,
            response_text: display,
            response_audio,
            language,
        }
    }

    async fn system_prompt(&self, entity_id: Uuid, language: Language) -> String {
        let configured = self
            .deps
            .entities
            .system_prompt(entity_id)
            .await
            .unwrap_or_default();

        let mut prompt = match configured {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => {
                let name = self
                    .deps
                    .entities
                    .entity_name(entity_id)
                    .await
                    .unwrap_or_else(|_| "cette institution".to_string());
                format!(
                    "Tu es l'assistant de {}. Tu aides les usagers à trouver des \
                     informations et à prendre des rendez-vous médicaux grâce aux \
                     outils mis à ta disposition. Réponds uniquement en texte brut, \
                     sans aucune mise en forme, car tes réponses peuvent être lues \
                     à voix haute.",
                    name
                )
            }
        };

        // The model works in the processing language; for non-bridged
        // foreign languages it must answer in the user's language directly.
        if language != self.deps.working_language && !self.deps.bridge.applies_to(language) {
            prompt.push_str(&format!(
                "\n\nL'utilisateur s'exprime en {}. Réponds dans cette langue.",
                language.name()
            ));
        }

        prompt
    }
}
