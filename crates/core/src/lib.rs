//! Core types and traits for the Tontouma conversational engine
//!
//! This crate provides the foundations shared by every other crate:
//! - Language vocabulary, request-level language resolution, and the
//!   process-wide forced-language handle
//! - Session, speaker and message types with dual-language content
//! - Audio payload and artifact types
//! - Wire types for model tool calling
//! - Traits for pluggable providers (STT, TTS, LID, translation, retrieval)
//!   and external stores (sessions/messages, entity configuration)
//! - Error taxonomy for provider and store failures

pub mod audio;
pub mod error;
pub mod language;
pub mod llm_types;
pub mod message;
pub mod traits;

pub use audio::{AudioArtifact, AudioFormat, AudioPayload, WavSummary};
pub use error::{ProviderError, StoreError};
pub use language::{resolve_language, GlobalLanguageOverride, Language};
pub use llm_types::{ToolCall, ToolDefinition};
pub use message::{Message, MessageBody, MessageRole, NewMessage, Session, Speaker};
pub use traits::{
    AudioStore, Embedder, EntityDirectory, Instance, KnowledgeIndex, LanguageGuess,
    LanguageIdentifier, Passage, SessionStore, SpeechToText, TextToSpeech, Translator,
};
