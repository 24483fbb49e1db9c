//! Session, speaker and message types
//!
//! Messages carry a tagged pair of contents: `display` is always in the
//! language shown (or read aloud) to the user, `processing` holds the
//! working-language counterpart whenever the translation bridge was active.
//! The model only ever sees processing text; the UI and speech synthesis
//! only ever see display text.

use crate::audio::AudioArtifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation participant role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    /// Raw tool results, replayed into model history but hidden from users
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Dual-language message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Text in the display language
    pub display: String,
    /// Working-language counterpart when a translation bridge was applied
    pub processing: Option<String>,
}

impl MessageBody {
    /// Content that was never bridged: one language serves both purposes.
    pub fn monolingual(text: impl Into<String>) -> Self {
        Self {
            display: text.into(),
            processing: None,
        }
    }

    /// Bridged content with distinct display and processing texts.
    pub fn bridged(display: impl Into<String>, processing: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            processing: Some(processing.into()),
        }
    }

    /// The text the model should see.
    pub fn processing_text(&self) -> &str {
        self.processing.as_deref().unwrap_or(&self.display)
    }
}

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub speaker_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(entity_id: Uuid, speaker_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id,
            speaker_id,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A speaker identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
    pub id: Uuid,
    /// Voice fingerprint hash when speaker identification produced one
    pub fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Speaker {
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::new_v4(),
            fingerprint: None,
            created_at: Utc::now(),
        }
    }
}

/// A stored conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub body: MessageBody,
    pub audio: Option<AudioArtifact>,
    pub created_at: DateTime<Utc>,
}

/// A message about to be appended to a session
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: Uuid,
    pub role: MessageRole,
    pub body: MessageBody,
    pub audio: Option<AudioArtifact>,
}

impl NewMessage {
    pub fn new(session_id: Uuid, role: MessageRole, body: MessageBody) -> Self {
        Self {
            session_id,
            role,
            body,
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: AudioArtifact) -> Self {
        self.audio = Some(audio);
        self
    }
}
