//! Session/message store and entity configuration contracts
//!
//! The orchestration core never owns persistence; it talks to these
//! collaborators and treats them as authoritative.

use crate::audio::{AudioArtifact, AudioFormat};
use crate::error::StoreError;
use crate::message::{Message, NewMessage, Session, Speaker};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deployed chatbot surface of a tenant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub name: String,
}

/// Session lookup/creation and ordered message history
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Find the active session for (entity, speaker), creating one if none
    /// exists. At most one implicitly-resumed active session exists per pair.
    async fn get_or_create_active_session(
        &self,
        entity_id: Uuid,
        speaker_id: Uuid,
    ) -> Result<Session, StoreError>;

    /// Look up a session pinned explicitly by the caller.
    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError>;

    /// Deactivate a session. Sessions are never hard-deleted.
    async fn deactivate_session(&self, session_id: Uuid) -> Result<(), StoreError>;

    /// Append a message and return the stored row.
    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Last `limit` messages of a session in creation order, tool messages
    /// included.
    async fn history(&self, session_id: Uuid, limit: usize) -> Result<Vec<Message>, StoreError>;

    /// The shared fallback speaker used when the transport supplies none.
    ///
    /// Must be idempotent under concurrent first use: a duplicate-create race
    /// resolves to a single winning row, losers receive the existing one.
    async fn get_or_create_default_speaker(&self) -> Result<Speaker, StoreError>;
}

/// Storage for synthesized and uploaded audio files
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Persist audio bytes and return a reference to the stored artifact.
    async fn store(
        &self,
        bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<AudioArtifact, StoreError>;
}

/// Tenant entity configuration
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Resolve an instance id; `None` means the instance does not exist.
    async fn instance(&self, instance_id: Uuid) -> Result<Option<Instance>, StoreError>;

    /// Entity-specific system prompt, when configured.
    async fn system_prompt(&self, entity_id: Uuid) -> Result<Option<String>, StoreError>;

    /// Display name of the entity.
    async fn entity_name(&self, entity_id: Uuid) -> Result<String, StoreError>;
}
