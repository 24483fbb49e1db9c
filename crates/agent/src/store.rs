//! In-memory session store and entity directory
//!
//! Backing implementations for development and tests; production
//! deployments plug their own stores in through the core traits.

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use uuid::Uuid;

use tontouma_core::{
    EntityDirectory, Instance, Message, NewMessage, Session, Speaker, SessionStore, StoreError,
};

/// In-memory session and message store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, Session>,
    /// (entity, speaker) -> active session id
    active_index: DashMap<(Uuid, Uuid), Uuid>,
    /// Append order is creation order
    messages: Mutex<Vec<Message>>,
    default_speaker: OnceCell<Speaker>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored messages across sessions. Test support.
    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_or_create_active_session(
        &self,
        entity_id: Uuid,
        speaker_id: Uuid,
    ) -> Result<Session, StoreError> {
        let session_id = *self
            .active_index
            .entry((entity_id, speaker_id))
            .or_insert_with(|| {
                let session = Session::new(entity_id, speaker_id);
                let id = session.id;
                self.sessions.insert(id, session);
                tracing::info!(session_id = %id, entity_id = %entity_id, "Created session");
                id
            })
            .value();

        self.sessions
            .get(&session_id)
            .map(|s| s.value().clone())
            .ok_or_else(|| StoreError::Backend("active index points at missing session".to_string()))
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(&session_id).map(|s| s.value().clone()))
    }

    async fn deactivate_session(&self, session_id: Uuid) -> Result<(), StoreError> {
        let Some(mut session) = self.sessions.get_mut(&session_id) else {
            return Err(StoreError::NotFound(format!("session {}", session_id)));
        };
        session.is_active = false;
        let key = (session.entity_id, session.speaker_id);
        drop(session);
        // Only clear the index when it still points at this session; a newer
        // active session for the same pair must keep its slot.
        self.active_index
            .remove_if(&key, |_, active_id| *active_id == session_id);
        Ok(())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let stored = Message {
            id: Uuid::new_v4(),
            session_id: message.session_id,
            role: message.role,
            body: message.body,
            audio: message.audio,
            created_at: chrono::Utc::now(),
        };
        self.messages.lock().push(stored.clone());
        Ok(stored)
    }

    async fn history(&self, session_id: Uuid, limit: usize) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock();
        let of_session: Vec<Message> = messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        let start = of_session.len().saturating_sub(limit);
        Ok(of_session[start..].to_vec())
    }

    async fn get_or_create_default_speaker(&self) -> Result<Speaker, StoreError> {
        // OnceCell makes concurrent first use collapse onto a single row.
        Ok(self.default_speaker.get_or_init(Speaker::anonymous).clone())
    }
}

struct EntityRecord {
    name: String,
    system_prompt: Option<String>,
}

/// In-memory entity configuration directory
#[derive(Default)]
pub struct MemoryEntityDirectory {
    entities: DashMap<Uuid, EntityRecord>,
    instances: DashMap<Uuid, Instance>,
}

impl MemoryEntityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity; returns its id.
    pub fn add_entity(&self, name: impl Into<String>, system_prompt: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.entities.insert(
            id,
            EntityRecord {
                name: name.into(),
                system_prompt,
            },
        );
        id
    }

    /// Register an instance of an entity; returns its id.
    pub fn add_instance(&self, entity_id: Uuid, name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.instances.insert(
            id,
            Instance {
                id,
                entity_id,
                name: name.into(),
            },
        );
        id
    }
}

#[async_trait]
impl EntityDirectory for MemoryEntityDirectory {
    async fn instance(&self, instance_id: Uuid) -> Result<Option<Instance>, StoreError> {
        Ok(self.instances.get(&instance_id).map(|i| i.value().clone()))
    }

    async fn system_prompt(&self, entity_id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(self
            .entities
            .get(&entity_id)
            .and_then(|e| e.value().system_prompt.clone()))
    }

    async fn entity_name(&self, entity_id: Uuid) -> Result<String, StoreError> {
        self.entities
            .get(&entity_id)
            .map(|e| e.value().name.clone())
            .ok_or_else(|| StoreError::NotFound(format!("entity {}", entity_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tontouma_core::{MessageBody, MessageRole};

    #[tokio::test]
    async fn test_active_session_is_reused() {
        let store = MemorySessionStore::new();
        let entity = Uuid::new_v4();
        let speaker = Uuid::new_v4();

        let first = store
            .get_or_create_active_session(entity, speaker)
            .await
            .unwrap();
        let second = store
            .get_or_create_active_session(entity, speaker)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        // A different speaker gets a different session.
        let other = store
            .get_or_create_active_session(entity, Uuid::new_v4())
            .await
            .unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_deactivation_forces_new_session() {
        let store = MemorySessionStore::new();
        let entity = Uuid::new_v4();
        let speaker = Uuid::new_v4();

        let first = store
            .get_or_create_active_session(entity, speaker)
            .await
            .unwrap();
        store.deactivate_session(first.id).await.unwrap();

        // The old session still exists, deactivated, never deleted.
        let stored = store.get_session(first.id).await.unwrap().unwrap();
        assert!(!stored.is_active);

        let next = store
            .get_or_create_active_session(entity, speaker)
            .await
            .unwrap();
        assert_ne!(first.id, next.id);
    }

    #[tokio::test]
    async fn test_history_order_and_limit() {
        let store = MemorySessionStore::new();
        let session_id = Uuid::new_v4();

        for i in 0..5 {
            store
                .append_message(NewMessage::new(
                    session_id,
                    MessageRole::User,
                    MessageBody::monolingual(format!("m{}", i)),
                ))
                .await
                .unwrap();
        }

        let history = store.history(session_id, 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].body.display, "m2");
        assert_eq!(history[2].body.display, "m4");

        let other = store.history(Uuid::new_v4(), 3).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_default_speaker_is_idempotent_under_races() {
        let store = Arc::new(MemorySessionStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.get_or_create_default_speaker().await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_entity_directory() {
        let directory = MemoryEntityDirectory::new();
        let entity_id = directory.add_entity("Mairie de Hann Bel-Air", Some("prompt".to_string()));
        let instance_id = directory.add_instance(entity_id, "guichet");

        let instance = directory.instance(instance_id).await.unwrap().unwrap();
        assert_eq!(instance.entity_id, entity_id);
        assert_eq!(
            directory.system_prompt(entity_id).await.unwrap(),
            Some("prompt".to_string())
        );
        assert_eq!(
            directory.entity_name(entity_id).await.unwrap(),
            "Mairie de Hann Bel-Air"
        );
        assert!(directory.instance(Uuid::new_v4()).await.unwrap().is_none());
    }
}
