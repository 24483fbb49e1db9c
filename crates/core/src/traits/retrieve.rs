//! Retrieval collaborator traits
//!
//! The vector index is external and read-only; ranking is owned by the
//! index, not re-implemented here.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retrieved knowledge passage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Source document title
    pub source: String,
    /// Passage text
    pub text: String,
    /// Similarity score as reported by the index
    pub score: f32,
}

/// Text embedding provider
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

/// Nearest-neighbor search over an entity's knowledge base
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// Return up to `top_k` passages ordered by decreasing relevance.
    async fn search(
        &self,
        entity_id: Uuid,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Passage>, ProviderError>;
}
