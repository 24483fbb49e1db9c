//! Retriever
//!
//! Composes the embedder and the knowledge index: embed the query, search
//! the entity's knowledge base, format the passages for the prompt.

use std::sync::Arc;
use uuid::Uuid;

use tontouma_core::{Embedder, KnowledgeIndex, Passage, ProviderError};

/// Query-time retrieval over an entity's knowledge base
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn KnowledgeIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn KnowledgeIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Retrieve the passages most relevant to `query` for an entity.
    pub async fn retrieve(
        &self,
        entity_id: Uuid,
        query: &str,
    ) -> Result<Vec<Passage>, ProviderError> {
        let vector = self.embedder.embed(query).await?;
        let passages = self.index.search(entity_id, &vector, self.top_k).await?;

        tracing::debug!(
            entity_id = %entity_id,
            passages = passages.len(),
            model = self.embedder.model_name(),
            "Retrieved knowledge passages"
        );

        Ok(passages)
    }
}

/// Format passages into a context block for the prompt.
///
/// Returns `None` when there is nothing to cite; the dialogue engine
/// substitutes its explicit no-information marker in that case.
pub fn format_context(passages: &[Passage]) -> Option<String> {
    if passages.is_empty() {
        return None;
    }
    let formatted = passages
        .iter()
        .map(|p| format!("[{}] {}", p.source, p.text))
        .collect::<Vec<_>>()
        .join("\n");
    Some(formatted)
}
