//! In-memory knowledge index
//!
//! Cosine-similarity search over per-entity passage vectors. The production
//! index is an external collaborator; this implementation backs tests,
//! development, and small single-node deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use tontouma_core::{KnowledgeIndex, Passage, ProviderError};

struct IndexedPassage {
    source: String,
    text: String,
    vector: Vec<f32>,
}

/// In-memory cosine-similarity index
#[derive(Default)]
pub struct MemoryKnowledgeIndex {
    passages: RwLock<HashMap<Uuid, Vec<IndexedPassage>>>,
}

impl MemoryKnowledgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a passage with its precomputed embedding.
    pub fn add_passage(
        &self,
        entity_id: Uuid,
        source: impl Into<String>,
        text: impl Into<String>,
        vector: Vec<f32>,
    ) {
        self.passages
            .write()
            .entry(entity_id)
            .or_default()
            .push(IndexedPassage {
                source: source.into(),
                text: text.into(),
                vector,
            });
    }

    pub fn passage_count(&self, entity_id: Uuid) -> usize {
        self.passages
            .read()
            .get(&entity_id)
            .map(|p| p.len())
            .unwrap_or(0)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl KnowledgeIndex for MemoryKnowledgeIndex {
    async fn search(
        &self,
        entity_id: Uuid,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Passage>, ProviderError> {
        let passages = self.passages.read();
        let Some(entries) = passages.get(&entity_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<Passage> = entries
            .iter()
            .map(|p| Passage {
                source: p.source.clone(),
                text: p.text.clone(),
                score: cosine_similarity(&p.vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
