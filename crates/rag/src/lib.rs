//! Retrieval collaborator for the Tontouma conversational engine
//!
//! The engine consumes retrieval read-only: embed the query, ask the index
//! for the top passages, hand them to the prompt builder. Ranking belongs
//! to the index.

pub mod embeddings;
pub mod index;
pub mod retriever;

pub use embeddings::{HttpEmbedder, HttpEmbedderConfig};
pub use index::MemoryKnowledgeIndex;
pub use retriever::{format_context, Retriever};
