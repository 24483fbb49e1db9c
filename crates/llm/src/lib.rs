//! Language model integration for the Tontouma conversational engine

pub mod backend;
pub mod claude;
pub mod prompt;

pub use backend::{LlmBackend, ModelReply, StopKind};
pub use claude::{ClaudeBackend, ClaudeConfig};
pub use prompt::{Message, Role, ToolBuilder, ToolDefinition};

use thiserror::Error;

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
