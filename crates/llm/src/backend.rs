//! Model backend contract

use crate::prompt::Message;
use crate::LlmError;
use async_trait::async_trait;
use tontouma_core::llm_types::{ToolCall, ToolDefinition};

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Natural end of the reply
    Complete,
    /// Output truncated at the token limit
    Length,
    /// The model requested one or more tool invocations
    ToolUse,
}

/// A parsed model reply
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Text content, possibly empty when the model only called tools
    pub text: String,
    /// Structured function invocations requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// Stop reason
    pub stop: StopKind,
}

impl ModelReply {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Language model backend
///
/// One call per dialogue round; the bounded tool loop lives above this
/// trait, in the dialogue engine.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a reply, offering the given tools to the model.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}
