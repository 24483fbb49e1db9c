//! Claude backend
//!
//! Talks to the Anthropic Messages API. Tool invocations arrive as native
//! `tool_use` content blocks, so nothing here parses tool calls out of
//! free text. Tool results and replayed tool turns travel as user
//! messages, which is how the Messages API expects them.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::backend::{LlmBackend, ModelReply, StopKind};
use crate::prompt::{Message, Role};
use crate::LlmError;
use tontouma_core::llm_types::{ToolCall, ToolDefinition};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Claude backend
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts per generation, including the first
    pub attempts: u32,
    /// API endpoint, overridable for tests and proxies
    pub endpoint: String,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            attempts: 2,
            endpoint: "https://api.anthropic.com".to_string(),
        }
    }
}

/// Claude backend
pub struct ClaudeBackend {
    config: ClaudeConfig,
    client: Client,
}

impl ClaudeBackend {
    pub fn new(config: ClaudeConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "ANTHROPIC_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn request_body(&self, messages: &[Message], tools: &[ToolDefinition]) -> Value {
        let (system, turns) = split_system(messages);

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": turns,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(
                tools
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.parameters,
                        })
                    })
                    .collect(),
            );
        }
        body
    }

    async fn request_once(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.endpoint))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(messages, tools))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into_reply())
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError> {
        let mut last_error = LlmError::Network("no attempt made".to_string());

        for attempt in 1..=self.config.attempts.max(1) {
            match self.request_once(messages, tools).await {
                Ok(reply) => {
                    tracing::debug!(
                        model = %self.config.model,
                        tool_calls = reply.tool_calls.len(),
                        stop = ?reply.stop,
                        "Model reply received"
                    );
                    return Ok(reply);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Model request failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Pull the system instruction out of the message list.
///
/// The Messages API takes it as a top-level field; every other role becomes
/// a turn, with tool results mapped onto the user role.
fn split_system(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system = None;
    let mut turns = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                if system.is_none() {
                    system = Some(message.content.clone());
                }
            }
            Role::Assistant => {
                turns.push(json!({ "role": "assistant", "content": message.content }));
            }
            Role::User | Role::Tool => {
                turns.push(json!({ "role": "user", "content": message.content }));
            }
        }
    }

    (system, turns)
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    stop_reason: ApiStopReason,
}

impl ApiResponse {
    fn into_reply(self) -> ModelReply {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in self.content {
            match block {
                ContentBlock::Text { text: chunk } => text.push_str(&chunk),
                ContentBlock::ToolUse { id, name, input } => {
                    let arguments: HashMap<String, Value> =
                        serde_json::from_value(input).unwrap_or_default();
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments,
                    });
                }
            }
        }

        ModelReply {
            text,
            tool_calls,
            stop: self.stop_reason.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ApiStopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
}

impl From<ApiStopReason> for StopKind {
    fn from(reason: ApiStopReason) -> Self {
        match reason {
            ApiStopReason::EndTurn | ApiStopReason::StopSequence => StopKind::Complete,
            ApiStopReason::MaxTokens => StopKind::Length,
            ApiStopReason::ToolUse => StopKind::ToolUse,
        }
    }
}
