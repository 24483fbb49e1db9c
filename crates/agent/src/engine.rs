//! Dialogue engine
//!
//! Builds the model prompt and drives the bounded tool-calling loop. The
//! loop is an explicit iteration counter with a hard ceiling, never
//! recursion: a model that keeps asking for tools is cut off after the
//! configured number of executions and the user gets the fixed fallback
//! text instead of an error.

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use tontouma_core::{Message as StoredMessage, MessageBody, MessageRole, NewMessage, SessionStore};
use tontouma_llm::{LlmBackend, Message, ToolDefinition};
use tontouma_tools::{ToolError, ToolExecutor};

/// Fixed reply when the model cannot produce an answer
pub const FALLBACK_REPLY: &str =
    "Je suis désolé, je n'arrive pas à traiter votre demande pour le moment. \
     Pouvez-vous reformuler ?";

/// Context block used when retrieval returns nothing, so the model is never
/// conditioned on an empty string
pub const NO_CONTEXT_MARKER: &str =
    "Aucune information pertinente trouvée dans la base de connaissances.";

/// Dialogue engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard ceiling on tool executions within one request
    pub max_tool_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_tool_rounds: 5 }
    }
}

/// Inputs for one dialogue round
pub struct DialogueRequest<'a> {
    pub entity_id: Uuid,
    pub session_id: Uuid,
    /// System instruction (entity-specific or generic persona)
    pub system_prompt: &'a str,
    /// Retrieved context; `None` becomes the explicit no-information marker
    pub context: Option<String>,
    /// Prior messages in creation order, tool messages included
    pub history: &'a [StoredMessage],
    /// Current user utterance, already in the processing language
    pub user_text: &'a str,
}

/// Dialogue engine
pub struct DialogueEngine {
    llm: Arc<dyn LlmBackend>,
    tools: Arc<dyn ToolExecutor>,
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
}

impl DialogueEngine {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        tools: Arc<dyn ToolExecutor>,
        store: Arc<dyn SessionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            store,
            config,
        }
    }

    /// Produce the assistant reply for one user utterance.
    ///
    /// Never fails: model and tool faults degrade to the fixed fallback
    /// text or flow back to the model as structured failure payloads.
    pub async fn respond(&self, request: DialogueRequest<'_>) -> String {
        let mut messages = self.build_prompt(&request);
        let tool_definitions: Vec<ToolDefinition> = self.tools.definitions();

        let mut executed = 0usize;

        loop {
            let reply = match self.llm.generate(&messages, &tool_definitions).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(error = %e, "Model call failed, degrading to fallback reply");
                    return FALLBACK_REPLY.to_string();
                }
            };

            if !reply.has_tool_calls() {
                let text = reply.text.trim();
                if text.is_empty() {
                    tracing::warn!("Model returned neither text nor tool calls");
                    return FALLBACK_REPLY.to_string();
                }
                return text.to_string();
            }

            if executed >= self.config.max_tool_rounds {
                tracing::warn!(
                    executed,
                    "Tool budget exhausted without a textual answer, degrading to fallback reply"
                );
                return FALLBACK_REPLY.to_string();
            }

            // Record the assistant turn that requested the tools.
            let mut assistant_record = reply.text.trim().to_string();
            for call in &reply.tool_calls {
                assistant_record.push_str(&format!(
                    "\n[Appel d'outil: {} {}]",
                    call.name,
                    call.arguments_value()
                ));
            }
            messages.push(Message::assistant(assistant_record.trim().to_string()));

            let mut budget_hit = false;
            for call in &reply.tool_calls {
                if executed >= self.config.max_tool_rounds {
                    budget_hit = true;
                    break;
                }
                executed += 1;

                let payload = self
                    .execute_tool(&call.name, call.arguments_value(), &request)
                    .await;

                self.persist_tool_message(request.session_id, &payload).await;

                messages.push(Message::tool(format!(
                    "[Résultat de l'outil {}] {}",
                    call.name, payload
                )));
            }

            if budget_hit {
                tracing::warn!(
                    executed,
                    "Tool budget exhausted mid-reply, degrading to fallback reply"
                );
                return FALLBACK_REPLY.to_string();
            }
        }
    }

    fn build_prompt(&self, request: &DialogueRequest<'_>) -> Vec<Message> {
        let context = request
            .context
            .clone()
            .unwrap_or_else(|| NO_CONTEXT_MARKER.to_string());

        let system = format!(
            "{}\n\nContexte de la base de connaissances:\n{}",
            request.system_prompt, context
        );

        let mut messages = vec![Message::system(system)];

        for stored in request.history {
            let text = stored.body.processing_text();
            match stored.role {
                MessageRole::User => messages.push(Message::user(text)),
                MessageRole::Assistant => messages.push(Message::assistant(text)),
                // Replayed verbatim so the model keeps identifiers it saw
                // or produced in earlier turns.
                MessageRole::Tool => {
                    messages.push(Message::tool(format!("[Résultat d'outil] {}", text)))
                }
            }
        }

        messages.push(Message::user(request.user_text));
        messages
    }

    async fn execute_tool(
        &self,
        name: &str,
        mut arguments: Value,
        request: &DialogueRequest<'_>,
    ) -> Value {
        // Request context the model does not know about.
        if let Some(object) = arguments.as_object_mut() {
            object.insert(
                "entity_id".to_string(),
                json!(request.entity_id.to_string()),
            );
            object.insert(
                "session_id".to_string(),
                json!(request.session_id.to_string()),
            );
        }

        match self.tools.execute(name, arguments).await {
            Ok(output) => {
                tracing::info!(tool = name, success = output.is_success(), "Tool executed");
                output.value
            }
            Err(e) => {
                // Unknown names, timeouts and downstream faults all flow
                // back to the model as recoverable failures.
                let message = match &e {
                    ToolError::NotFound(name) => format!("Outil inconnu: {}", name),
                    other => other.to_string(),
                };
                tracing::warn!(tool = name, error = %e, "Tool execution failed");
                json!({ "success": false, "message": message })
            }
        }
    }

    async fn persist_tool_message(&self, session_id: Uuid, payload: &Value) {
        let message = NewMessage::new(
            session_id,
            MessageRole::Tool,
            MessageBody::monolingual(payload.to_string()),
        );
        if let Err(e) = self.store.append_message(message).await {
            tracing::warn!(error = %e, "Could not persist tool message");
        }
    }
}
