//! Tool contract and result types

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use tontouma_core::llm_types::ToolDefinition;

/// Default timeout for tool execution (30 seconds)
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Tool execution errors
///
/// These are registry-level failures (unknown tool, timeout, internal
/// fault). The dialogue engine converts every one of them into a
/// conversational failure payload; they never abort a request.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("tool '{tool}' timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn timeout(tool: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            secs,
        }
    }
}

/// Structured tool result, fed back to the model verbatim
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub value: Value,
}

impl ToolOutput {
    pub fn json(value: Value) -> Self {
        Self { value }
    }

    /// A `{success: false, message}` payload.
    ///
    /// Used for every recoverable condition the model should handle
    /// conversationally: missing arguments, unknown dates, booking
    /// conflicts, downstream faults.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            value: json!({ "success": false, "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A capability the model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Definition handed to the model (JSON Schema arguments)
    fn definition(&self) -> ToolDefinition;

    /// Execute with the model-provided arguments plus the request context
    /// fields injected by the dialogue engine (`entity_id`, `session_id`).
    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError>;

    /// Execution timeout in seconds
    fn timeout_secs(&self) -> u64 {
        DEFAULT_TOOL_TIMEOUT_SECS
    }
}

/// Check required string fields and produce a missing-information failure
/// listing every absent field, or `None` when all are present.
pub fn check_required_fields(input: &Value, required: &[&str]) -> Option<ToolOutput> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| {
            input
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.trim().is_empty())
                .unwrap_or(true)
        })
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(ToolOutput::failure(format!(
            "Informations manquantes: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_payload_shape() {
        let output = ToolOutput::failure("Médecin non trouvé");
        assert!(!output.is_success());
        assert_eq!(output.value["message"], "Médecin non trouvé");
        assert_eq!(output.value["success"], false);
    }

    #[test]
    fn test_check_required_fields() {
        let input = json!({ "patient_name": "Awa", "patient_phone": "" });
        let failure =
            check_required_fields(&input, &["patient_name", "patient_phone", "date"]).unwrap();
        let message = failure.value["message"].as_str().unwrap();
        assert!(message.contains("patient_phone"));
        assert!(message.contains("date"));
        assert!(!message.contains("patient_name"));

        assert!(check_required_fields(&input, &["patient_name"]).is_none());
    }
}
