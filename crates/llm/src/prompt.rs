//! Chat message types and tool definition building
//!
//! Backends speak in terms of these role-tagged messages; the dialogue
//! engine assembles them and never sees a provider wire format. Tool
//! definitions are JSON Schema objects assembled through [`ToolBuilder`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub use tontouma_core::llm_types::ToolDefinition;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool result fed back into the conversation
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::with_role(Role::Tool, content)
    }
}

/// One declared tool argument
#[derive(Debug, Clone)]
struct Param {
    name: String,
    kind: String,
    description: String,
    required: bool,
    choices: Option<Vec<String>>,
}

/// Assembles a [`ToolDefinition`] with JSON Schema arguments.
///
/// ```ignore
/// let tool = ToolBuilder::new("search_doctors", "Rechercher les médecins")
///     .param("specialty", "string", "Spécialité recherchée", false)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    name: String,
    description: String,
    params: Vec<Param>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Declare an argument with its JSON Schema type and description.
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: &str,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: param_type.to_string(),
            description: description.into(),
            required,
            choices: None,
        });
        self
    }

    /// Constrain an already-declared string argument to a fixed value set.
    pub fn string_enum(mut self, name: &str, values: &[&str]) -> Self {
        if let Some(param) = self.params.iter_mut().find(|p| p.name == name) {
            param.choices = Some(values.iter().map(|v| v.to_string()).collect());
        }
        self
    }

    pub fn build(self) -> ToolDefinition {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut schema = json!({
                "type": param.kind,
                "description": param.description,
            });
            if let Some(choices) = &param.choices {
                schema["enum"] = json!(choices);
            }
            properties.insert(param.name.clone(), schema);
            if param.required {
                required.push(param.name.clone());
            }
        }

        ToolDefinition::new(
            self.name,
            self.description,
            json!({
                "type": "object",
                "properties": Value::Object(properties),
                "required": required,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_builder() {
        let tool = ToolBuilder::new("search_doctors", "Search doctors")
            .param("specialty", "string", "Specialty name", false)
            .param("date", "string", "Date (YYYY-MM-DD)", true)
            .build();

        assert_eq!(tool.name, "search_doctors");
        assert_eq!(tool.parameters["required"], json!(["date"]));
        assert_eq!(
            tool.parameters["properties"]["specialty"]["type"],
            "string"
        );
    }

    #[test]
    fn test_string_enum() {
        let tool = ToolBuilder::new("t", "d")
            .param("status", "string", "Status", true)
            .string_enum("status", &["pending", "confirmed"])
            .build();

        assert_eq!(
            tool.parameters["properties"]["status"]["enum"],
            json!(["pending", "confirmed"])
        );
    }

    #[test]
    fn test_string_enum_on_unknown_param_is_ignored() {
        let tool = ToolBuilder::new("t", "d")
            .param("status", "string", "Status", true)
            .string_enum("missing", &["a"])
            .build();
        assert!(tool.parameters["properties"]["status"].get("enum").is_none());
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::tool("{}").role, Role::Tool);
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
