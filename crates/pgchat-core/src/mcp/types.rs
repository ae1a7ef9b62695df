//! MCP type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Server information returned after initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

/// Client information sent during the handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "pgchat".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Initialize response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub server_info: McpServerInfo,
}

/// A tool as it appears in a `tools/list` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema of the tool's arguments
    #[serde(default)]
    pub input_schema: Value,
}

/// Result of a `tools/call` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolResult {
    #[serde(default)]
    pub content: Vec<McpContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(default)]
    pub is_error: bool,
}

impl McpToolResult {
    /// Build a successful result holding one text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            structured_content: None,
            is_error: false,
        }
    }

    /// Build a successful result whose text block is the given JSON value
    pub fn json(value: &Value) -> Self {
        Self::text(value.to_string())
    }

    /// Build an error result holding one text block
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Structured view of the result.
    ///
    /// `structuredContent` wins when the server sends it. Otherwise text
    /// blocks that hold JSON are decoded, plain text stays a string, a single
    /// block is returned as-is and several blocks become an array. Error
    /// results are wrapped as `{"error": ...}`.
    pub fn payload(&self) -> Value {
        let value = match &self.structured_content {
            Some(structured) => structured.clone(),
            None => {
                let mut blocks: Vec<Value> = self.content.iter().map(McpContent::to_value).collect();
                match blocks.len() {
                    0 => Value::Null,
                    1 => blocks.remove(0),
                    _ => Value::Array(blocks),
                }
            }
        };

        if self.is_error {
            json!({ "error": value })
        } else {
            value
        }
    }
}

/// Content blocks in a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum McpContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image", rename_all = "camelCase")]
    Image { data: String, mime_type: String },
    #[serde(rename = "resource")]
    Resource { resource: Value },
    /// Block types this client does not understand
    #[serde(other)]
    Unsupported,
}

impl McpContent {
    fn to_value(&self) -> Value {
        match self {
            Self::Text { text } => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
            Self::Image { data, mime_type } => {
                Value::String(format!("[Image: {} ({} bytes)]", mime_type, data.len()))
            }
            Self::Resource { resource } => resource.clone(),
            Self::Unsupported => Value::Null,
        }
    }
}
