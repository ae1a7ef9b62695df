//! Tool-related type definitions

use crate::error::{BridgeError, BridgeResult};
use crate::mcp::McpTool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use crate::mcp::McpToolResult as ToolResult;

/// Parameter kinds the completion service understands.
///
/// Anything the remote server sends outside this set resolves to
/// [`ParamKind::String`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
}

impl ParamKind {
    /// Map a declared type name onto the closed set, falling back to string
    pub fn from_type_name(type_name: Option<&str>) -> Self {
        match type_name {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("integer") => Self::Integer,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            _ => Self::String,
        }
    }

    /// JSON-Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// One parameter of a remote tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    /// Type name exactly as the server declared it
    pub param_type: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    /// Element type for array parameters
    pub item_type: Option<String>,
}

impl ParamSpec {
    /// Create a required parameter of the given declared type
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: Some(param_type.into()),
            description: None,
            required: true,
            item_type: None,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// The declared type resolved onto [`ParamKind`]
    pub fn kind(&self) -> ParamKind {
        ParamKind::from_type_name(self.param_type.as_deref())
    }
}

/// A tool as advertised by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Parameters in the order the server declared them
    pub parameters: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameter(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Whether the tool declares a parameter with this name
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    /// Decode a `tools/list` entry. The `inputSchema` object is flattened
    /// into an ordered parameter list.
    pub fn from_mcp(tool: &McpTool) -> BridgeResult<Self> {
        if tool.name.trim().is_empty() {
            return Err(BridgeError::protocol("tool with an empty name"));
        }

        let parameters = match &tool.input_schema {
            Value::Null => Vec::new(),
            Value::Object(schema) => parse_parameters(&tool.name, schema)?,
            other => {
                return Err(BridgeError::protocol(format!(
                    "inputSchema of tool '{}' is not an object: {}",
                    tool.name, other
                )));
            }
        };

        Ok(Self {
            name: tool.name.clone(),
            description: tool.description.clone().filter(|d| !d.trim().is_empty()),
            parameters,
        })
    }
}

fn parse_parameters(tool: &str, schema: &Map<String, Value>) -> BridgeResult<Vec<ParamSpec>> {
    let required: Vec<&str> = match schema.get("required") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            return Err(BridgeError::protocol(format!(
                "'required' of tool '{}' is not an array: {}",
                tool, other
            )));
        }
    };

    let properties = match schema.get("properties") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(properties)) => properties,
        Some(other) => {
            return Err(BridgeError::protocol(format!(
                "'properties' of tool '{}' is not an object: {}",
                tool, other
            )));
        }
    };

    properties
        .iter()
        .map(|(name, property)| {
            let property = property.as_object().ok_or_else(|| {
                BridgeError::protocol(format!(
                    "parameter '{}' of tool '{}' is not a schema object",
                    name, tool
                ))
            })?;

            Ok(ParamSpec {
                name: name.clone(),
                param_type: declared_type(property),
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: required.contains(&name.as_str()),
                item_type: property
                    .get("items")
                    .and_then(Value::as_object)
                    .and_then(declared_type),
            })
        })
        .collect()
}

/// The first non-null type of a property schema. Looks at `type` (string or
/// list form) and then at `anyOf`/`oneOf` alternatives, which is how
/// optional parameters are usually emitted.
fn declared_type(property: &Map<String, Value>) -> Option<String> {
    match property.get("type") {
        Some(Value::String(t)) => return Some(t.clone()),
        Some(Value::Array(types)) => {
            return types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .map(str::to_string);
        }
        _ => {}
    }

    ["anyOf", "oneOf"]
        .iter()
        .filter_map(|key| property.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(declared_type)
        .find(|t| t != "null")
}

/// Function-calling schema handed to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
}

/// The `parameters` object of a [`FunctionSchema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property name to JSON type descriptor, in declaration order
    pub properties: Map<String, Value>,
    /// Required property names, in declaration order
    pub required: Vec<String>,
}

impl Default for FunctionParameters {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mcp_tool(name: &str, schema: Value) -> McpTool {
        McpTool {
            name: name.to_string(),
            description: None,
            input_schema: schema,
        }
    }

    #[test]
    fn test_from_mcp_preserves_declaration_order() {
        let tool = mcp_tool(
            "pg_query",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "SQL to run"},
                    "connection_id": {"type": "string"},
                    "params": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["connection_id", "query"]
            }),
        );

        let def = ToolDefinition::from_mcp(&tool).unwrap();
        let names: Vec<&str> = def.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["query", "connection_id", "params"]);
        assert!(def.parameters[0].required);
        assert!(def.parameters[1].required);
        assert!(!def.parameters[2].required);
        assert_eq!(def.parameters[0].description.as_deref(), Some("SQL to run"));
        assert_eq!(def.parameters[2].item_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_from_mcp_reads_optional_any_of() {
        let tool = mcp_tool(
            "pg_explain",
            json!({
                "type": "object",
                "properties": {
                    "limit": {"anyOf": [{"type": "null"}, {"type": "integer"}]},
                    "verbose": {"type": ["null", "boolean"]}
                }
            }),
        );

        let def = ToolDefinition::from_mcp(&tool).unwrap();
        assert_eq!(def.parameters[0].kind(), ParamKind::Integer);
        assert_eq!(def.parameters[1].kind(), ParamKind::Boolean);
    }

    #[test]
    fn test_from_mcp_without_schema() {
        let def = ToolDefinition::from_mcp(&mcp_tool("ping", Value::Null)).unwrap();
        assert!(def.parameters.is_empty());
        assert!(def.description.is_none());
    }

    #[test]
    fn test_from_mcp_rejects_malformed_metadata() {
        assert!(matches!(
            ToolDefinition::from_mcp(&mcp_tool("", json!({}))),
            Err(BridgeError::Protocol(_))
        ));
        assert!(matches!(
            ToolDefinition::from_mcp(&mcp_tool("bad", json!("schema"))),
            Err(BridgeError::Protocol(_))
        ));
        assert!(matches!(
            ToolDefinition::from_mcp(&mcp_tool("bad", json!({"properties": ["query"]}))),
            Err(BridgeError::Protocol(_))
        ));
        assert!(matches!(
            ToolDefinition::from_mcp(&mcp_tool("bad", json!({"properties": {"q": 1}}))),
            Err(BridgeError::Protocol(_))
        ));
    }

    #[test]
    fn test_param_kind_fallback() {
        assert_eq!(ParamKind::from_type_name(Some("integer")), ParamKind::Integer);
        assert_eq!(ParamKind::from_type_name(Some("object")), ParamKind::String);
        assert_eq!(ParamKind::from_type_name(Some("uuid")), ParamKind::String);
        assert_eq!(ParamKind::from_type_name(None), ParamKind::String);
    }
}
