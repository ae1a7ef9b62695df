//! Schema translator
//!
//! Turns a remote tool definition into the function-calling schema the
//! completion service expects. Pure: the same definition always yields the
//! same schema.

use super::types::{FunctionParameters, FunctionSchema, ParamKind, ParamSpec, ToolDefinition};
use serde_json::{Map, Value, json};

/// Translator from [`ToolDefinition`] to [`FunctionSchema`]
pub struct SchemaTranslator;

impl SchemaTranslator {
    /// Translate one tool definition
    pub fn translate(tool: &ToolDefinition) -> FunctionSchema {
        let mut parameters = FunctionParameters::default();

        for param in &tool.parameters {
            if param.required {
                parameters.required.push(param.name.clone());
            }
            parameters
                .properties
                .insert(param.name.clone(), Self::property_descriptor(param));
        }

        FunctionSchema {
            name: tool.name.clone(),
            description: tool
                .description
                .clone()
                .unwrap_or_else(|| format!("Tool for {}", tool.name)),
            parameters,
        }
    }

    /// Translate several definitions, keeping their order
    pub fn translate_all(tools: &[ToolDefinition]) -> Vec<FunctionSchema> {
        tools.iter().map(Self::translate).collect()
    }

    fn property_descriptor(param: &ParamSpec) -> Value {
        let kind = param.kind();
        let mut descriptor = Map::new();
        descriptor.insert("type".to_string(), json!(kind.as_str()));

        if kind == ParamKind::Array {
            if let Some(item_type) = &param.item_type {
                descriptor.insert("items".to_string(), json!({ "type": item_type }));
            }
        }

        if let Some(description) = &param.description {
            descriptor.insert("description".to_string(), json!(description));
        }

        Value::Object(descriptor)
    }
}
