//! Tool format conversion

use crate::tools::FunctionSchema;
use serde_json::{Value, json};

/// Tool format converter
pub struct ToolConverter;

impl ToolConverter {
    /// Wrap function schemas as OpenAI `tools` entries
    pub fn to_openai(tools: &[FunctionSchema]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect()
    }
}
