//! Tool registry
//!
//! Built once per session from the discovered tool definitions. The registry
//! is never mutated after construction; a reconnect builds a new one.

use super::schema_translator::SchemaTranslator;
use super::types::{FunctionSchema, ToolDefinition};
use crate::error::{BridgeError, BridgeResult};
use std::collections::HashMap;

/// Registry of available tools, keyed by name
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    /// Definitions in the order the server listed them
    definitions: Vec<ToolDefinition>,
    /// Translated schemas, parallel to `definitions`
    schemas: Vec<FunctionSchema>,
    /// Tool name to position in the vectors above
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Translate and register every definition.
    ///
    /// Fails with [`BridgeError::EmptyRegistry`] when `tools` is empty and
    /// with a protocol error when two tools share a name.
    pub fn build(tools: Vec<ToolDefinition>) -> BridgeResult<Self> {
        if tools.is_empty() {
            return Err(BridgeError::EmptyRegistry);
        }

        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if index.insert(tool.name.clone(), position).is_some() {
                return Err(BridgeError::protocol(format!(
                    "tool '{}' is listed more than once",
                    tool.name
                )));
            }
        }

        let schemas = SchemaTranslator::translate_all(&tools);

        Ok(Self {
            definitions: tools,
            schemas,
            index,
        })
    }

    /// Function schema for the named tool
    pub fn lookup(&self, name: &str) -> BridgeResult<&FunctionSchema> {
        self.index
            .get(name)
            .map(|&position| &self.schemas[position])
            .ok_or_else(|| BridgeError::ToolNotFound(name.to_string()))
    }

    /// Original definition of the named tool
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&position| &self.definitions[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All schemas, in listing order
    pub fn schemas(&self) -> &[FunctionSchema] {
        &self.schemas
    }

    /// Tool names, in listing order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
