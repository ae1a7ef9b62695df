//! Tool definitions, schema translation and the per-session registry

pub mod registry;
pub mod schema_translator;
pub mod types;

pub use registry::ToolRegistry;
pub use schema_translator::SchemaTranslator;
pub use types::{
    FunctionParameters, FunctionSchema, ParamKind, ParamSpec, ToolDefinition, ToolResult,
};
