//! PG-MCP Chat Core Library
//!
//! Bridges a PostgreSQL MCP server and an OpenAI-compatible chat service:
//! tool definitions discovered over MCP are translated into function-calling
//! schemas, the model decides which tools to call, and the results are fed
//! back for a final natural-language answer.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use chat::{Exchange, ExchangeState, Orchestrator};
pub use config::{BridgeConfig, load_from_env};
pub use error::{BridgeError, BridgeResult};
pub use llm::{CompletionResponse, CompletionService, ConversationTurn, OpenAiProvider, ToolCallRequest, ToolChoice};
pub use mcp::{McpClient, ToolService};
pub use session::Session;
pub use tools::{FunctionSchema, ParamKind, ParamSpec, SchemaTranslator, ToolDefinition, ToolRegistry, ToolResult};
