//! Error types for the PG-MCP chat bridge
//!
//! Failures fall into two classes. Initialization failures (`Transport`,
//! `Protocol`, `EmptyRegistry`, `Config`) propagate to the caller and abort
//! startup. Everything that goes wrong inside a single chat exchange is caught
//! by the orchestrator and turned into a user-facing message.

use crate::mcp::McpError;
use thiserror::Error;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Main error type for the bridge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The remote tool server cannot be reached or the connection was lost
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote tool server sent malformed metadata or messages
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The remote tool server advertised no tools
    #[error("No tools were discovered on the MCP server")]
    EmptyRegistry,

    /// A tool other than `connect` was invoked before a connection id exists
    #[error("Tool '{tool}' requires a database connection; call connect first")]
    NotConnected { tool: String },

    /// The remote `connect` call did not hand back a connection id
    #[error("Database connection rejected: {0}")]
    ConnectionRejected(String),

    /// The chat completion service failed or answered with garbage
    #[error("Completion service error: {0}")]
    CompletionService(String),

    /// Lookup of an unknown tool name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments could not be decoded into a JSON object
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// The remote server answered a request with a JSON-RPC error
    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation ran past its deadline
    #[error("Timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl BridgeError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a new completion service error
    pub fn completion(message: impl Into<String>) -> Self {
        Self::CompletionService(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new not-connected error for the named tool
    pub fn not_connected(tool: impl Into<String>) -> Self {
        Self::NotConnected { tool: tool.into() }
    }

    /// Create a new invalid-arguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the remote connection itself is gone
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this error belongs to a single tool invocation rather than
    /// the exchange as a whole. The model is told about these and may
    /// recover; anything else aborts the exchange.
    pub fn is_tool_level(&self) -> bool {
        matches!(
            self,
            Self::NotConnected { .. }
                | Self::ToolNotFound(_)
                | Self::InvalidArguments { .. }
                | Self::Remote { .. }
                | Self::ConnectionRejected(_)
        )
    }
}

impl From<McpError> for BridgeError {
    fn from(error: McpError) -> Self {
        match error {
            McpError::Connection { message } | McpError::Transport { message } => {
                Self::Transport(message)
            }
            McpError::Timeout { seconds } => Self::Timeout { seconds },
            McpError::Server { code, message } => Self::Remote { code, message },
            McpError::Protocol { message } | McpError::Serialization { message } => {
                Self::Protocol(message)
            }
            McpError::NotInitialized => Self::Protocol("MCP client not initialized".to_string()),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Protocol(error.to_string())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(error: reqwest::Error) -> Self {
        Self::CompletionService(error.to_string())
    }
}
