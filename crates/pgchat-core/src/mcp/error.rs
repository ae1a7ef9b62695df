//! MCP error types

use thiserror::Error;

/// MCP wire-level errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum McpError {
    /// Could not open or keep the connection
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Malformed message or unexpected protocol state
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Transport failure after the connection was established
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// JSON-RPC error returned by the server
    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    /// Timeout
    #[error("Request timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Not initialized
    #[error("Client not initialized")]
    NotInitialized,
}

impl McpError {
    /// Create a new Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a new Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new Server error
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Create a new Timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
