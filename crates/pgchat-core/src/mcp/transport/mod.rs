//! MCP transport layer
//!
//! The PG-MCP server speaks the HTTP+SSE transport: server-to-client traffic
//! arrives on one long-lived event stream, client-to-server traffic is POSTed
//! to the endpoint announced on that stream.

pub mod sse;

pub use sse::{SseTransport, SseTransportConfig};

use super::error::McpError;
use super::protocol::McpMessage;
use async_trait::async_trait;

/// Transport trait for MCP communication
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a message
    async fn send(&mut self, message: McpMessage) -> Result<(), McpError>;

    /// Receive the next message from the server
    async fn receive(&mut self) -> Result<McpMessage, McpError>;

    /// Close the transport
    async fn close(&mut self) -> Result<(), McpError>;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;
}
