//! Model Context Protocol client
//!
//! Just enough MCP to drive the PG-MCP server: the JSON-RPC framing, the
//! HTTP+SSE transport, and a client that performs the handshake, lists
//! tools and calls them.
//!
//! ```rust,ignore
//! use pgchat_core::mcp::{McpClient, SseTransport, SseTransportConfig};
//!
//! let transport = SseTransport::connect(SseTransportConfig::new("http://localhost:8000/sse")).await?;
//! let client = McpClient::new(Box::new(transport));
//! client.initialize().await?;
//! let tools = client.list_tools().await?;
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod types;

pub use client::McpClient;
pub use error::McpError;
pub use protocol::{McpMessage, McpNotification, McpRequest, McpResponse, RequestId};
pub use service::ToolService;
pub use transport::{McpTransport, SseTransport, SseTransportConfig};
pub use types::{McpContent, McpServerInfo, McpTool, McpToolResult};
