//! The capability-discovery seam consumed by the session

use super::error::McpError;
use super::types::{McpTool, McpToolResult};
use async_trait::async_trait;
use serde_json::Value;

/// A remote service that lists and invokes tools.
///
/// [`McpClient`](super::McpClient) is the production implementation.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// Fetch the advertised tools
    async fn list_tools(&self) -> Result<Vec<McpTool>, McpError>;

    /// Invoke one tool with a JSON object of arguments
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError>;

    /// Whether the underlying transport is still usable
    fn is_connected(&self) -> bool;

    /// Tear down the underlying transport
    async fn close(&self) -> Result<(), McpError>;
}
