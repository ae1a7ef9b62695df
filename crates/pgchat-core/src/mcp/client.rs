//! MCP client implementation
//!
//! Sequential request/response client: one request is in flight at a time,
//! and the reply is matched by id. Notifications and stale replies (for
//! example the answer to a request whose caller gave up) are skipped.

use super::error::McpError;
use super::protocol::{
    MCP_PROTOCOL_VERSION, McpMessage, McpNotification, McpRequest, McpResponse, RequestId,
    methods,
};
use super::service::ToolService;
use super::transport::McpTransport;
use super::types::{ClientInfo, InitializeParams, InitializeResult, McpServerInfo, McpTool, McpToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, trace};

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// MCP client for communicating with an MCP server
pub struct McpClient {
    transport: Mutex<Box<dyn McpTransport>>,
    server_info: RwLock<Option<McpServerInfo>>,
    request_id: AtomicU64,
    initialized: AtomicBool,
    request_timeout: Duration,
}

impl McpClient {
    /// Create a new MCP client with the given transport
    pub fn new(transport: Box<dyn McpTransport>) -> Self {
        Self {
            transport: Mutex::new(transport),
            server_info: RwLock::new(None),
            request_id: AtomicU64::new(1),
            initialized: AtomicBool::new(false),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Perform the `initialize` handshake
    pub async fn initialize(&self) -> Result<McpServerInfo, McpError> {
        let params = InitializeParams {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: ClientInfo::default(),
        };

        let result: InitializeResult = self
            .call(methods::INITIALIZE, Some(serde_json::to_value(params)?))
            .await?;

        debug!(
            "MCP server {} {} speaks protocol {}",
            result.server_info.name, result.server_info.version, result.protocol_version
        );

        *self.server_info.write().await = Some(result.server_info.clone());
        self.initialized.store(true, Ordering::SeqCst);

        self.notify(methods::INITIALIZED).await?;

        Ok(result.server_info)
    }

    /// Server info from the handshake
    pub async fn server_info(&self) -> Option<McpServerInfo> {
        self.server_info.read().await.clone()
    }

    /// List available tools
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        self.ensure_initialized()?;

        let result: Value = self.call(methods::TOOLS_LIST, None).await?;
        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| McpError::protocol("tools/list result has no 'tools' array"))?;

        serde_json::from_value(tools)
            .map_err(|e| McpError::protocol(format!("Malformed tools/list result: {}", e)))
    }

    /// Call a tool
    #[instrument(skip(self, arguments), level = "debug")]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        self.ensure_initialized()?;

        let params = json!({
            "name": name,
            "arguments": arguments
        });

        self.call(methods::TOOLS_CALL, Some(params)).await
    }

    /// Close the client connection
    pub async fn close(&self) -> Result<(), McpError> {
        self.initialized.store(false, Ordering::SeqCst);
        self.transport.lock().await.close().await
    }

    /// Make a request and wait for its response
    async fn call<T>(&self, method: &str, params: Option<Value>) -> Result<T, McpError>
    where
        T: serde::de::DeserializeOwned,
    {
        let id = self.next_request_id();

        let mut request = McpRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        // Hold the transport for the whole round trip so replies cannot be
        // consumed by another caller.
        let mut transport = self.transport.lock().await;
        transport.send(McpMessage::Request(request)).await?;

        let response = tokio::time::timeout(
            self.request_timeout,
            Self::receive_response(transport.as_mut(), &id),
        )
        .await
        .map_err(|_| McpError::timeout(self.request_timeout.as_secs()))??;

        match response.into_result() {
            Ok(value) => serde_json::from_value(value).map_err(McpError::from),
            Err(e) => Err(McpError::server(e.code, e.message)),
        }
    }

    /// Send a notification (no response expected)
    async fn notify(&self, method: &str) -> Result<(), McpError> {
        let mut transport = self.transport.lock().await;
        transport
            .send(McpMessage::Notification(McpNotification::new(method)))
            .await
    }

    async fn receive_response(
        transport: &mut dyn McpTransport,
        expected: &RequestId,
    ) -> Result<McpResponse, McpError> {
        loop {
            match transport.receive().await? {
                McpMessage::Response(response) if &response.id == expected => return Ok(response),
                McpMessage::Response(response) => {
                    trace!("Skipping stale response {}", response.id);
                }
                McpMessage::Notification(notification) => {
                    trace!("Skipping server notification {}", notification.method);
                }
                McpMessage::Request(request) => {
                    trace!("Ignoring server request {}", request.method);
                }
            }
        }
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.request_id.fetch_add(1, Ordering::SeqCst) as i64)
    }

    fn ensure_initialized(&self) -> Result<(), McpError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(McpError::NotInitialized);
        }
        Ok(())
    }
}

#[async_trait]
impl ToolService for McpClient {
    async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        McpClient::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        McpClient::call_tool(self, name, arguments).await
    }

    fn is_connected(&self) -> bool {
        // try_lock fails only while a request is in flight, which means the
        // transport was alive a moment ago.
        match self.transport.try_lock() {
            Ok(transport) => transport.is_connected(),
            Err(_) => true,
        }
    }

    async fn close(&self) -> Result<(), McpError> {
        McpClient::close(self).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
