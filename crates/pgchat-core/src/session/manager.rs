//! Session lifecycle
//!
//! A session owns the tool service handle, the registry built from its
//! listing, and the database connection id handed out by the remote
//! `connect` tool.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::mcp::{McpClient, SseTransport, SseTransportConfig, ToolService};
use crate::tools::{ToolDefinition, ToolRegistry, ToolResult};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Name of the remote tool that registers a connection string
pub const CONNECT_TOOL: &str = "connect";
/// Name of the remote tool that releases a connection id
pub const DISCONNECT_TOOL: &str = "disconnect";
pub const QUERY_TOOL: &str = "pg_query";
pub const EXPLAIN_TOOL: &str = "pg_explain";

const CONNECTION_ID_PARAM: &str = "connection_id";

/// A connection to the remote tool service
pub struct Session {
    service: Arc<dyn ToolService>,
    registry: ToolRegistry,
    connection_id: Option<String>,
}

impl Session {
    /// Fetch the tool listing from an already initialized service and build
    /// the registry.
    pub async fn initialize(service: Arc<dyn ToolService>) -> BridgeResult<Self> {
        let listed = service.list_tools().await?;
        let definitions = listed
            .iter()
            .map(ToolDefinition::from_mcp)
            .collect::<BridgeResult<Vec<_>>>()?;

        let registry = ToolRegistry::build(definitions)?;
        info!("Loaded {} tools: {}", registry.len(), registry.names().join(", "));

        Ok(Self {
            service,
            registry,
            connection_id: None,
        })
    }

    /// Open the event stream at `config.mcp_url`, run the MCP handshake and
    /// initialize the session.
    pub async fn open(config: &BridgeConfig) -> BridgeResult<Self> {
        let transport_config = SseTransportConfig::new(&config.mcp_url)
            .with_connect_timeout(config.request_timeout())
            .with_request_timeout(config.request_timeout());

        let transport = SseTransport::connect(transport_config).await?;
        let client =
            McpClient::new(Box::new(transport)).with_request_timeout(config.request_timeout());

        let server = client.initialize().await?;
        info!("Connected to MCP server {} at {}", server.name, config.mcp_url);

        Self::initialize(Arc::new(client)).await
    }

    /// Register a connection string with the remote `connect` tool
    pub async fn connect_database(&mut self, connection_string: &str) -> BridgeResult<String> {
        if let Some(previous) = &self.connection_id {
            warn!("Replacing existing connection {}", previous);
        }

        let result = self
            .call_remote(CONNECT_TOOL, json!({ "connection_string": connection_string }))
            .await?;

        if result.is_error {
            return Err(BridgeError::ConnectionRejected(result.payload().to_string()));
        }

        let connection_id = extract_connection_id(&result.payload()).ok_or_else(|| {
            BridgeError::ConnectionRejected("connect returned no connection id".to_string())
        })?;

        info!("Connected to database with ID: {}", connection_id);
        self.connection_id = Some(connection_id.clone());
        Ok(connection_id)
    }

    /// Run one tool.
    ///
    /// Every tool except `connect` needs a connection id; without one this
    /// fails with [`BridgeError::NotConnected`] before anything is sent. When
    /// the tool declares a `connection_id` parameter and the caller left it
    /// out, the session's id is filled in.
    #[instrument(skip(self, arguments), level = "debug")]
    pub async fn execute_tool(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolResult> {
        if name != CONNECT_TOOL && self.connection_id.is_none() {
            return Err(BridgeError::not_connected(name));
        }

        let definition = self
            .registry
            .definition(name)
            .ok_or_else(|| BridgeError::ToolNotFound(name.to_string()))?;

        let mut arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(BridgeError::invalid_arguments(
                    name,
                    format!("expected a JSON object, got {}", other),
                ));
            }
        };

        if definition.has_parameter(CONNECTION_ID_PARAM) && !arguments.contains_key(CONNECTION_ID_PARAM) {
            if let Some(id) = &self.connection_id {
                arguments.insert(CONNECTION_ID_PARAM.to_string(), json!(id));
            }
        }

        let target_id = arguments
            .get(CONNECTION_ID_PARAM)
            .and_then(Value::as_str)
            .map(str::to_string);

        let result = self.call_remote(name, Value::Object(arguments)).await?;

        if !result.is_error {
            match name {
                CONNECT_TOOL => {
                    if let Some(id) = extract_connection_id(&result.payload()) {
                        info!("Connected to database with ID: {}", id);
                        self.connection_id = Some(id);
                    }
                }
                DISCONNECT_TOOL if target_id.is_some() && target_id == self.connection_id => {
                    info!("Disconnected from database");
                    self.connection_id = None;
                }
                DISCONNECT_TOOL => {
                    debug!("Disconnected {:?}, keeping session connection", target_id);
                }
                _ => {}
            }
        }

        Ok(result)
    }

    /// Run SQL through `pg_query`
    pub async fn execute_query(&mut self, sql: &str) -> BridgeResult<ToolResult> {
        self.run_sql(QUERY_TOOL, sql).await
    }

    /// Get the plan for SQL through `pg_explain`
    pub async fn explain_query(&mut self, sql: &str) -> BridgeResult<ToolResult> {
        self.run_sql(EXPLAIN_TOOL, sql).await
    }

    /// Release the connection id, if any. A second call does nothing.
    ///
    /// The id is cleared even when the remote call fails.
    pub async fn disconnect(&mut self) -> BridgeResult<()> {
        let Some(connection_id) = self.connection_id.take() else {
            debug!("disconnect called without an open connection");
            return Ok(());
        };

        let result = self
            .call_remote(DISCONNECT_TOOL, json!({ CONNECTION_ID_PARAM: connection_id }))
            .await?;

        if result.is_error {
            warn!("Remote disconnect reported an error: {}", result.payload());
        } else {
            info!("Disconnected from database");
        }
        Ok(())
    }

    /// Disconnect and close the transport
    pub async fn close(&mut self) -> BridgeResult<()> {
        if let Err(e) = self.disconnect().await {
            warn!("Disconnect during close failed: {}", e);
        }
        self.service.close().await?;
        debug!("Session closed");
        Ok(())
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Whether the transport is still usable
    pub fn is_connected(&self) -> bool {
        self.service.is_connected()
    }

    async fn run_sql(&mut self, tool: &str, sql: &str) -> BridgeResult<ToolResult> {
        let connection_id = self
            .connection_id
            .clone()
            .ok_or_else(|| BridgeError::not_connected(tool))?;
        self.execute_tool(tool, json!({ CONNECTION_ID_PARAM: connection_id, "query": sql }))
            .await
    }

    async fn call_remote(&mut self, name: &str, arguments: Value) -> BridgeResult<ToolResult> {
        debug!("Calling tool {} with args: {}", name, arguments);

        match self.service.call_tool(name, arguments).await {
            Ok(result) => Ok(result),
            Err(e) => {
                let error = BridgeError::from(e);
                if error.is_transport() && !self.service.is_connected() {
                    self.handle_transport_lost();
                }
                Err(error)
            }
        }
    }

    fn handle_transport_lost(&mut self) {
        if let Some(id) = self.connection_id.take() {
            error!("Transport to the MCP server was lost; dropping connection {}", id);
        }
    }
}

/// Read the connection id from a `connect` payload. PG-MCP has used both
/// `connection_id` and `conn_id`.
fn extract_connection_id(payload: &Value) -> Option<String> {
    ["connection_id", "conn_id"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
