//! In-memory PG-MCP stand-in for unit tests

use crate::mcp::{McpError, McpTool, McpToolResult, ToolService};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

type Handler = Box<dyn Fn(&str, &Value) -> Result<McpToolResult, McpError> + Send + Sync>;

pub(crate) struct FakeToolService {
    tools: Vec<McpTool>,
    handler: Handler,
    calls: Mutex<Vec<(String, Value)>>,
    connected: AtomicBool,
    list_calls: Mutex<usize>,
}

impl FakeToolService {
    /// The four tools PG-MCP advertises, answering like a healthy server
    pub(crate) fn pg_mcp() -> Self {
        Self::with_tools(pg_mcp_tools())
    }

    pub(crate) fn with_tools(tools: Vec<McpTool>) -> Self {
        Self {
            tools,
            handler: Box::new(pg_mcp_handler),
            calls: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            list_calls: Mutex::new(0),
        }
    }

    pub(crate) fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<McpToolResult, McpError> + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
        self
    }

    /// Every `call_tool` seen so far, in order
    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }

    pub(crate) fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl ToolService for FakeToolService {
    async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        *self.list_calls.lock().unwrap() += 1;
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        (self.handler)(name, &arguments)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), McpError> {
        self.set_connected(false);
        Ok(())
    }
}

pub(crate) fn pg_mcp_tools() -> Vec<McpTool> {
    let tool = |name: &str, description: Option<&str>, properties: Value, required: Value| McpTool {
        name: name.to_string(),
        description: description.map(str::to_string),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": required
        }),
    };

    vec![
        tool(
            "connect",
            Some("Register a database connection string and get a connection ID"),
            json!({"connection_string": {"type": "string"}}),
            json!(["connection_string"]),
        ),
        tool(
            "disconnect",
            Some("Close a database connection"),
            json!({"connection_id": {"type": "string"}}),
            json!(["connection_id"]),
        ),
        tool(
            "pg_query",
            None,
            json!({"connection_id": {"type": "string"}, "query": {"type": "string"}}),
            json!(["connection_id", "query"]),
        ),
        tool(
            "pg_explain",
            Some("Get query execution plans"),
            json!({"connection_id": {"type": "string"}, "query": {"type": "string"}}),
            json!(["connection_id", "query"]),
        ),
    ]
}

fn pg_mcp_handler(name: &str, _arguments: &Value) -> Result<McpToolResult, McpError> {
    match name {
        "connect" => Ok(McpToolResult::json(&json!({"connection_id": "conn-1"}))),
        "disconnect" => Ok(McpToolResult::json(&json!({"success": true}))),
        "pg_query" => Ok(McpToolResult::json(&json!([{"count": 42}]))),
        "pg_explain" => Ok(McpToolResult::json(&json!([{"QUERY PLAN": "Seq Scan on users"}]))),
        other => Err(McpError::server(-32602, format!("Unknown tool: {}", other))),
    }
}
