//! HTTP+SSE transport for MCP
//!
//! `GET <url>` opens the event stream. The first `endpoint` event carries the
//! URL (usually relative, with a session id) that every outgoing message is
//! POSTed to. Later `message` events carry JSON-RPC messages.

use super::McpTransport;
use crate::mcp::error::McpError;
use crate::mcp::protocol::McpMessage;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode, Url};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// SSE transport configuration
#[derive(Debug, Clone)]
pub struct SseTransportConfig {
    /// URL of the server's event stream, e.g. `http://localhost:8000/sse`
    pub url: String,
    /// How long to wait for the stream to open and announce its endpoint
    pub connect_timeout: Duration,
    /// Timeout for each POST
    pub request_timeout: Duration,
}

impl SseTransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
struct SseEvent {
    event: String,
    data: String,
}

/// HTTP+SSE transport
pub struct SseTransport {
    client: Client,
    endpoint: Url,
    request_timeout: Duration,
    connected: Arc<AtomicBool>,
    message_rx: mpsc::Receiver<McpMessage>,
    listener: Option<tokio::task::JoinHandle<()>>,
}

impl SseTransport {
    /// Open the event stream and wait for the server to announce its
    /// message endpoint.
    pub async fn connect(config: SseTransportConfig) -> Result<Self, McpError> {
        let base = Url::parse(&config.url)
            .map_err(|e| McpError::connection(format!("Invalid MCP URL '{}': {}", config.url, e)))?;

        // No overall timeout on this client: the event stream stays open for
        // the whole session. POSTs get their own timeout.
        let client = Client::builder()
            .build()
            .map_err(|e| McpError::connection(format!("Failed to create HTTP client: {}", e)))?;

        let response = tokio::time::timeout(
            config.connect_timeout,
            client
                .get(base.clone())
                .header(reqwest::header::ACCEPT, "text/event-stream")
                .send(),
        )
        .await
        .map_err(|_| {
            McpError::connection(format!(
                "SSE stream did not respond within {} seconds",
                config.connect_timeout.as_secs()
            ))
        })?
        .map_err(|e| McpError::connection(format!("Failed to connect to SSE stream: {}", e)))?;

        if !response.status().is_success() {
            return Err(McpError::connection(format!(
                "SSE connection failed with status: {}",
                response.status()
            )));
        }

        let connected = Arc::new(AtomicBool::new(true));
        let (message_tx, message_rx) = mpsc::channel(100);
        let (endpoint_tx, endpoint_rx) = oneshot::channel();

        let listener = tokio::spawn(Self::listen(
            response,
            Arc::clone(&connected),
            endpoint_tx,
            message_tx,
        ));

        let endpoint_path = match tokio::time::timeout(config.connect_timeout, endpoint_rx).await {
            Ok(Ok(path)) => path,
            Ok(Err(_)) => {
                listener.abort();
                return Err(McpError::connection(
                    "SSE stream closed before announcing a message endpoint",
                ));
            }
            Err(_) => {
                listener.abort();
                return Err(McpError::connection(format!(
                    "SSE stream announced no message endpoint within {} seconds",
                    config.connect_timeout.as_secs()
                )));
            }
        };

        let endpoint = resolve_endpoint(&base, &endpoint_path)?;
        debug!("SSE transport connected to {}, posting to {}", base, endpoint);

        Ok(Self {
            client,
            endpoint,
            request_timeout: config.request_timeout,
            connected,
            message_rx,
            listener: Some(listener),
        })
    }

    /// The URL messages are POSTed to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn listen(
        response: reqwest::Response,
        connected: Arc<AtomicBool>,
        endpoint_tx: oneshot::Sender<String>,
        message_tx: mpsc::Sender<McpMessage>,
    ) {
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut endpoint_tx = Some(endpoint_tx);

        'outer: while connected.load(Ordering::SeqCst) {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    buffer.extend_from_slice(&chunk);

                    while let Some((raw, rest)) = split_event(&buffer) {
                        let raw = String::from_utf8_lossy(&raw).into_owned();
                        buffer = rest;

                        let Some(event) = parse_sse_event(&raw) else {
                            continue;
                        };

                        if event.event == "endpoint" {
                            if let Some(tx) = endpoint_tx.take() {
                                let _ = tx.send(event.data);
                            }
                            continue;
                        }

                        match serde_json::from_str::<McpMessage>(&event.data) {
                            Ok(message) => {
                                if message_tx.send(message).await.is_err() {
                                    debug!("SSE receiver dropped, stopping listener");
                                    break 'outer;
                                }
                            }
                            Err(e) => warn!("Failed to parse SSE message: {} - data: {}", e, event.data),
                        }
                    }
                }
                Some(Err(e)) => {
                    error!("SSE stream error: {}", e);
                    break;
                }
                None => {
                    debug!("SSE stream ended");
                    break;
                }
            }
        }

        connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn send(&mut self, message: McpMessage) -> Result<(), McpError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(McpError::transport("SSE stream is closed"));
        }

        let json = serde_json::to_string(&message)?;
        debug!("Sending MCP message: {}", json);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.request_timeout)
            .body(json)
            .send()
            .await
            .map_err(|e| McpError::transport(format!("Failed to send message: {}", e)))?;

        // JSON-RPC errors arrive on the event stream. An HTTP rejection of
        // the POST means the message never reached the server.
        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                if session_gone(status) {
                    warn!("MCP server no longer knows this session ({})", status);
                    self.connected.store(false, Ordering::SeqCst);
                }
                Err(McpError::transport(format!(
                    "Message endpoint rejected POST with {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn receive(&mut self) -> Result<McpMessage, McpError> {
        self.message_rx
            .recv()
            .await
            .ok_or_else(|| McpError::transport("SSE stream closed"))
    }

    async fn close(&mut self) -> Result<(), McpError> {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
        debug!("SSE transport closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
    }
}

/// The server dropped our session id, so every later POST fails the same way
fn session_gone(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE)
}

/// Split the first complete event (terminated by a blank line) off the
/// buffer. Accepts both `\n\n` and `\r\n\r\n` separators.
fn split_event(buffer: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let lf = find(buffer, b"\n\n").map(|i| (i, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|i| (i, 4));

    let (end, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    Some((buffer[..end].to_vec(), buffer[end + sep..].to_vec()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Decode one raw event block. Multiple `data:` lines are joined with `\n`.
/// Events without data (comments, keep-alives) yield `None`.
fn parse_sse_event(raw: &str) -> Option<SseEvent> {
    let mut event = String::from("message");
    let mut data: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event = value.trim().to_string();
        }
    }

    if data.is_empty() {
        return None;
    }

    Some(SseEvent {
        event,
        data: data.join("\n"),
    })
}

/// Resolve the announced endpoint against the stream URL
fn resolve_endpoint(base: &Url, endpoint: &str) -> Result<Url, McpError> {
    base.join(endpoint.trim()).map_err(|e| {
        McpError::protocol(format!("Invalid message endpoint '{}': {}", endpoint, e))
    })
}
