//! Bridge configuration model

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MCP_URL: &str = "http://localhost:8000/sse";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 300;

/// Everything the bridge needs to reach the completion service, the MCP
/// server and the database
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Completion service API key
    pub api_key: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connection string handed to the MCP server's `connect` tool
    pub database_url: String,
    /// Event-stream URL of the MCP server
    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Timeout for each remote request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on one whole chat exchange, in seconds
    #[serde(default = "default_exchange_timeout_secs")]
    pub exchange_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_mcp_url() -> String {
    DEFAULT_MCP_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_exchange_timeout_secs() -> u64 {
    DEFAULT_EXCHANGE_TIMEOUT_SECS
}

impl BridgeConfig {
    /// Configuration with the two required values and defaults elsewhere
    pub fn new(api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            database_url: database_url.into(),
            mcp_url: default_mcp_url(),
            max_tokens: None,
            temperature: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            exchange_timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_mcp_url(mut self, mcp_url: impl Into<String>) -> Self {
        self.mcp_url = mcp_url.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }

    /// Check values that parse fine but cannot work
    pub fn validate(&self) -> BridgeResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(BridgeError::config("API key is empty"));
        }
        if self.database_url.trim().is_empty() {
            return Err(BridgeError::config("database URL is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(BridgeError::config("model identifier is empty"));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(BridgeError::config(format!(
                    "temperature {} is outside 0.0..=2.0",
                    temperature
                )));
            }
        }
        if self.request_timeout_secs == 0 || self.exchange_timeout_secs == 0 {
            return Err(BridgeError::config("timeouts must be at least one second"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("database_url", &"<redacted>")
            .field("mcp_url", &self.mcp_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("exchange_timeout_secs", &self.exchange_timeout_secs)
            .finish()
    }
}
