//! OpenAI provider implementation

use super::provider_trait::CompletionService;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::llm::converters::{MessageConverter, ToolConverter};
use crate::llm::messages::{CompletionResponse, ConversationTurn, ToolChoice};
use crate::llm::parsers::ResponseParser;
use crate::llm::provider_types::ModelParameters;
use crate::tools::FunctionSchema;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, instrument};

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model_params: ModelParameters,
    http_client: Client,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_params: ModelParameters,
        http_client: Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_params,
            http_client,
        }
    }

    /// Provider with an HTTP client bounded by the configured request timeout
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BridgeError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            ModelParameters::from(config),
            http_client,
        ))
    }

    fn request_body(
        &self,
        turns: &[ConversationTurn],
        tools: &[FunctionSchema],
        tool_choice: ToolChoice,
    ) -> Value {
        let mut request_body = json!({
            "model": self.model_params.model,
            "messages": MessageConverter::to_openai(turns),
        });

        if let Some(max_tokens) = self.model_params.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = self.model_params.temperature {
            request_body["temperature"] = json!(temperature);
        }

        if !tools.is_empty() {
            request_body["tools"] = json!(ToolConverter::to_openai(tools));
            request_body["tool_choice"] = json!(tool_choice.as_str());
        }

        request_body
    }
}

#[async_trait]
impl CompletionService for OpenAiProvider {
    #[instrument(skip(self, turns, tools), fields(model = %self.model_params.model), level = "debug")]
    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[FunctionSchema],
        tool_choice: ToolChoice,
    ) -> BridgeResult<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = self.request_body(turns, tools, tool_choice);

        debug!("Sending {} turns and {} tools to {}", turns.len(), tools.len(), url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BridgeError::completion(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BridgeError::completion(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| BridgeError::completion(format!("Failed to parse OpenAI response: {}", e)))?;

        let parsed = ResponseParser::parse_openai(response_json)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Token usage: prompt={} completion={} total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.model_params.model
    }
}
