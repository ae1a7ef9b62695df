//! Response parsing

use crate::error::{BridgeError, BridgeResult};
use crate::llm::messages::{CompletionResponse, TokenUsage, ToolCallRequest};
use serde_json::Value;

/// Response parser
pub struct ResponseParser;

impl ResponseParser {
    /// Parse an OpenAI chat-completions response
    pub fn parse_openai(response: Value) -> BridgeResult<CompletionResponse> {
        let choice = response
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| BridgeError::completion("response contains no choices"))?;

        let message = choice
            .get("message")
            .ok_or_else(|| BridgeError::completion("first choice has no message"))?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut tool_calls = Vec::new();
        if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
            for call in calls {
                tool_calls.push(Self::parse_tool_call(call)?);
            }
        }

        let usage = response
            .get("usage")
            .and_then(Value::as_object)
            .map(|usage| {
                let count = |key: &str| {
                    usage
                        .get(key)
                        .and_then(Value::as_u64)
                        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
                };
                TokenUsage {
                    prompt_tokens: count("prompt_tokens"),
                    completion_tokens: count("completion_tokens"),
                    total_tokens: count("total_tokens"),
                }
            });

        Ok(CompletionResponse {
            content,
            tool_calls,
            finish_reason: choice
                .get("finish_reason")
                .and_then(Value::as_str)
                .map(str::to_string),
            usage,
        })
    }

    fn parse_tool_call(call: &Value) -> BridgeResult<ToolCallRequest> {
        let id = call
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BridgeError::completion("tool call without an id"))?;

        let function = call
            .get("function")
            .and_then(Value::as_object)
            .ok_or_else(|| BridgeError::completion(format!("tool call {} has no function", id)))?;

        let name = function
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BridgeError::completion(format!("tool call {} has no name", id)))?;

        // Arguments are normally a JSON-encoded string; some compatible
        // servers send the object itself.
        let arguments = match function.get("arguments") {
            None | Some(Value::Null) => "{}".to_string(),
            Some(Value::String(encoded)) => encoded.clone(),
            Some(other) => other.to_string(),
        };

        Ok(ToolCallRequest::new(id, name, arguments))
    }
}
