//! Integration tests for the OpenAI provider against a mock server

use super::openai::OpenAiProvider;
use super::provider_trait::CompletionService;
use crate::error::BridgeError;
use crate::llm::messages::{ConversationTurn, ToolCallRequest, ToolChoice};
use crate::llm::provider_types::ModelParameters;
use crate::tools::{ParamSpec, SchemaTranslator, ToolDefinition};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_provider(base_url: &str) -> OpenAiProvider {
    let http_client = Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to create HTTP client");
    OpenAiProvider::new(
        "test-api-key",
        base_url,
        ModelParameters::new("gpt-4o").with_max_tokens(512),
        http_client,
    )
}

fn mock_openai_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test123",
        "object": "chat.completion",
        "created": 1704067200,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 20,
            "total_tokens": 30
        }
    })
}

fn mock_openai_tool_call_response(tool_name: &str, args: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test456",
        "object": "chat.completion",
        "created": 1704067200,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc123",
                    "type": "function",
                    "function": {
                        "name": tool_name,
                        "arguments": args
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

fn pg_query_schema() -> Vec<crate::tools::FunctionSchema> {
    vec![SchemaTranslator::translate(
        &ToolDefinition::new("pg_query").with_parameter(ParamSpec::new("query", "string")),
    )]
}

#[tokio::test]
async fn test_complete_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({"model": "gpt-4o", "max_tokens": 512})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_openai_response("There are 42 users.")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let turns = vec![
        ConversationTurn::system("You are a helpful assistant."),
        ConversationTurn::user("How many users?"),
    ];

    let response = provider
        .complete(&turns, &[], ToolChoice::Auto)
        .await
        .unwrap();
    assert_eq!(response.content.as_deref(), Some("There are 42 users."));
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.usage.unwrap().prompt_tokens, 10);
}

#[tokio::test]
async fn test_complete_sends_tools_and_tool_choice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "tool_choice": "auto",
            "tools": [{
                "type": "function",
                "function": {
                    "name": "pg_query",
                    "description": "Tool for pg_query",
                    "parameters": {
                        "type": "object",
                        "properties": {"query": {"type": "string"}},
                        "required": ["query"]
                    }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            mock_openai_tool_call_response("pg_query", r#"{"query": "SELECT COUNT(*) FROM users"}"#),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let turns = vec![ConversationTurn::user("How many records are in users?")];

    let response = provider
        .complete(&turns, &pg_query_schema(), ToolChoice::Auto)
        .await
        .unwrap();
    assert_eq!(
        response.tool_calls,
        vec![ToolCallRequest::new(
            "call_abc123",
            "pg_query",
            r#"{"query": "SELECT COUNT(*) FROM users"}"#
        )]
    );
}

#[tokio::test]
async fn test_complete_sends_tool_turns() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "How many records are in users?"},
                {
                    "role": "assistant",
                    "tool_calls": [{"id": "call_abc123", "type": "function"}]
                },
                {"role": "tool", "tool_call_id": "call_abc123", "content": "[{\"count\":42}]"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_openai_response("42")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let turns = vec![
        ConversationTurn::user("How many records are in users?"),
        ConversationTurn::assistant_tool_calls(
            None,
            vec![ToolCallRequest::new(
                "call_abc123",
                "pg_query",
                r#"{"query":"SELECT COUNT(*) FROM users"}"#,
            )],
        ),
        ConversationTurn::tool_result("call_abc123", "pg_query", "[{\"count\":42}]"),
    ];

    let response = provider
        .complete(&turns, &pg_query_schema(), ToolChoice::Auto)
        .await
        .unwrap();
    assert_eq!(response.content.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_complete_api_error_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Invalid API key"}})),
        )
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let err = provider
        .complete(&[ConversationTurn::user("Hello!")], &[], ToolChoice::Auto)
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::CompletionService(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_complete_api_error_429_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit exceeded",
                "type": "rate_limit_error"
            }
        })))
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let err = provider
        .complete(&[ConversationTurn::user("Hello!")], &[], ToolChoice::Auto)
        .await
        .unwrap_err();

    let err_msg = err.to_string();
    assert!(err_msg.contains("429") || err_msg.contains("Rate limit"));
}

#[tokio::test]
async fn test_complete_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let err = provider
        .complete(&[ConversationTurn::user("Hello!")], &[], ToolChoice::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::CompletionService(_)));
}

#[tokio::test]
async fn test_complete_without_choices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let provider = create_test_provider(&mock_server.uri());
    let err = provider
        .complete(&[ConversationTurn::user("Hello!")], &[], ToolChoice::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::CompletionService(_)));
}

#[tokio::test]
async fn test_network_error() {
    let provider = create_test_provider("http://127.0.0.1:1");
    let err = provider
        .complete(&[ConversationTurn::user("Hello!")], &[], ToolChoice::Auto)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::CompletionService(_)));
}

#[test]
fn test_from_config() {
    let config = crate::config::BridgeConfig::new("sk-test", "postgres://localhost/app")
        .with_model("gpt-4o-mini")
        .with_base_url("http://localhost:4000/v1/");
    let provider = OpenAiProvider::from_config(&config).unwrap();
    assert_eq!(provider.model(), "gpt-4o-mini");
}
