use super::*;
use crate::mcp::{McpError, McpTool, McpToolResult};
use crate::session::fake_service::FakeToolService;

async fn session_with(service: Arc<FakeToolService>) -> Session {
    Session::initialize(service).await.unwrap()
}

async fn connected_session(service: Arc<FakeToolService>) -> Session {
    let mut session = session_with(service).await;
    session
        .connect_database("postgres://localhost/app")
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_initialize_builds_registry() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let session = session_with(service.clone()).await;

    assert_eq!(service.list_calls(), 1);
    assert_eq!(
        session.registry().names(),
        vec!["connect", "disconnect", "pg_query", "pg_explain"]
    );
    assert_eq!(
        session.registry().lookup("pg_query").unwrap().description,
        "Tool for pg_query"
    );
    assert!(session.connection_id().is_none());
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_initialize_with_no_tools_fails() {
    let service = Arc::new(FakeToolService::with_tools(Vec::new()));
    let err = Session::initialize(service).await.err().unwrap();
    assert_eq!(err, BridgeError::EmptyRegistry);
}

#[tokio::test]
async fn test_initialize_with_malformed_listing_fails() {
    let service = Arc::new(FakeToolService::with_tools(vec![McpTool {
        name: "pg_query".to_string(),
        description: None,
        input_schema: json!({"type": "object", "properties": ["query"]}),
    }]));
    let err = Session::initialize(service).await.err().unwrap();
    assert!(matches!(err, BridgeError::Protocol(_)));
}

#[tokio::test]
async fn test_connect_database_records_id() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = session_with(service.clone()).await;

    let id = session
        .connect_database("postgres://localhost/app")
        .await
        .unwrap();

    assert_eq!(id, "conn-1");
    assert_eq!(session.connection_id(), Some("conn-1"));
    assert_eq!(
        service.calls(),
        vec![(
            "connect".to_string(),
            json!({"connection_string": "postgres://localhost/app"})
        )]
    );
}

#[tokio::test]
async fn test_connect_database_accepts_conn_id_spelling() {
    let service = Arc::new(
        FakeToolService::pg_mcp()
            .with_handler(|_, _| Ok(McpToolResult::json(&json!({"conn_id": "c-7"})))),
    );
    let mut session = session_with(service).await;

    let id = session.connect_database("postgres://db/app").await.unwrap();
    assert_eq!(id, "c-7");
}

#[tokio::test]
async fn test_connect_database_without_id_is_rejected() {
    let service = Arc::new(
        FakeToolService::pg_mcp()
            .with_handler(|_, _| Ok(McpToolResult::json(&json!({"status": "ok"})))),
    );
    let mut session = session_with(service).await;

    let err = session.connect_database("postgres://db/app").await.unwrap_err();
    assert!(matches!(err, BridgeError::ConnectionRejected(_)));
    assert!(session.connection_id().is_none());
}

#[tokio::test]
async fn test_connect_database_error_result_is_rejected() {
    let service = Arc::new(
        FakeToolService::pg_mcp()
            .with_handler(|_, _| Ok(McpToolResult::error("password authentication failed"))),
    );
    let mut session = session_with(service).await;

    let err = session.connect_database("postgres://db/app").await.unwrap_err();
    match err {
        BridgeError::ConnectionRejected(message) => {
            assert!(message.contains("password authentication failed"))
        }
        other => panic!("expected ConnectionRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_tool_without_connection_never_reaches_transport() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = session_with(service.clone()).await;

    let err = session
        .execute_tool("pg_query", json!({"query": "SELECT 1"}))
        .await
        .unwrap_err();

    assert_eq!(err, BridgeError::not_connected("pg_query"));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_execute_tool_fills_connection_id() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    let result = session
        .execute_tool("pg_query", json!({"query": "SELECT COUNT(*) FROM users"}))
        .await
        .unwrap();

    assert_eq!(result.payload(), json!([{"count": 42}]));
    let (name, args) = service.calls().pop().unwrap();
    assert_eq!(name, "pg_query");
    assert_eq!(
        args,
        json!({"query": "SELECT COUNT(*) FROM users", "connection_id": "conn-1"})
    );
}

#[tokio::test]
async fn test_execute_tool_keeps_caller_connection_id() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    session
        .execute_tool(
            "pg_query",
            json!({"connection_id": "other", "query": "SELECT 1"}),
        )
        .await
        .unwrap();

    let (_, args) = service.calls().pop().unwrap();
    assert_eq!(args["connection_id"], "other");
}

#[tokio::test]
async fn test_execute_tool_rejects_unknown_tool_and_bad_arguments() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    assert_eq!(
        session.execute_tool("pg_drop", json!({})).await.unwrap_err(),
        BridgeError::ToolNotFound("pg_drop".to_string())
    );
    assert!(matches!(
        session.execute_tool("pg_query", json!("SELECT 1")).await,
        Err(BridgeError::InvalidArguments { .. })
    ));
    assert_eq!(service.call_names(), vec!["connect"]);
}

#[tokio::test]
async fn test_model_driven_connect_and_disconnect_track_id() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = session_with(service).await;

    session
        .execute_tool("connect", json!({"connection_string": "postgres://db/app"}))
        .await
        .unwrap();
    assert_eq!(session.connection_id(), Some("conn-1"));

    session.execute_tool("disconnect", json!({})).await.unwrap();
    assert!(session.connection_id().is_none());
}

#[tokio::test]
async fn test_disconnect_of_other_connection_keeps_session_id() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    session
        .execute_tool("disconnect", json!({"connection_id": "conn-other"}))
        .await
        .unwrap();
    assert_eq!(session.connection_id(), Some("conn-1"));
    assert_eq!(service.calls()[1].1, json!({"connection_id": "conn-other"}));

    session
        .execute_tool("disconnect", json!({"connection_id": "conn-1"}))
        .await
        .unwrap();
    assert!(session.connection_id().is_none());
}

#[tokio::test]
async fn test_remote_error_is_surfaced() {
    let service = Arc::new(FakeToolService::pg_mcp().with_handler(|name, _| match name {
        "connect" => Ok(McpToolResult::json(&json!({"connection_id": "conn-1"}))),
        _ => Err(McpError::server(-32000, "relation \"users\" does not exist")),
    }));
    let mut session = connected_session(service).await;

    let err = session.execute_query("SELECT * FROM users").await.unwrap_err();
    assert!(matches!(err, BridgeError::Remote { code: -32000, .. }));
    assert!(err.is_tool_level());
    assert_eq!(session.connection_id(), Some("conn-1"));
}

#[tokio::test]
async fn test_lost_transport_clears_connection() {
    let service = Arc::new(FakeToolService::pg_mcp().with_handler(|name, _| match name {
        "connect" => Ok(McpToolResult::json(&json!({"connection_id": "conn-1"}))),
        _ => Err(McpError::transport("SSE stream closed")),
    }));
    let mut session = connected_session(service.clone()).await;
    service.set_connected(false);

    let err = session.execute_query("SELECT 1").await.unwrap_err();
    assert!(err.is_transport());
    assert!(session.connection_id().is_none());
}

#[tokio::test]
async fn test_execute_and_explain_query() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    session.execute_query("SELECT 1").await.unwrap();
    let plan = session.explain_query("SELECT 1").await.unwrap();

    assert_eq!(plan.payload()[0]["QUERY PLAN"], "Seq Scan on users");
    let calls = service.calls();
    assert_eq!(
        calls[1],
        (
            "pg_query".to_string(),
            json!({"connection_id": "conn-1", "query": "SELECT 1"})
        )
    );
    assert_eq!(calls[2].0, "pg_explain");
}

#[tokio::test]
async fn test_query_helpers_require_connection() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = session_with(service.clone()).await;

    assert_eq!(
        session.explain_query("SELECT 1").await.unwrap_err(),
        BridgeError::not_connected("pg_explain")
    );
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    session.disconnect().await.unwrap();
    session.disconnect().await.unwrap();

    assert_eq!(service.call_names(), vec!["connect", "disconnect"]);
    assert_eq!(
        service.calls()[1].1,
        json!({"connection_id": "conn-1"})
    );
    assert!(session.connection_id().is_none());
}

#[tokio::test]
async fn test_disconnect_without_connection_is_noop() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = session_with(service.clone()).await;

    session.disconnect().await.unwrap();
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_close_disconnects_and_closes_transport() {
    let service = Arc::new(FakeToolService::pg_mcp());
    let mut session = connected_session(service.clone()).await;

    session.close().await.unwrap();

    assert_eq!(service.call_names(), vec!["connect", "disconnect"]);
    assert!(!session.is_connected());
    assert!(session.connection_id().is_none());
}
