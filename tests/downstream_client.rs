//! Tests of the downstream MCP client and tool fetcher against fake services.

mod support;

use axum::http::StatusCode;
use concourse::catalogue::adapters::McpToolFetcher;
use concourse::catalogue::domain::ServiceUrl;
use concourse::catalogue::ports::{ToolFetchError, ToolFetcher};
use concourse::mcp::McpClientError;
use rstest::rstest;
use serde_json::json;
use support::{
    BoxError, FAKE_SESSION_ID, FakeDownstream, ReplyStyle, mcp_client, tool, unreachable_url,
};

#[rstest]
#[case::json(ReplyStyle::Json)]
#[case::event_stream(ReplyStyle::EventStream)]
#[tokio::test(flavor = "multi_thread")]
async fn session_lists_and_calls_tools(#[case] style: ReplyStyle) -> Result<(), BoxError> {
    let downstream = FakeDownstream::start_with(
        "shopping",
        vec![tool("search", json!({ "type": "object" }))],
        style,
    )
    .await?;
    let client = mcp_client()?;

    let mut session = client.connect(format!("{}/mcp", downstream.url())).await?;
    let listed = session.list_tools().await?;
    let called = session.call_tool("search", Some(json!({ "q": "tea" }))).await?;

    assert_eq!(session.session_id(), Some(FAKE_SESSION_ID));
    assert_eq!(session.protocol_version(), Some("2025-06-18"));
    assert_eq!(
        listed.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        vec!["search"]
    );
    assert_eq!(
        called.pointer("/content/0/text"),
        Some(&json!(r#"shopping:search:{"q":"tea"}"#))
    );

    session.close().await;
    assert_eq!(downstream.closed_sessions(), 1);
    assert_eq!(
        downstream.methods(),
        vec![
            "initialize",
            "notifications/initialized",
            "tools/list",
            "tools/call"
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_rpc_errors_are_surfaced() -> Result<(), BoxError> {
    let downstream = FakeDownstream::start("shopping", Vec::new()).await?;
    let client = mcp_client()?;
    let mut session = client.connect(format!("{}/mcp", downstream.url())).await?;

    let outcome = session.call_tool("explode", None).await;
    session.close().await;

    let Err(err) = outcome else {
        return Err("expected a JSON-RPC error".into());
    };
    assert!(matches!(
        &err,
        McpClientError::JsonRpc { code: -32603, message, .. } if message == "downstream exploded"
    ));
    assert!(!err.is_unreachable());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_status_is_unreachable() -> Result<(), BoxError> {
    let downstream = FakeDownstream::start("shopping", Vec::new()).await?;
    downstream.fail_with(StatusCode::SERVICE_UNAVAILABLE);
    let client = mcp_client()?;

    let outcome = client.connect(format!("{}/mcp", downstream.url())).await;

    let Err(err) = outcome else {
        return Err("expected the handshake to fail".into());
    };
    assert!(matches!(err, McpClientError::HttpStatus { status: 503, .. }));
    assert!(err.is_unreachable());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetcher_maps_descriptors() -> Result<(), BoxError> {
    let downstream = FakeDownstream::start(
        "shopping",
        vec![
            tool("getProductById", json!({ "type": "object", "required": ["id"] })),
            json!({ "name": "ping" }),
        ],
    )
    .await?;
    let fetcher = McpToolFetcher::new(mcp_client()?);

    let tools = fetcher.fetch_tools(&ServiceUrl::new(downstream.url())?).await?;

    assert_eq!(tools.len(), 2);
    let first = tools.first().ok_or("missing first tool")?;
    let second = tools.get(1).ok_or("missing second tool")?;
    assert_eq!(first.name(), "getProductById");
    assert_eq!(first.description(), "getProductById tool");
    assert!(first.input_schema().is_some());
    assert_eq!(second.name(), "ping");
    assert_eq!(second.description(), "");
    assert!(second.input_schema().is_none());
    assert_eq!(downstream.closed_sessions(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetcher_reports_unreachable_services() -> Result<(), BoxError> {
    let fetcher = McpToolFetcher::new(mcp_client()?);

    let outcome = fetcher.fetch_tools(&ServiceUrl::new(unreachable_url()?)?).await;

    assert!(matches!(outcome, Err(ToolFetchError::Unreachable { .. })));
    Ok(())
}
