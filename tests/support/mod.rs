//! Fake downstream MCP services and a running gateway for integration tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use concourse::catalogue::adapters::{
    McpToolFetcher,
    memory::{InMemoryCatalogueVersion, InMemoryServiceCatalogue},
};
use concourse::catalogue::services::{CatalogueCache, CatalogueService};
use concourse::gateway::{EndpointSettings, McpToolForwarder, http::GatewayState};
use concourse::mcp::{McpHttpClient, protocol::Implementation};
use mockable::DefaultClock;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Boxed error type for fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Session identifier issued by every fake downstream.
pub const FAKE_SESSION_ID: &str = "fake-session-1";

/// Timeout applied to downstream exchanges in tests.
pub const DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(2);

/// How long tool `stall` takes to answer.
const STALL: Duration = Duration::from_secs(30);

/// How a fake downstream frames its replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStyle {
    /// `application/json` bodies.
    Json,
    /// A single `text/event-stream` message event.
    EventStream,
}

#[derive(Debug, Default)]
struct Recorded {
    methods: Vec<String>,
    calls: Vec<(String, Value)>,
    closed_sessions: usize,
}

struct FakeState {
    name: String,
    style: ReplyStyle,
    tools: Mutex<Vec<Value>>,
    outage: Mutex<Option<StatusCode>>,
    recorded: Mutex<Recorded>,
}

impl FakeState {
    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tools(&self) -> Vec<Value> {
        self.tools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn outage(&self) -> Option<StatusCode> {
        *self.outage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call(&self, id: Value, params: Option<&Value>) -> Value {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .cloned()
            .unwrap_or(Value::Null);
        self.recorded().calls.push((name.clone(), arguments.clone()));

        match name.as_str() {
            "explode" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32603, "message": "downstream exploded" },
            }),
            "raw" => success(id, json!({ "value": 42 })),
            _ => success(
                id,
                json!({
                    "content": [{ "type": "text", "text": format!("{}:{name}:{arguments}", self.name) }],
                }),
            ),
        }
    }
}

/// An MCP service on a random local port.
///
/// Serves `POST /mcp` and `DELETE /mcp`. Tool `explode` answers with a
/// JSON-RPC error, tool `raw` with a result lacking `content` and tool
/// `stall` only after 30 seconds. Every other tool echoes
/// `<service>:<tool>:<arguments>` as text.
pub struct FakeDownstream {
    url: String,
    state: Arc<FakeState>,
    task: JoinHandle<()>,
}

impl FakeDownstream {
    /// Starts a downstream answering with JSON bodies.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn start(name: &str, tools: Vec<Value>) -> Result<Self, BoxError> {
        Self::start_with(name, tools, ReplyStyle::Json).await
    }

    /// Starts a downstream with the given reply framing.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn start_with(
        name: &str,
        tools: Vec<Value>,
        style: ReplyStyle,
    ) -> Result<Self, BoxError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let state = Arc::new(FakeState {
            name: name.to_owned(),
            style,
            tools: Mutex::new(tools),
            outage: Mutex::new(None),
            recorded: Mutex::new(Recorded::default()),
        });
        let app = Router::new()
            .route("/mcp", post(handle_post).delete(handle_delete))
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            let _served = axum::serve(listener, app).await;
        });
        Ok(Self {
            url: format!("http://{address}"),
            state,
            task,
        })
    }

    /// Base url to register with the gateway.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replaces the advertised tools.
    pub fn set_tools(&self, tools: Vec<Value>) {
        *self.state.tools.lock().unwrap_or_else(PoisonError::into_inner) = tools;
    }

    /// Makes every subsequent request fail with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.outage.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Methods received so far, notifications included.
    pub fn methods(&self) -> Vec<String> {
        self.state.recorded().methods.clone()
    }

    /// Tool calls received so far, as `(tool, arguments)`.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.recorded().calls.clone()
    }

    /// Number of `DELETE` requests carrying the issued session id.
    pub fn closed_sessions(&self) -> usize {
        self.state.recorded().closed_sessions
    }
}

impl Drop for FakeDownstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_post(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Response {
    if let Some(status) = state.outage() {
        return status.into_response();
    }

    let method = message
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    state.recorded().methods.push(method.clone());

    let Some(id) = message.get("id").cloned() else {
        return StatusCode::ACCEPTED.into_response();
    };
    if method != "initialize" && !carries_session(&headers) {
        return (StatusCode::BAD_REQUEST, "missing session").into_response();
    }

    let reply = match method.as_str() {
        "initialize" => success(
            id,
            json!({
                "protocolVersion": "2025-06-18",
                "capabilities": { "tools": {} },
                "serverInfo": { "name": state.name, "version": "1.0.0" },
            }),
        ),
        "tools/list" => success(id, json!({ "tools": state.tools() })),
        "tools/call" => {
            if called_tool(&message) == Some("stall") {
                tokio::time::sleep(STALL).await;
            }
            state.call(id, message.get("params"))
        }
        other => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("Method not found: {other}") },
        }),
    };

    let mut response = match state.style {
        ReplyStyle::Json => Json(reply).into_response(),
        ReplyStyle::EventStream => (
            [(CONTENT_TYPE, "text/event-stream")],
            format!(": keep-alive\n\nevent: message\ndata: {reply}\n\n"),
        )
            .into_response(),
    };
    if method == "initialize" {
        response
            .headers_mut()
            .insert("mcp-session-id", HeaderValue::from_static(FAKE_SESSION_ID));
    }
    response
}

async fn handle_delete(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> StatusCode {
    if !carries_session(&headers) {
        return StatusCode::BAD_REQUEST;
    }
    state.recorded().closed_sessions += 1;
    StatusCode::OK
}

fn called_tool(message: &Value) -> Option<&str> {
    message.pointer("/params/name").and_then(Value::as_str)
}

fn carries_session(headers: &HeaderMap) -> bool {
    headers
        .get("mcp-session-id")
        .and_then(|value| value.to_str().ok())
        == Some(FAKE_SESSION_ID)
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

/// Returns a base url on which nothing listens.
///
/// # Errors
///
/// Returns an error when no local port can be bound.
pub fn unreachable_url() -> Result<String, BoxError> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{address}"))
}

/// Builds a declared tool entry for a fake downstream.
pub fn tool(name: &str, input_schema: Value) -> Value {
    json!({ "name": name, "description": format!("{name} tool"), "inputSchema": input_schema })
}

/// Builds an MCP client with the test timeout.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built.
pub fn mcp_client() -> Result<McpHttpClient, BoxError> {
    mcp_client_with_timeout(DOWNSTREAM_TIMEOUT)
}

fn mcp_client_with_timeout(timeout: Duration) -> Result<McpHttpClient, BoxError> {
    Ok(McpHttpClient::new(
        Implementation::new("concourse-tests", "0.0.0"),
        timeout,
    )?)
}

/// Handler state over in-memory storage and real downstream clients.
///
/// # Errors
///
/// Returns an error when the MCP client cannot be built.
pub fn memory_state(settings: EndpointSettings) -> Result<GatewayState, BoxError> {
    memory_state_with_timeout(settings, DOWNSTREAM_TIMEOUT)
}

/// Handler state whose downstream exchanges give up after `timeout`.
///
/// # Errors
///
/// Returns an error when the MCP client cannot be built.
pub fn memory_state_with_timeout(
    settings: EndpointSettings,
    timeout: Duration,
) -> Result<GatewayState, BoxError> {
    let client = mcp_client_with_timeout(timeout)?;
    let clock = Arc::new(DefaultClock);
    let repository = Arc::new(InMemoryServiceCatalogue::new());
    let versions = Arc::new(InMemoryCatalogueVersion::new(Arc::clone(&clock)));
    let registry = Arc::new(CatalogueService::new(
        Arc::clone(&repository),
        Arc::clone(&versions),
        Arc::new(McpToolFetcher::new(client.clone())),
        clock,
    ));
    let cache = Arc::new(CatalogueCache::new(repository, versions));
    let forwarder = Arc::new(McpToolForwarder::new(client, timeout));
    Ok(GatewayState::new(cache, registry, forwarder, settings))
}

/// Default endpoint settings for tests.
pub fn settings() -> EndpointSettings {
    EndpointSettings::new(Implementation::new("concourse", "0.0.0-test"))
}

/// A gateway served on a random local port.
pub struct RunningGateway {
    base: String,
    http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningGateway {
    /// Serves `state` until the gateway is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn start(state: GatewayState) -> Result<Self, BoxError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(concourse::gateway::http::serve(listener, state, async move {
            let _signalled = signal.await;
        }));
        Ok(Self {
            base: format!("http://{address}"),
            http: reqwest::Client::new(),
            shutdown: Some(shutdown),
            task,
        })
    }

    /// Absolute url of `path` on the gateway.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Shared HTTP client.
    pub const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Posts a JSON body to `/mcp`, returning the status and decoded body.
    ///
    /// The body is `Value::Null` when the reply is empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the body is not JSON.
    pub async fn mcp(&self, body: &Value) -> Result<(StatusCode, Value), BoxError> {
        let response = self.http.post(self.url("/mcp")).json(body).send().await?;
        decode(response).await
    }

    /// Registers a service through the registry API.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the body is not JSON.
    pub async fn register(&self, name: &str, url: &str) -> Result<(StatusCode, Value), BoxError> {
        let response = self
            .http
            .post(self.url("/register"))
            .json(&json!({ "name": name, "url": url }))
            .send()
            .await?;
        decode(response).await
    }

    /// Calls `tools/call` with request id 1.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the body is not JSON.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, BoxError> {
        let (_, body) = self
            .mcp(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": { "name": name, "arguments": arguments },
            }))
            .await?;
        Ok(body)
    }

    /// Lists the federated tool names in order.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the reply is malformed.
    pub async fn tool_names(&self) -> Result<Vec<String>, BoxError> {
        let (_, body) = self
            .mcp(&json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
            .await?;
        let tools = body
            .pointer("/result/tools")
            .and_then(Value::as_array)
            .ok_or("tools/list reply has no tools array")?;
        Ok(tools
            .iter()
            .filter_map(|tool| tool.get("name").and_then(Value::as_str))
            .map(str::to_owned)
            .collect())
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _sent = shutdown.send(());
        }
        self.task.abort();
    }
}

/// Reads a reply as `(status, json)`; empty bodies decode to `null`.
///
/// # Errors
///
/// Returns an error when the body cannot be read or is not JSON.
pub async fn decode(response: reqwest::Response) -> Result<(StatusCode, Value), BoxError> {
    let status = StatusCode::from_u16(response.status().as_u16())?;
    let text = response.text().await?;
    if text.is_empty() {
        return Ok((status, Value::Null));
    }
    Ok((status, serde_json::from_str(&text)?))
}
