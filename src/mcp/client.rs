//! Streamable-HTTP MCP client for downstream services.

use super::protocol::{
    CallToolParams, Implementation, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, LATEST_PROTOCOL_VERSION, ListToolsResult, PROTOCOL_VERSION_HEADER,
    SESSION_ID_HEADER, ToolDefinition, methods,
};
use super::sse::parse_event_stream;
use super::{McpClientError, McpClientResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const ACCEPTED_REPLY_TYPES: &str = "application/json, text/event-stream";
const EVENT_STREAM_TYPE: &str = "text/event-stream";
const MAX_TOOL_PAGES: usize = 64;

/// Factory for downstream MCP sessions.
///
/// Cloning is cheap; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct McpHttpClient {
    http: reqwest::Client,
    client_info: Implementation,
}

impl McpHttpClient {
    /// Creates a client whose every HTTP exchange is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(client_info: Implementation, timeout: Duration) -> McpClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| McpClientError::Transport {
                endpoint: String::from("<client>"),
                reason: err.to_string(),
            })?;
        Ok(Self { http, client_info })
    }

    /// Opens a session with the MCP endpoint at `endpoint`.
    ///
    /// Performs `initialize` followed by `notifications/initialized`.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when either handshake step fails.
    pub async fn connect(&self, endpoint: impl Into<String>) -> McpClientResult<DownstreamSession> {
        let mut session = DownstreamSession {
            http: self.http.clone(),
            endpoint: endpoint.into(),
            session_id: None,
            protocol_version: None,
            next_id: 0,
        };

        let params = serde_json::to_value(InitializeParams {
            protocol_version: LATEST_PROTOCOL_VERSION.to_owned(),
            capabilities: json!({}),
            client_info: self.client_info.clone(),
        })
        .map_err(|err| McpClientError::protocol(&session.endpoint, err.to_string()))?;

        let initialized = session.request(methods::INITIALIZE, Some(params)).await?;
        let handshake: InitializeResult = match serde_json::from_value(initialized) {
            Ok(handshake) => handshake,
            Err(err) => {
                let failure = McpClientError::protocol(
                    &session.endpoint,
                    format!("malformed initialize result: {err}"),
                );
                session.close().await;
                return Err(failure);
            }
        };
        debug!(
            endpoint = %session.endpoint,
            server = %handshake.server_info.name,
            protocol_version = %handshake.protocol_version,
            "downstream session initialised"
        );
        session.protocol_version = Some(handshake.protocol_version);

        if let Err(err) = session.notify(methods::INITIALIZED, None).await {
            session.close().await;
            return Err(err);
        }
        Ok(session)
    }
}

/// An initialised session with one downstream MCP endpoint.
///
/// Sessions are short-lived: open, use, then [`DownstreamSession::close`].
#[derive(Debug)]
pub struct DownstreamSession {
    http: reqwest::Client,
    endpoint: String,
    session_id: Option<String>,
    protocol_version: Option<String>,
    next_id: u64,
}

impl DownstreamSession {
    /// Returns the downstream-issued session identifier, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the negotiated protocol revision.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Lists every tool, following `nextCursor` pagination.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when a page request fails, a page is
    /// malformed, or the cursor chain does not terminate.
    pub async fn list_tools(&mut self) -> McpClientResult<Vec<ToolDefinition>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|current| json!({ "cursor": current }));
            let result = self.request(methods::TOOLS_LIST, params).await?;
            let page: ListToolsResult = serde_json::from_value(result).map_err(|err| {
                McpClientError::protocol(&self.endpoint, format!("malformed tools/list result: {err}"))
            })?;
            tools.extend(page.tools);

            match page.next_cursor {
                None => return Ok(tools),
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(McpClientError::protocol(
                        &self.endpoint,
                        format!("tools/list repeated cursor '{next}'"),
                    ));
                }
                Some(next) => cursor = Some(next),
            }
        }

        Err(McpClientError::protocol(
            &self.endpoint,
            format!("tools/list exceeded {MAX_TOOL_PAGES} pages"),
        ))
    }

    /// Invokes a tool and returns the raw result object.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the call cannot be delivered or the
    /// downstream answers with a JSON-RPC error.
    pub async fn call_tool(&mut self, name: &str, arguments: Option<Value>) -> McpClientResult<Value> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_owned(),
            arguments,
        })
        .map_err(|err| McpClientError::protocol(&self.endpoint, err.to_string()))?;
        self.request(methods::TOOLS_CALL, Some(params)).await
    }

    /// Terminates the session.
    ///
    /// Sends `DELETE` when the downstream issued a session identifier.
    /// Failures are logged; the session is gone either way.
    pub async fn close(self) {
        let Some(session_id) = self.session_id else {
            return;
        };
        match self
            .http
            .delete(&self.endpoint)
            .header(SESSION_ID_HEADER, &session_id)
            .send()
            .await
        {
            Ok(response) => debug!(
                endpoint = %self.endpoint,
                status = response.status().as_u16(),
                "downstream session closed"
            ),
            Err(err) => debug!(
                endpoint = %self.endpoint,
                error = %err,
                "downstream session close failed"
            ),
        }
    }

    async fn request(&mut self, method: &str, params: Option<Value>) -> McpClientResult<Value> {
        self.next_id += 1;
        let request_id = self.next_id;
        let response = self.post(&JsonRpcRequest::new(request_id, method, params)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(McpClientError::HttpStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        self.capture_session_id(response.headers());
        let is_event_stream = is_event_stream(response.headers());

        let body = response
            .text()
            .await
            .map_err(|err| McpClientError::from_reqwest(&self.endpoint, &err))?;

        let reply = if is_event_stream {
            parse_event_stream(&body)
                .into_iter()
                .filter(|event| event.is_message())
                .filter_map(|event| serde_json::from_str::<Value>(&event.data).ok())
                .find_map(|message| matching_response(message, request_id))
        } else {
            let message: Value = serde_json::from_str(&body).map_err(|err| {
                McpClientError::protocol(&self.endpoint, format!("reply is not JSON: {err}"))
            })?;
            matching_response(message, request_id)
        };

        let Some(reply) = reply else {
            return Err(McpClientError::protocol(
                &self.endpoint,
                format!("no response to {method} (id {request_id})"),
            ));
        };

        reply
            .into_result()
            .map_err(|error| McpClientError::JsonRpc {
                endpoint: self.endpoint.clone(),
                code: error.code,
                message: error.message,
            })
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> McpClientResult<()> {
        let response = self
            .post(&JsonRpcRequest::notification(method, params))
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(McpClientError::HttpStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            })
        }
    }

    async fn post(&self, message: &JsonRpcRequest) -> McpClientResult<reqwest::Response> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, ACCEPTED_REPLY_TYPES)
            .json(message);
        if let Some(session_id) = &self.session_id {
            builder = builder.header(SESSION_ID_HEADER, session_id);
        }
        if let Some(version) = &self.protocol_version {
            builder = builder.header(PROTOCOL_VERSION_HEADER, version);
        }

        debug!(endpoint = %self.endpoint, method = %message.method, "sending downstream message");
        builder
            .send()
            .await
            .map_err(|err| McpClientError::from_reqwest(&self.endpoint, &err))
    }

    fn capture_session_id(&mut self, headers: &HeaderMap) {
        if self.session_id.is_some() {
            return;
        }
        self.session_id = headers
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
    }
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with(EVENT_STREAM_TYPE))
}

fn matching_response(message: Value, request_id: u64) -> Option<JsonRpcResponse> {
    match message {
        Value::Array(batch) => batch
            .into_iter()
            .find_map(|member| matching_response(member, request_id)),
        single => serde_json::from_value::<JsonRpcResponse>(single)
            .ok()
            .filter(|response| response.id == json!(request_id))
            .filter(|response| response.result.is_some() || response.error.is_some()),
    }
}
