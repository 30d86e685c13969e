//! Per-request virtual MCP endpoint over one catalogue snapshot.

use super::ports::ToolForwarder;
use crate::catalogue::{
    domain::{RegisteredTool, ToolInputSchema},
    services::CatalogueSnapshot,
};
use crate::mcp::protocol::{
    CallToolParams, Implementation, InboundMessage, JsonRpcErrorObject, JsonRpcRequest,
    JsonRpcResponse, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS, error_codes,
    error_result, methods, text_result,
};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the built-in diagnostic tool.
pub const STATUS_TOOL_NAME: &str = "gateway-status";

/// Fixed settings shared by every virtual endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    /// Implementation reported during `initialize`.
    pub server_info: Implementation,
    /// Whether [`STATUS_TOOL_NAME`] is listed and callable.
    pub status_tool: bool,
}

impl EndpointSettings {
    /// Creates settings with the diagnostic tool disabled.
    #[must_use]
    pub const fn new(server_info: Implementation) -> Self {
        Self {
            server_info,
            status_tool: false,
        }
    }

    /// Enables or disables the diagnostic tool.
    #[must_use]
    pub const fn with_status_tool(mut self, enabled: bool) -> Self {
        self.status_tool = enabled;
        self
    }
}

/// Short-lived MCP dispatcher exposing exactly one catalogue snapshot.
///
/// One endpoint serves one inbound HTTP exchange. Messages are handled in
/// the order given; a forwarding failure only affects its own call.
pub struct VirtualEndpoint {
    snapshot: Arc<CatalogueSnapshot>,
    forwarder: Arc<dyn ToolForwarder>,
    settings: Arc<EndpointSettings>,
    handled: usize,
}

impl VirtualEndpoint {
    /// Opens an endpoint over `snapshot`.
    #[must_use]
    pub fn open(
        snapshot: Arc<CatalogueSnapshot>,
        forwarder: Arc<dyn ToolForwarder>,
        settings: Arc<EndpointSettings>,
    ) -> Self {
        debug!(
            version = %snapshot.version(),
            tools = snapshot.len(),
            "virtual endpoint opened"
        );
        Self {
            snapshot,
            forwarder,
            settings,
            handled: 0,
        }
    }

    /// Returns the snapshot this endpoint serves.
    #[must_use]
    pub fn snapshot(&self) -> &CatalogueSnapshot {
        &self.snapshot
    }

    /// Handles one inbound message.
    ///
    /// Returns `None` for notifications and stray responses.
    pub async fn handle(&mut self, message: InboundMessage) -> Option<JsonRpcResponse> {
        self.handled += 1;
        match message {
            InboundMessage::Request(request) => Some(self.dispatch(request).await),
            InboundMessage::Notification(notification) => {
                debug!(method = %notification.method, "notification acknowledged");
                None
            }
            InboundMessage::Response => None,
            InboundMessage::Invalid { id, reason } => Some(JsonRpcResponse::failure(
                id,
                JsonRpcErrorObject::new(
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {reason}"),
                ),
            )),
        }
    }

    /// Tears the endpoint down.
    pub fn close(self) {
        debug!(messages = self.handled, "virtual endpoint closed");
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;
        let request_id = id.unwrap_or(Value::Null);

        let outcome = match method.as_str() {
            methods::INITIALIZE => Ok(self.initialize(params.as_ref())),
            methods::PING | methods::LOGGING_SET_LEVEL => Ok(json!({})),
            methods::TOOLS_LIST => Ok(self.list_tools()),
            methods::TOOLS_CALL => self.call_tool(params).await,
            other => Err(JsonRpcErrorObject::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(request_id, result),
            Err(error) => JsonRpcResponse::failure(request_id, error),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|value| value.get("protocolVersion"))
            .and_then(Value::as_str);
        let negotiated = requested
            .filter(|version| SUPPORTED_PROTOCOL_VERSIONS.contains(version))
            .unwrap_or(LATEST_PROTOCOL_VERSION);

        json!({
            "protocolVersion": negotiated,
            "capabilities": {
                "tools": { "listChanged": false },
                "logging": {}
            },
            "serverInfo": self.settings.server_info,
        })
    }

    fn list_tools(&self) -> Value {
        let mut tools: Vec<Value> = self
            .snapshot
            .tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema().to_json_schema(),
                })
            })
            .collect();

        if self.settings.status_tool {
            tools.push(json!({
                "name": STATUS_TOOL_NAME,
                "description": "Reports the catalogue version and the number of federated tools.",
                "inputSchema": { "type": "object", "properties": {} },
            }));
        }

        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcErrorObject> {
        let call: CallToolParams = params
            .ok_or_else(|| {
                JsonRpcErrorObject::new(error_codes::INVALID_PARAMS, "missing tools/call params")
            })
            .and_then(|raw| {
                serde_json::from_value(raw).map_err(|err| {
                    JsonRpcErrorObject::new(
                        error_codes::INVALID_PARAMS,
                        format!("invalid tools/call params: {err}"),
                    )
                })
            })?;

        if self.settings.status_tool && call.name == STATUS_TOOL_NAME {
            return Ok(self.status());
        }

        let Some(tool) = self.snapshot.find(&call.name) else {
            return Err(JsonRpcErrorObject::new(
                error_codes::INVALID_PARAMS,
                format!("Tool {} not found", call.name),
            ));
        };

        let arguments = match call.arguments {
            None | Some(Value::Null) => json!({}),
            Some(arguments) => arguments,
        };
        if let Err(reason) = validate_arguments(tool, &arguments) {
            return Ok(error_result(format!(
                "Input validation error: Invalid arguments for tool {}: {reason}",
                tool.name()
            )));
        }

        match self.forwarder.forward(tool, arguments).await {
            Ok(reply) => {
                debug!(tool = %tool.name(), "tool call completed");
                Ok(relay(reply))
            }
            Err(err) => {
                warn!(
                    tool = %tool.name(),
                    service = %tool.service_name(),
                    error = %err,
                    "tool call failed downstream"
                );
                Ok(error_result(format!(
                    "Error calling tool {}: {err}",
                    tool.original_tool_name()
                )))
            }
        }
    }

    fn status(&self) -> Value {
        let services: HashSet<&str> = self
            .snapshot
            .tools()
            .iter()
            .map(|tool| tool.service_name().as_str())
            .collect();
        let report = json!({
            "catalogueVersion": self.snapshot.version().value(),
            "services": services.len(),
            "tools": self.snapshot.len(),
        });
        text_result(pretty(&report))
    }
}

fn validate_arguments(tool: &RegisteredTool, arguments: &Value) -> Result<(), String> {
    match tool.input_schema() {
        ToolInputSchema::Typed(shape) => shape.validate(arguments).map_err(|err| err.to_string()),
        ToolInputSchema::Untyped if arguments.is_object() => Ok(()),
        ToolInputSchema::Untyped => Err(String::from("arguments must be an object")),
    }
}

fn relay(reply: Value) -> Value {
    if reply.get("content").is_some_and(Value::is_array) {
        reply
    } else {
        text_result(pretty(&reply))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
