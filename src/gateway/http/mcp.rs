//! `/mcp` handlers.

use super::GatewayState;
use crate::gateway::endpoint::VirtualEndpoint;
use crate::mcp::protocol::{InboundMessage, JsonRpcErrorObject, JsonRpcResponse, error_codes};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

pub(super) async fn handle_mcp(
    State(state): State<GatewayState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            return envelope(
                rejection.status(),
                error_codes::INVALID_REQUEST,
                rejection.body_text(),
            );
        }
    };

    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(error = %err, "rejecting unparsable MCP body");
            return envelope(
                StatusCode::BAD_REQUEST,
                error_codes::PARSE_ERROR,
                format!("Parse error: {err}"),
            );
        }
    };

    let snapshot = match state.catalogue.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "error handling MCP request");
            return envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                err.to_string(),
            );
        }
    };

    let mut endpoint = VirtualEndpoint::open(
        snapshot,
        Arc::clone(&state.forwarder),
        Arc::clone(&state.settings),
    );
    let response = exchange(&mut endpoint, payload).await;
    endpoint.close();
    response
}

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub(super) async fn method_not_allowed() -> Response {
    envelope(
        StatusCode::METHOD_NOT_ALLOWED,
        error_codes::SERVER_ERROR,
        "Method not allowed.",
    )
}

async fn exchange(endpoint: &mut VirtualEndpoint, payload: Value) -> Response {
    match payload {
        Value::Array(batch) if batch.is_empty() => envelope(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_REQUEST,
            "Invalid request: empty batch",
        ),
        Value::Array(batch) => {
            let mut replies = Vec::with_capacity(batch.len());
            for member in batch {
                if let Some(reply) = endpoint.handle(InboundMessage::classify(member)).await {
                    replies.push(reply);
                }
            }
            if replies.is_empty() {
                StatusCode::ACCEPTED.into_response()
            } else {
                (StatusCode::OK, Json(replies)).into_response()
            }
        }
        single => endpoint
            .handle(InboundMessage::classify(single))
            .await
            .map_or_else(
                || StatusCode::ACCEPTED.into_response(),
                |reply| (StatusCode::OK, Json(reply)).into_response(),
            ),
    }
}

fn envelope(status: StatusCode, code: i64, message: impl Into<String>) -> Response {
    let body = JsonRpcResponse::failure(Value::Null, JsonRpcErrorObject::new(code, message));
    (status, Json(body)).into_response()
}
