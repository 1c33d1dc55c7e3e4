//! # JSON-RPC Tool Endpoint
//!
//! `POST /mcp` accepts a single JSON-RPC 2.0 request object.
//!
//! | Method                  | Params                           | Result                     |
//! |-------------------------|----------------------------------|----------------------------|
//! | `list_tools`, `tools/list` | none                          | `{ tools: [schema, ...] }` |
//! | `tools/call`            | `{ name, arguments }`            | tool output                |
//! | `resources/read`        | `{ uri: "data://tensor_store" }` | `{ uri, mime_type, text }` |
//! | any tool name           | tool arguments                   | tool output                |
//!
//! Every reply is HTTP 200; failures are carried in the `error` member with
//! the [`ErrorKind`] code under `error.data.kind`. A well-formed request
//! without an `id` member is a notification: it runs, and the endpoint
//! answers `202 Accepted` with no body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use scicomp_core::{ErrorKind, ToolOutput};
use scicomp_tools::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::CallError;
use crate::state::AppState;

pub const JSONRPC_VERSION: &str = "2.0";

/// URI of the read-only resource listing stored tensor names.
pub const TENSOR_STORE_URI: &str = "data://tensor_store";

// -- Error codes --------------------------------------------------------------

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const RESOURCE_NOT_FOUND: i64 = -32004;
pub const SERVER_ERROR: i64 = -32000;

/// JSON-RPC code for a classified failure.
pub fn error_code(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::UnknownTool => METHOD_NOT_FOUND,
        ErrorKind::InvalidArguments
        | ErrorKind::InvalidShape
        | ErrorKind::ShapeMismatch
        | ErrorKind::InvalidName => INVALID_PARAMS,
        ErrorKind::NotFound => RESOURCE_NOT_FOUND,
        ErrorKind::ComputationFailed | ErrorKind::DuplicateTool => SERVER_ERROR,
    }
}

// -- Wire types ---------------------------------------------------------------

/// JSON-RPC 2.0 request object.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// Echoed back unchanged. Omit it to send a notification.
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC 2.0 response object. Exactly one of `result` and `error` is set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        let kind = err.kind();
        Self {
            code: error_code(kind),
            message: err.to_string(),
            data: Some(json!({ "kind": kind })),
        }
    }
}

impl From<CallError> for RpcError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Tool(err) => err.into(),
            CallError::Worker(err) => {
                tracing::error!(error = %err, "tool worker failed");
                Self::new(INTERNAL_ERROR, "internal error")
            }
        }
    }
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ReadParams {
    uri: String,
}

// -- Handler ------------------------------------------------------------------

/// Build the JSON-RPC router.
pub fn router() -> Router<AppState> {
    Router::new().route("/mcp", post(handle_rpc))
}

/// POST /mcp: Dispatch a JSON-RPC 2.0 request.
#[utoipa::path(
    post,
    path = "/mcp",
    request_body = RpcRequest,
    responses(
        (status = 200, description = "JSON-RPC response (success or error)", body = RpcResponse),
        (status = 202, description = "Notification accepted, no body"),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    tag = "rpc"
)]
pub async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    match handle_message(&state, &body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Decode and run one JSON-RPC message. `None` for notifications.
pub async fn handle_message(state: &AppState, body: &[u8]) -> Option<RpcResponse> {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            return Some(RpcResponse::failure(
                Value::Null,
                RpcError::new(PARSE_ERROR, format!("parse error: {e}")),
            ))
        }
    };
    let id = raw.get("id").cloned();

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return Some(RpcResponse::failure(
                id.unwrap_or_default(),
                RpcError::new(INVALID_REQUEST, format!("invalid request: {e}")),
            ))
        }
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return Some(RpcResponse::failure(
            request.id,
            RpcError::new(INVALID_REQUEST, "invalid request: jsonrpc must be \"2.0\""),
        ));
    }

    tracing::debug!(method = %request.method, notification = id.is_none(), "rpc request");
    let result = dispatch(state, request).await;
    let Some(id) = id else {
        if let Err(error) = result {
            tracing::debug!(code = error.code, message = %error.message, "notification failed");
        }
        return None;
    };
    Some(match result {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    })
}

async fn dispatch(state: &AppState, request: RpcRequest) -> Result<Value, RpcError> {
    match request.method.as_str() {
        "list_tools" | "tools/list" => Ok(json!({ "tools": state.registry.schemas() })),
        "tools/call" => {
            let params: CallParams = decode_params(request.params)?;
            call(state, &params.name, params.arguments).await
        }
        "resources/read" => {
            let params: ReadParams = decode_params(request.params)?;
            if params.uri != TENSOR_STORE_URI {
                return Err(RpcError {
                    code: RESOURCE_NOT_FOUND,
                    message: format!("unknown resource '{}'", params.uri),
                    data: Some(json!({ "kind": ErrorKind::NotFound })),
                });
            }
            match state.call_tool("list_tensor_names", Value::Null).await? {
                ToolOutput::NameList(text) => Ok(json!({
                    "uri": TENSOR_STORE_URI,
                    "mime_type": "text/plain",
                    "text": text,
                })),
                other => Err(RpcError::new(
                    INTERNAL_ERROR,
                    format!("list_tensor_names returned {}", other.kind()),
                )),
            }
        }
        tool => call(state, tool, request.params).await,
    }
}

async fn call(state: &AppState, tool: &str, arguments: Value) -> Result<Value, RpcError> {
    let output = state.call_tool(tool, arguments).await?;
    serde_json::to_value(output).map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))
}

fn decode_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError {
        code: INVALID_PARAMS,
        message: format!("invalid params: {e}"),
        data: Some(json!({ "kind": ErrorKind::InvalidArguments })),
    })
}
