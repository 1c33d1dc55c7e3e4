//! # Store Introspection API
//!
//! Read and delete access to the tensor store for operators and dashboards.
//! Handlers route through the tool registry rather than touching the store
//! directly, so validation and error classification match `/mcp` exactly.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use scicomp_core::ToolOutput;
use scicomp_tools::ToolSchema;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Build the tensors router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/tools", get(list_tools))
        .route("/v1/tensors", get(list_tensors))
        .route("/v1/tensors/{name}", get(get_tensor).delete(delete_tensor))
}

/// GET /v1/tools: Registered tool schemas, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/tools",
    responses(
        (status = 200, description = "Registered tool schemas"),
    ),
    tag = "tools"
)]
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.registry.schemas())
}

/// GET /v1/tensors: Newline-joined names of stored tensors.
#[utoipa::path(
    get,
    path = "/v1/tensors",
    responses(
        (status = 200, description = "One tensor name per line, no trailing newline", content_type = "text/plain"),
    ),
    tag = "tensors"
)]
pub async fn list_tensors(State(state): State<AppState>) -> Result<String, AppError> {
    match state.call_tool("list_tensor_names", json!({})).await? {
        ToolOutput::NameList(text) => Ok(text),
        other => Err(AppError::Internal(format!(
            "list_tensor_names returned {}",
            other.kind()
        ))),
    }
}

/// GET /v1/tensors/{name}: Shape and row-major values of a tensor.
#[utoipa::path(
    get,
    path = "/v1/tensors/{name}",
    params(("name" = String, Path, description = "Tensor name")),
    responses(
        (status = 200, description = "Tensor shape and values"),
        (status = 404, description = "Tensor not found", body = crate::error::ErrorBody),
    ),
    tag = "tensors"
)]
pub async fn get_tensor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToolOutput>, AppError> {
    Ok(Json(state.call_tool("view_tensor", json!({ "name": name })).await?))
}

/// DELETE /v1/tensors/{name}: Remove a tensor from the store.
#[utoipa::path(
    delete,
    path = "/v1/tensors/{name}",
    params(("name" = String, Path, description = "Tensor name")),
    responses(
        (status = 200, description = "Tensor deleted"),
        (status = 404, description = "Tensor not found", body = crate::error::ErrorBody),
    ),
    tag = "tensors"
)]
pub async fn delete_tensor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToolOutput>, AppError> {
    Ok(Json(state.call_tool("delete_tensor", json!({ "name": name })).await?))
}
