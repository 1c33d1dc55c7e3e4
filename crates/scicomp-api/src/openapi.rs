//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "scicomp API",
        version = "0.1.0",
        description = "Named tensor store and numeric tool dispatch over JSON-RPC and REST.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::rpc::handle_rpc,
        crate::routes::tensors::list_tools,
        crate::routes::tensors::list_tensors,
        crate::routes::tensors::get_tensor,
        crate::routes::tensors::delete_tensor,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::rpc::RpcRequest,
        crate::routes::rpc::RpcResponse,
        crate::routes::rpc::RpcError,
    )),
    tags(
        (name = "rpc", description = "JSON-RPC 2.0 tool dispatch"),
        (name = "tools", description = "Tool registry introspection"),
        (name = "tensors", description = "Tensor store introspection"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
