//! # scicomp-api: Axum Service for the Tensor Store
//!
//! Exposes the tool registry over JSON-RPC 2.0 and offers REST
//! introspection of the tensor store.
//!
//! ## API Surface
//!
//! | Route                        | Module               | Purpose                     |
//! |------------------------------|----------------------|-----------------------------|
//! | `POST /mcp`                  | [`routes::rpc`]      | JSON-RPC tool dispatch      |
//! | `GET /v1/tools`              | [`routes::tensors`]  | Tool schemas                |
//! | `GET /v1/tensors`            | [`routes::tensors`]  | Newline-joined tensor names |
//! | `GET/DELETE /v1/tensors/{name}` | [`routes::tensors`] | View or delete a tensor  |
//! | `GET /metrics`               | [`middleware::metrics`] | Prometheus text          |
//! | `GET /openapi.json`          | [`openapi`]          | Generated OpenAPI document  |
//! | `GET /health/*`              | this module          | Unauthenticated probes      |
//!
//! [`stdio::serve_stdio`] answers the same JSON-RPC methods as `POST /mcp`,
//! one request per line on stdin.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! BodyLimit → Cors → TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod stdio;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics_sink = state.metrics.clone();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::rpc::router())
        .merge(routes::tensors::router())
        .merge(openapi::router())
        .route("/metrics", get(middleware::metrics::render_metrics))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics_sink))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(health)
        .merge(api)
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Browser clients on any origin may call the service.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers(Any)
        .expose_headers(Any)
        .max_age(Duration::from_secs(86_400))
}

/// Bind `host:port` from the state's configuration and serve until Ctrl-C.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let host = state.config.host.clone();
    let port = state.config.port;
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "scicomp API listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The registry exists before the router does.
async fn readiness() -> &'static str {
    "ready"
}
