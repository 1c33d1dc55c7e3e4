//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The tensor store is the only mutable state. The tool registry is built
//! once from the configuration and frozen behind an `Arc`; every route that
//! touches tensors goes through [`AppState::call_tool`] so REST and JSON-RPC
//! callers see identical validation and error semantics. Tools run on the
//! blocking thread pool so a large inversion or a plot write never stalls
//! the async workers.

use std::path::PathBuf;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use scicomp_core::{TensorStore, ToolOutput};
use scicomp_tools::{build_registry, RegistryError, ToolRegistry, ToolsConfig};
use serde_json::Value;

use crate::error::CallError;
use crate::middleware::metrics::MetricsSink;

/// Counter incremented once per tool invocation, labelled by tool and outcome.
pub const TOOL_CALLS_METRIC: &str = "scicomp_tool_calls_total";

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Interface to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Directory `plot_tensor` writes SVG files into.
    pub plot_dir: PathBuf,
    /// Install the Prometheus recorder at startup.
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("plot_dir", &self.plot_dir)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            auth_token: None,
            plot_dir: ToolsConfig::default().plot_dir,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Settings handed to the tool modules.
    pub fn tools_config(&self) -> ToolsConfig {
        ToolsConfig {
            plot_dir: self.plot_dir.clone(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: TensorStore,
    pub registry: Arc<ToolRegistry>,
    pub config: AppConfig,
    /// Request and tool-call counters behind `/metrics`.
    pub metrics: MetricsSink,
}

impl AppState {
    /// Build an empty store and register every tool module against it.
    ///
    /// Fails only if two modules register the same tool name.
    pub fn try_new(config: AppConfig) -> Result<Self, RegistryError> {
        Self::with_prometheus(config, None)
    }

    /// As [`AppState::try_new`], rendering `/metrics` from the installed
    /// global recorder behind `handle` when one is given.
    pub fn with_prometheus(
        config: AppConfig,
        handle: Option<PrometheusHandle>,
    ) -> Result<Self, RegistryError> {
        let store = TensorStore::new();
        let registry = build_registry(&store, &config.tools_config())?;
        Ok(Self {
            store,
            registry: Arc::new(registry),
            config,
            metrics: handle.map_or_else(MetricsSink::local, MetricsSink::global),
        })
    }

    /// Dispatch a tool call on the blocking pool and record its outcome.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, CallError> {
        let registry = Arc::clone(&self.registry);
        let tool = name.to_string();
        let result = tokio::task::spawn_blocking(move || registry.dispatch(&tool, arguments)).await?;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().as_str(),
        };
        // Unknown names are caller-controlled; keep label cardinality bounded.
        let tool = if self.registry.contains(name) {
            name.to_string()
        } else {
            "unknown".to_string()
        };
        self.metrics.record(|| {
            metrics::counter!(TOOL_CALLS_METRIC, "tool" => tool, "outcome" => outcome).increment(1);
        });
        Ok(result?)
    }
}
