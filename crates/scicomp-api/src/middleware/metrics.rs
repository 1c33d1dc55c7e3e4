//! # Request Metrics
//!
//! Counters go through the `metrics` facade into a Prometheus recorder.
//! `scicomp serve` installs that recorder globally. State built without one
//! keeps a private recorder, so `GET /metrics` still reports the traffic of
//! that router alone.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::state::AppState;

/// Counter name for HTTP requests seen by the API router.
pub const HTTP_REQUESTS_METRIC: &str = "scicomp_http_requests_total";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Where counters land and how `/metrics` renders them.
#[derive(Clone)]
pub struct MetricsSink {
    handle: PrometheusHandle,
    /// Set when no global recorder was installed for this state.
    local: Option<Arc<PrometheusRecorder>>,
}

impl MetricsSink {
    /// Render from the process-wide recorder behind `handle`.
    pub fn global(handle: PrometheusHandle) -> Self {
        Self {
            handle,
            local: None,
        }
    }

    /// A private recorder scoped to one state.
    pub fn local() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
            local: Some(Arc::new(recorder)),
        }
    }

    /// Run `emit` with this sink's recorder active.
    pub fn record(&self, emit: impl FnOnce()) {
        match &self.local {
            Some(recorder) => metrics::with_local_recorder(recorder.as_ref(), emit),
            None => emit(),
        }
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsSink")
            .field("local", &self.local.is_some())
            .finish()
    }
}

/// Count every request by method and response status.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let sink = request.extensions().get::<MetricsSink>().cloned();
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let emit = || {
        metrics::counter!(HTTP_REQUESTS_METRIC, "method" => method, "status" => status)
            .increment(1);
    };
    match sink {
        Some(sink) => sink.record(emit),
        None => emit(),
    }

    response
}

/// GET /metrics: Prometheus text exposition.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
        .into_response()
}
