//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse` for the
//! REST routes. Tool failures map onto HTTP status codes by their
//! [`ErrorKind`]; the kind itself travels in `details` so REST and JSON-RPC
//! callers can branch on the same value.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scicomp_core::ErrorKind;
use scicomp_tools::ToolError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{message}")]
    NotFound { message: String, kind: ErrorKind },

    /// Request could not be applied to the current store (422).
    #[error("{message}")]
    Validation { message: String, kind: ErrorKind },

    /// Authentication failure, missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotFound { kind, .. } | Self::Validation { kind, .. } => Some(*kind),
            Self::Unauthorized(_) | Self::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.kind().map(|k| serde_json::json!({ "kind": k })),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Failure of a tool call made through [`crate::state::AppState::call_tool`].
#[derive(Error, Debug)]
pub enum CallError {
    /// The tool ran and rejected the request.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The blocking worker running the tool panicked or was cancelled.
    #[error("tool worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<CallError> for AppError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Tool(err) => err.into(),
            CallError::Worker(err) => Self::Internal(format!("tool worker failed: {err}")),
        }
    }
}

impl From<ToolError> for AppError {
    fn from(err: ToolError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match kind {
            ErrorKind::NotFound | ErrorKind::UnknownTool => Self::NotFound { message, kind },
            ErrorKind::InvalidShape
            | ErrorKind::ShapeMismatch
            | ErrorKind::InvalidName
            | ErrorKind::InvalidArguments => Self::Validation { message, kind },
            ErrorKind::ComputationFailed | ErrorKind::DuplicateTool => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scicomp_core::TensorError;

    #[test]
    fn not_found_tool_error_is_404() {
        let err = AppError::from(ToolError::from(TensorError::NotFound("m".into())));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn unknown_tool_is_404() {
        let err = AppError::from(ToolError::UnknownTool("x".into()));
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), Some(ErrorKind::UnknownTool));
    }

    #[test]
    fn shape_and_argument_errors_are_422() {
        for err in [
            ToolError::shape_mismatch("a vs b"),
            ToolError::invalid_arguments("view_tensor", "missing field `name`"),
            ToolError::from(TensorError::InvalidName("empty".into())),
        ] {
            let (status, code) = AppError::from(err).status_and_code();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(code, "VALIDATION_ERROR");
        }
    }

    #[test]
    fn computation_failure_is_internal() {
        let err = AppError::from(ToolError::Computation("disk full".into()));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), None);
    }

    #[tokio::test]
    async fn panicked_worker_is_internal() {
        let join_err = tokio::task::spawn_blocking(|| panic!("kernel blew up"))
            .await
            .unwrap_err();
        let err = AppError::from(CallError::from(join_err));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn unauthorized_status_code() {
        let err = AppError::Unauthorized("no token".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "UNAUTHORIZED");
    }
}
