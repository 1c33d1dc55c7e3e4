//! # Tool Errors
//!
//! Per-request failures (`ToolError`) and the single startup failure
//! (`RegistryError`). Both classify into [`ErrorKind`] so the façade can
//! render a stable code without matching on message text.

use scicomp_core::{ErrorKind, TensorError};
use thiserror::Error;

/// Failure of a single tool invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Store or shape validation failed.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// `delete_tensor` could not remove the tensor.
    #[error("error removing tensor: {0}")]
    Delete(#[source] TensorError),

    /// No handler is registered under this name.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Arguments failed to decode or hold an unusable value.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments {
        /// Tool that rejected the arguments.
        tool: String,
        /// Decoder or validation message.
        reason: String,
    },

    /// The kernel could not produce a result for valid input.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ToolError {
    /// Shorthand for a shape compatibility failure.
    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::Tensor(TensorError::ShapeMismatch(message.into()))
    }

    /// Shorthand for an argument value failure.
    pub fn invalid_arguments(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Tensor(err) | Self::Delete(err) => err.kind(),
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::Computation(_) => ErrorKind::ComputationFailed,
        }
    }
}

/// Startup-time registration failure. Fatal to process initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two modules tried to register the same tool name.
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

impl RegistryError {
    /// Classify this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateTool(_) => ErrorKind::DuplicateTool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_wrapper_keeps_not_found_kind() {
        let err = ToolError::Delete(TensorError::NotFound("x".into()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "error removing tensor: tensor 'x' not found in the store"
        );
    }

    #[test]
    fn transparent_tensor_error_display() {
        let err: ToolError = TensorError::ShapeMismatch("2 vs 3".into()).into();
        assert_eq!(err.to_string(), "shape mismatch: 2 vs 3");
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn registry_error_kind() {
        let err = RegistryError::DuplicateTool("transpose".into());
        assert_eq!(err.kind(), ErrorKind::DuplicateTool);
        assert!(err.to_string().contains("transpose"));
    }
}
