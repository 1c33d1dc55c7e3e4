//! # Error Types
//!
//! Store-level failures and the caller-visible error code set.
//!
//! Every error that can reach a caller maps to exactly one [`ErrorKind`].
//! Higher layers (`scicomp-tools`, `scicomp-api`) add their own variants but
//! never invent codes outside this enum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A requested shape is empty or contains a non-positive dimension.
    InvalidShape,
    /// Value count disagrees with the shape, or operand shapes are incompatible.
    ShapeMismatch,
    /// A referenced tensor name is absent from the store.
    NotFound,
    /// A tensor name cannot be represented in the newline-delimited listing.
    InvalidName,
    /// Two modules registered the same tool name.
    DuplicateTool,
    /// A dispatch named a tool that was never registered.
    UnknownTool,
    /// Tool arguments could not be decoded or failed a value check.
    InvalidArguments,
    /// The numeric kernel or artifact writer failed on valid input.
    ComputationFailed,
}

impl ErrorKind {
    /// Return the wire code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidShape => "INVALID_SHAPE",
            Self::ShapeMismatch => "SHAPE_MISMATCH",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidName => "INVALID_NAME",
            Self::DuplicateTool => "DUPLICATE_TOOL",
            Self::UnknownTool => "UNKNOWN_TOOL",
            Self::InvalidArguments => "INVALID_ARGUMENTS",
            Self::ComputationFailed => "COMPUTATION_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by shape validation and the tensor store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// The shape itself is unusable.
    #[error("invalid shape {dims:?}: {reason}")]
    InvalidShape {
        /// The dimensions as supplied by the caller.
        dims: Vec<i64>,
        /// Why the shape was rejected.
        reason: String,
    },

    /// Element count or operand shapes do not line up.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The named tensor does not exist.
    #[error("tensor '{0}' not found in the store")]
    NotFound(String),

    /// The name is empty or contains a line break.
    #[error("invalid tensor name {0:?}: names must be non-empty and contain no line breaks")]
    InvalidName(String),
}

impl TensorError {
    /// Classify this error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidShape { .. } => ErrorKind::InvalidShape,
            Self::ShapeMismatch(_) => ErrorKind::ShapeMismatch,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidName(_) => ErrorKind::InvalidName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_screaming_snake_case() {
        assert_eq!(ErrorKind::ShapeMismatch.as_str(), "SHAPE_MISMATCH");
        assert_eq!(
            serde_json::to_value(ErrorKind::ComputationFailed).unwrap(),
            serde_json::json!("COMPUTATION_FAILED")
        );
    }

    #[test]
    fn tensor_error_maps_to_kind() {
        assert_eq!(
            TensorError::NotFound("m".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TensorError::InvalidShape {
                dims: vec![0],
                reason: "zero".into()
            }
            .kind(),
            ErrorKind::InvalidShape
        );
    }

    #[test]
    fn not_found_message_names_the_tensor() {
        let err = TensorError::NotFound("weights".into());
        assert!(err.to_string().contains("'weights'"));
    }
}
