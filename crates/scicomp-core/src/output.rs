//! # Tool Output
//!
//! Every tool returns one [`ToolOutput`], serialized as
//! `{ "kind": ..., "payload": ... }`. Errors travel on the `Err` side of the
//! tool's `Result` and are rendered by the façade.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// Tagged result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ToolOutput {
    /// A tensor value, optionally stored under `name`.
    Tensor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
    },
    /// A single number, optionally stored under `name` as a one-element tensor.
    Scalar {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Newline-joined tensor names.
    NameList(String),
    /// Confirmation that a tensor was removed.
    Deleted { name: String },
    /// Reference to a rendered artifact such as a plot.
    Artifact { uri: String, media_type: String },
}

impl ToolOutput {
    /// Describe an unstored tensor.
    pub fn tensor(tensor: &Tensor) -> Self {
        Self::Tensor {
            name: None,
            shape: tensor.dims(),
            values: tensor.values(),
        }
    }

    /// Describe a tensor stored under `name`.
    pub fn stored(name: impl Into<String>, tensor: &Tensor) -> Self {
        Self::Tensor {
            name: Some(name.into()),
            shape: tensor.dims(),
            values: tensor.values(),
        }
    }

    /// Join names with `\n`, the listing format existing callers parse.
    pub fn name_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::NameList(joined)
    }

    /// The `kind` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tensor { .. } => "tensor",
            Self::Scalar { .. } => "scalar",
            Self::NameList(_) => "name_list",
            Self::Deleted { .. } => "deleted",
            Self::Artifact { .. } => "artifact",
        }
    }
}
