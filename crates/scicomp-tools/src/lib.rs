//! # scicomp-tools: Operation Registry and Tool Modules
//!
//! Tools are contributed by independent modules, each exposing one
//! `register_tools` function that receives the registry and a store handle:
//!
//! | Module              | Tools                                                    |
//! |---------------------|----------------------------------------------------------|
//! | [`lifecycle`]       | `create_tensor`, `view_tensor`, `list_tensor_names`, `delete_tensor` |
//! | [`linear_algebra`]  | elementwise arithmetic, `matrix_multiply`, `transpose`, `determinant`, `matrix_inverse`, `dot_product`, `cross_product`, `norm` |
//! | [`vector_calculus`] | `gradient`, `divergence`, `curl`, `laplacian`            |
//! | [`visualization`]   | `plot_tensor`                                            |
//!
//! Modules never import each other. Their handlers close over the store
//! handle and read every input through it, so the store stays the single
//! source of truth.
//!
//! ## Failure Contract
//!
//! Every tool resolves all input names and checks shape compatibility
//! before computing, and writes at most once (the optional `result_name`)
//! after the result exists. A failing call never modifies the store.

pub mod error;
pub mod lifecycle;
pub mod linear_algebra;
pub mod registry;
pub mod vector_calculus;
pub mod visualization;

mod emit;

use std::path::PathBuf;

use scicomp_core::TensorStore;

pub use error::{RegistryError, ToolError};
pub use registry::{ParameterSchema, ToolRegistry, ToolSchema};

/// Settings shared by tool modules.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Directory that `plot_tensor` writes SVG files into.
    pub plot_dir: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            plot_dir: std::env::temp_dir().join("scicomp-plots"),
        }
    }
}

/// Register every module's tools against a fresh registry.
///
/// Called once at startup. A [`RegistryError`] here means two modules
/// claim the same tool name and the process must not start.
pub fn build_registry(
    store: &TensorStore,
    config: &ToolsConfig,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    lifecycle::register_tools(&mut registry, store)?;
    linear_algebra::register_tools(&mut registry, store)?;
    vector_calculus::register_tools(&mut registry, store)?;
    visualization::register_tools(&mut registry, store, &config.plot_dir)?;
    tracing::info!(tools = registry.len(), "tool registry assembled");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_every_module() {
        let store = TensorStore::new();
        let registry = build_registry(&store, &ToolsConfig::default()).unwrap();
        for tool in [
            "create_tensor",
            "view_tensor",
            "list_tensor_names",
            "delete_tensor",
            "matrix_multiply",
            "determinant",
            "gradient",
            "curl",
            "plot_tensor",
        ] {
            assert!(registry.contains(tool), "missing {tool}");
        }
    }

    #[test]
    fn registering_a_module_twice_is_duplicate_tool() {
        let store = TensorStore::new();
        let mut registry = build_registry(&store, &ToolsConfig::default()).unwrap();
        let err = linear_algebra::register_tools(&mut registry, &store).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(_)));
    }
}
