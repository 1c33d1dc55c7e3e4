//! # Store Lifecycle Tools
//!
//! Thin adapters over [`TensorStore`]: create, view, list, delete.

use scicomp_core::{TensorStore, ToolOutput};
use serde::Deserialize;

use crate::error::{RegistryError, ToolError};
use crate::registry::{ToolRegistry, ToolSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateArgs {
    shape: Vec<i64>,
    values: Vec<f64>,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NameArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

/// Register `create_tensor`, `view_tensor`, `list_tensor_names`, and
/// `delete_tensor`.
pub fn register_tools(registry: &mut ToolRegistry, store: &TensorStore) -> Result<(), RegistryError> {
    let s = store.clone();
    registry.register(
        ToolSchema::new(
            "create_tensor",
            "Create a tensor from a shape and a flat row-major list of values, \
             storing it under the given name (replacing any tensor of that name).",
        )
        .param("shape", "array", "Tensor shape as a list of positive integers", true)
        .param("values", "array", "Flat list of floats to fill the tensor", true)
        .param("name", "string", "Name to store the tensor under", true),
        move |args: CreateArgs| {
            let tensor = s.put(&args.name, &args.shape, args.values)?;
            Ok(ToolOutput::stored(args.name, &tensor))
        },
    )?;

    let s = store.clone();
    registry.register(
        ToolSchema::new("view_tensor", "Return the shape and values of a stored tensor.")
            .param("name", "string", "Name of the stored tensor", true),
        move |args: NameArgs| {
            let tensor = s.get(&args.name)?;
            Ok(ToolOutput::stored(args.name, &tensor))
        },
    )?;

    let s = store.clone();
    registry.register(
        ToolSchema::new(
            "list_tensor_names",
            "List the names of all stored tensors, one per line.",
        ),
        move |_: NoArgs| Ok(ToolOutput::name_list(s.list_names())),
    )?;

    let s = store.clone();
    registry.register(
        ToolSchema::new("delete_tensor", "Delete a tensor from the store.")
            .param("name", "string", "Name of the tensor to delete", true),
        move |args: NameArgs| {
            s.delete(&args.name).map_err(ToolError::Delete)?;
            Ok(ToolOutput::Deleted { name: args.name })
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scicomp_core::ErrorKind;
    use serde_json::json;

    fn setup() -> (TensorStore, ToolRegistry) {
        let store = TensorStore::new();
        let mut registry = ToolRegistry::new();
        register_tools(&mut registry, &store).unwrap();
        (store, registry)
    }

    #[test]
    fn create_then_view_returns_row_major_values() {
        let (_, registry) = setup();
        let created = registry
            .dispatch(
                "create_tensor",
                json!({ "shape": [2, 3], "values": [1, 2, 3, 4, 5, 6], "name": "m" }),
            )
            .unwrap();
        let viewed = registry.dispatch("view_tensor", json!({ "name": "m" })).unwrap();
        let expected = ToolOutput::Tensor {
            name: Some("m".into()),
            shape: vec![2, 3],
            values: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        assert_eq!(created, expected);
        assert_eq!(viewed, expected);
    }

    #[test]
    fn create_with_wrong_count_is_shape_mismatch_and_absent() {
        let (store, registry) = setup();
        let err = registry
            .dispatch(
                "create_tensor",
                json!({ "shape": [2, 2], "values": [1, 2, 3], "name": "bad" }),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        let listing = registry.dispatch("list_tensor_names", json!({})).unwrap();
        assert_eq!(listing, ToolOutput::NameList(String::new()));
        assert!(!store.contains("bad"));
    }

    #[test]
    fn create_with_non_positive_dim_is_invalid_shape() {
        let (_, registry) = setup();
        let err = registry
            .dispatch(
                "create_tensor",
                json!({ "shape": [2, -1], "values": [1, 2], "name": "neg" }),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);
    }

    #[test]
    fn view_missing_is_not_found() {
        let (_, registry) = setup();
        let err = registry.dispatch("view_tensor", json!({ "name": "ghost" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn delete_then_view_is_not_found() {
        let (store, registry) = setup();
        store.put("v", &[1], vec![1.0]).unwrap();
        let out = registry.dispatch("delete_tensor", json!({ "name": "v" })).unwrap();
        assert_eq!(out, ToolOutput::Deleted { name: "v".into() });
        let err = registry.dispatch("view_tensor", json!({ "name": "v" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn delete_missing_is_wrapped_not_found() {
        let (_, registry) = setup();
        let err = registry.dispatch("delete_tensor", json!({ "name": "v" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("error removing tensor"));
    }

    #[test]
    fn listing_is_newline_joined_and_sorted() {
        let (store, registry) = setup();
        store.put("b", &[1], vec![1.0]).unwrap();
        store.put("a", &[1], vec![1.0]).unwrap();
        let out = registry.dispatch("list_tensor_names", json!(null)).unwrap();
        assert_eq!(out, ToolOutput::NameList("a\nb".into()));
    }

    #[test]
    fn list_rejects_unexpected_arguments() {
        let (_, registry) = setup();
        let err = registry
            .dispatch("list_tensor_names", json!({ "filter": "a" }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }
}
