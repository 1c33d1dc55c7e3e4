//! Shared result handling for domain tools: optionally store the computed
//! value under `result_name`, then describe it as a [`ToolOutput`].
//!
//! JSON has no encoding for `inf` or `NaN`, so results holding either are
//! rejected before they reach the store or the wire.

use ndarray::{ArrayD, IxDyn};
use scicomp_core::{Tensor, TensorStore, ToolOutput};

use crate::error::ToolError;

pub(crate) fn emit_tensor(
    store: &TensorStore,
    result_name: Option<&str>,
    array: ArrayD<f64>,
) -> Result<ToolOutput, ToolError> {
    if let Some((index, value)) = array.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(non_finite(result_name, &format!("element {index} is {value}")));
    }
    let tensor = Tensor::from_array(array)?;
    match result_name {
        Some(name) => {
            store.insert(name, tensor.clone())?;
            Ok(ToolOutput::stored(name, &tensor))
        }
        None => Ok(ToolOutput::tensor(&tensor)),
    }
}

/// Scalars are stored as one-element tensors of shape `[1]`.
pub(crate) fn emit_scalar(
    store: &TensorStore,
    result_name: Option<&str>,
    value: f64,
) -> Result<ToolOutput, ToolError> {
    if !value.is_finite() {
        return Err(non_finite(result_name, &format!("value is {value}")));
    }
    if let Some(name) = result_name {
        let tensor = Tensor::from_array(ArrayD::from_elem(IxDyn(&[1]), value))?;
        store.insert(name, tensor)?;
    }
    Ok(ToolOutput::Scalar {
        value,
        name: result_name.map(str::to_string),
    })
}

fn non_finite(result_name: Option<&str>, detail: &str) -> ToolError {
    let target = result_name.map_or_else(|| "result".to_string(), |n| format!("result '{n}'"));
    ToolError::Computation(format!("{target} has non-finite values ({detail})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scicomp_core::ErrorKind;

    #[test]
    fn finite_tensor_is_stored() {
        let store = TensorStore::new();
        let array = ArrayD::from_elem(IxDyn(&[2]), 1.5);
        let out = emit_tensor(&store, Some("t"), array).unwrap();
        assert_eq!(out.kind(), "tensor");
        assert!(store.contains("t"));
    }

    #[test]
    fn nan_tensor_is_rejected_before_insert() {
        let store = TensorStore::new();
        let array = ArrayD::from_shape_vec(IxDyn(&[2]), vec![0.5, f64::NAN]).unwrap();
        let err = emit_tensor(&store, Some("t"), array).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputationFailed);
        assert_eq!(
            err.to_string(),
            "computation failed: result 't' has non-finite values (element 1 is NaN)"
        );
        assert!(store.is_empty());
    }

    #[test]
    fn infinite_scalar_is_rejected() {
        let store = TensorStore::new();
        let err = emit_scalar(&store, None, f64::INFINITY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputationFailed);
        assert!(err.to_string().contains("value is inf"));
        assert!(store.is_empty());
    }
}
