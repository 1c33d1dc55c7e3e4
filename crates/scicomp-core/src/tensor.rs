//! # Tensor
//!
//! Dense `f64` tensor backed by `ndarray::ArrayD`.
//!
//! The array is kept in standard (row-major) layout so that `values()` and
//! the flat representation callers send in always agree element for element.

use ndarray::{ArrayD, IxDyn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::TensorError;
use crate::shape::Shape;

/// An immutable n-dimensional array of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: ArrayD<f64>,
}

impl Tensor {
    /// Reshape a flat row-major value list into a tensor.
    pub fn from_flat(shape: Shape, values: Vec<f64>) -> Result<Self, TensorError> {
        let expected = shape.element_count();
        if values.len() != expected {
            return Err(TensorError::ShapeMismatch(format!(
                "shape {shape} holds {expected} values, got {}",
                values.len()
            )));
        }

        let data = ArrayD::from_shape_vec(IxDyn(shape.dims()), values)
            .map_err(|e| TensorError::ShapeMismatch(e.to_string()))?;
        Ok(Self { shape, data })
    }

    /// Wrap a computed array. Zero-dimensional and empty arrays are rejected
    /// because they cannot be described by a valid [`Shape`].
    pub fn from_array(data: ArrayD<f64>) -> Result<Self, TensorError> {
        let shape = Shape::from_dims(data.shape().to_vec())?;
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { shape, data })
    }

    /// The validated shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Dimensions as a plain vector.
    pub fn dims(&self) -> Vec<usize> {
        self.shape.dims().to_vec()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Flattened values in row-major order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Borrow the underlying array for numeric kernels.
    pub fn array(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Consume the tensor, returning the underlying array.
    pub fn into_array(self) -> ArrayD<f64> {
        self.data
    }
}

impl Serialize for Tensor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Tensor", 2)?;
        state.serialize_field("shape", self.shape.dims())?;
        state.serialize_field("values", &self.values())?;
        state.end()
    }
}
