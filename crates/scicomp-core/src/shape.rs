//! # Shape
//!
//! A validated tensor shape. Callers send dimensions as signed integers so
//! that zero and negative requests can be reported as `InvalidShape` rather
//! than failing inside the JSON decoder.

use serde::{Deserialize, Serialize};

use crate::error::TensorError;

/// Non-empty list of strictly positive dimensions whose product fits `usize`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>")]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Validate caller-supplied dimensions.
    pub fn new(dims: &[i64]) -> Result<Self, TensorError> {
        let invalid = |reason: String| TensorError::InvalidShape {
            dims: dims.to_vec(),
            reason,
        };

        if dims.is_empty() {
            return Err(invalid("shape must have at least one dimension".into()));
        }

        let mut out = Vec::with_capacity(dims.len());
        let mut count: usize = 1;
        for (axis, &d) in dims.iter().enumerate() {
            if d <= 0 {
                return Err(invalid(format!("dimension {axis} is {d}, must be positive")));
            }
            let d = usize::try_from(d)
                .map_err(|_| invalid(format!("dimension {axis} does not fit in memory")))?;
            count = count
                .checked_mul(d)
                .ok_or_else(|| invalid("element count overflows".into()))?;
            out.push(d);
        }
        Ok(Self(out))
    }

    /// Build a shape from dimensions already known to be valid, such as the
    /// shape of a computed `ndarray` result.
    pub(crate) fn from_dims(dims: Vec<usize>) -> Result<Self, TensorError> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(TensorError::InvalidShape {
                dims: dims.iter().map(|&d| d as i64).collect(),
                reason: "tensors need at least one dimension and no empty axes".into(),
            });
        }
        Ok(Self(dims))
    }

    /// The dimensions, outermost first.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Product of all dimensions.
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }
}

impl TryFrom<Vec<i64>> for Shape {
    type Error = TensorError;

    fn try_from(dims: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(&dims)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
