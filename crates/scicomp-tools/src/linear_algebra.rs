//! # Linear Algebra Tools
//!
//! Elementwise arithmetic, matrix products, and the classic square-matrix
//! routines over stored tensors. Elementwise tools require identical shapes;
//! no broadcasting is performed.
//!
//! `determinant` and `matrix_inverse` hand the matrix to `nalgebra`, whose
//! LU decomposition with partial pivoting does the numeric work.

use nalgebra::DMatrix;
use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, Ix1, Ix2};
use scicomp_core::{Tensor, TensorStore};
use serde::Deserialize;

use crate::emit::{emit_scalar, emit_tensor};
use crate::error::{RegistryError, ToolError};
use crate::registry::{ToolRegistry, ToolSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BinaryArgs {
    a: String,
    b: String,
    #[serde(default)]
    result_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnaryArgs {
    name: String,
    #[serde(default)]
    result_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScaleArgs {
    name: String,
    factor: f64,
    #[serde(default)]
    result_name: Option<String>,
}

type ElementwiseOp = fn(&ArrayD<f64>, &ArrayD<f64>) -> ArrayD<f64>;

fn add(a: &ArrayD<f64>, b: &ArrayD<f64>) -> ArrayD<f64> {
    a + b
}

fn subtract(a: &ArrayD<f64>, b: &ArrayD<f64>) -> ArrayD<f64> {
    a - b
}

fn multiply(a: &ArrayD<f64>, b: &ArrayD<f64>) -> ArrayD<f64> {
    a * b
}

fn divide(a: &ArrayD<f64>, b: &ArrayD<f64>) -> ArrayD<f64> {
    a / b
}

fn binary_schema(name: &str, description: &str) -> ToolSchema {
    ToolSchema::new(name, description)
        .param("a", "string", "Name of the left operand tensor", true)
        .param("b", "string", "Name of the right operand tensor", true)
        .param("result_name", "string", "Store the result under this name", false)
}

fn unary_schema(name: &str, description: &str) -> ToolSchema {
    ToolSchema::new(name, description)
        .param("name", "string", "Name of the input tensor", true)
        .param("result_name", "string", "Store the result under this name", false)
}

/// Register the linear algebra tools.
pub fn register_tools(registry: &mut ToolRegistry, store: &TensorStore) -> Result<(), RegistryError> {
    let elementwise: [(&'static str, &str, ElementwiseOp); 4] = [
        ("add_tensors", "Elementwise sum of two tensors of equal shape.", add),
        ("subtract_tensors", "Elementwise difference a - b of two tensors of equal shape.", subtract),
        ("multiply_tensors", "Elementwise (Hadamard) product of two tensors of equal shape.", multiply),
        ("divide_tensors", "Elementwise quotient a / b of two tensors of equal shape.", divide),
    ];
    for (tool, description, op) in elementwise {
        let s = store.clone();
        registry.register(binary_schema(tool, description), move |args: BinaryArgs| {
            let (a, b) = load_pair(&s, &args.a, &args.b)?;
            if a.shape() != b.shape() {
                return Err(ToolError::shape_mismatch(format!(
                    "{tool} needs equal shapes, got {} and {}",
                    a.shape(),
                    b.shape()
                )));
            }
            emit_tensor(&s, args.result_name.as_deref(), op(a.array(), b.array()))
        })?;
    }

    let s = store.clone();
    registry.register(
        ToolSchema::new("scale_tensor", "Multiply every element of a tensor by a factor.")
            .param("name", "string", "Name of the input tensor", true)
            .param("factor", "number", "Scale factor", true)
            .param("result_name", "string", "Store the result under this name", false),
        move |args: ScaleArgs| {
            let t = s.get(&args.name)?;
            emit_tensor(&s, args.result_name.as_deref(), t.array() * args.factor)
        },
    )?;

    let s = store.clone();
    registry.register(
        binary_schema(
            "matrix_multiply",
            "Matrix product of two 2-D tensors; a's column count must equal b's row count.",
        ),
        move |args: BinaryArgs| {
            let (a, b) = load_pair(&s, &args.a, &args.b)?;
            let (ma, mb) = (as_matrix("matrix_multiply", &a)?, as_matrix("matrix_multiply", &b)?);
            if ma.ncols() != mb.nrows() {
                return Err(ToolError::shape_mismatch(format!(
                    "matrix_multiply cannot multiply {} by {}",
                    a.shape(),
                    b.shape()
                )));
            }
            emit_tensor(&s, args.result_name.as_deref(), ma.dot(&mb).into_dyn())
        },
    )?;

    let s = store.clone();
    registry.register(
        unary_schema("transpose", "Reverse the axes of a tensor (a 1-D tensor is unchanged)."),
        move |args: UnaryArgs| {
            let t = s.get(&args.name)?;
            emit_tensor(&s, args.result_name.as_deref(), t.into_array().reversed_axes())
        },
    )?;

    let s = store.clone();
    registry.register(
        unary_schema("determinant", "Determinant of a square 2-D tensor."),
        move |args: UnaryArgs| {
            let t = s.get(&args.name)?;
            let m = as_square("determinant", &t)?;
            emit_scalar(&s, args.result_name.as_deref(), determinant_of(m))
        },
    )?;

    let s = store.clone();
    registry.register(
        unary_schema("matrix_inverse", "Inverse of a non-singular square 2-D tensor."),
        move |args: UnaryArgs| {
            let t = s.get(&args.name)?;
            let m = as_square("matrix_inverse", &t)?;
            let inverse = invert(m).ok_or_else(|| {
                ToolError::Computation(format!("tensor '{}' is singular", args.name))
            })?;
            emit_tensor(&s, args.result_name.as_deref(), inverse.into_dyn())
        },
    )?;

    let s = store.clone();
    registry.register(
        binary_schema("dot_product", "Inner product of two 1-D tensors of equal length."),
        move |args: BinaryArgs| {
            let (a, b) = load_pair(&s, &args.a, &args.b)?;
            let (va, vb) = (as_vector("dot_product", &a)?, as_vector("dot_product", &b)?);
            if va.len() != vb.len() {
                return Err(ToolError::shape_mismatch(format!(
                    "dot_product needs equal lengths, got {} and {}",
                    va.len(),
                    vb.len()
                )));
            }
            emit_scalar(&s, args.result_name.as_deref(), va.dot(&vb))
        },
    )?;

    let s = store.clone();
    registry.register(
        binary_schema("cross_product", "Cross product of two 1-D tensors of length 3."),
        move |args: BinaryArgs| {
            let (a, b) = load_pair(&s, &args.a, &args.b)?;
            let (u, v) = (as_vector("cross_product", &a)?, as_vector("cross_product", &b)?);
            if u.len() != 3 || v.len() != 3 {
                return Err(ToolError::shape_mismatch(format!(
                    "cross_product needs two length-3 vectors, got {} and {}",
                    a.shape(),
                    b.shape()
                )));
            }
            let cross = ndarray::arr1(&[
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ]);
            emit_tensor(&s, args.result_name.as_deref(), cross.into_dyn())
        },
    )?;

    let s = store.clone();
    registry.register(
        unary_schema("norm", "Euclidean (Frobenius) norm over all elements of a tensor."),
        move |args: UnaryArgs| {
            let t = s.get(&args.name)?;
            let norm = t.array().iter().map(|v| v * v).sum::<f64>().sqrt();
            emit_scalar(&s, args.result_name.as_deref(), norm)
        },
    )?;

    Ok(())
}

fn load_pair(store: &TensorStore, a: &str, b: &str) -> Result<(Tensor, Tensor), ToolError> {
    let [x, y]: [Tensor; 2] = store
        .get_many(&[a, b])?
        .try_into()
        .map_err(|_| ToolError::Computation("store returned an unexpected tensor count".into()))?;
    Ok((x, y))
}

fn as_matrix<'a>(tool: &str, t: &'a Tensor) -> Result<ArrayView2<'a, f64>, ToolError> {
    t.array()
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| ToolError::shape_mismatch(format!("{tool} needs a 2-D tensor, got {}", t.shape())))
}

fn as_square<'a>(tool: &str, t: &'a Tensor) -> Result<ArrayView2<'a, f64>, ToolError> {
    let m = as_matrix(tool, t)?;
    if m.nrows() != m.ncols() {
        return Err(ToolError::shape_mismatch(format!(
            "{tool} needs a square matrix, got {}",
            t.shape()
        )));
    }
    Ok(m)
}

fn as_vector<'a>(tool: &str, t: &'a Tensor) -> Result<ArrayView1<'a, f64>, ToolError> {
    t.array()
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| ToolError::shape_mismatch(format!("{tool} needs a 1-D tensor, got {}", t.shape())))
}

/// Copy a square view into a column-major `nalgebra` matrix.
fn to_dmatrix(m: ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_row_iterator(m.nrows(), m.ncols(), m.iter().copied())
}

fn determinant_of(m: ArrayView2<'_, f64>) -> f64 {
    to_dmatrix(m).determinant()
}

/// `None` when the LU factorisation finds a zero pivot or the inverse
/// overflows.
fn invert(m: ArrayView2<'_, f64>) -> Option<Array2<f64>> {
    let inverse = to_dmatrix(m).try_inverse()?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Array2::from_shape_fn(inverse.shape(), |(i, j)| inverse[(i, j)]))
}
