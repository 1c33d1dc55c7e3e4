//! # Vector Calculus Tools
//!
//! Finite-difference operators over fields sampled on a regular grid with
//! uniform spacing. Interior points use second-order central differences;
//! the first and last sample on each axis use first-order one-sided
//! differences.
//!
//! Vector fields are stored with their components on the leading axis: a
//! 3-D field over an `nx × ny × nz` grid has shape `[3, nx, ny, nz]`.

use ndarray::{ArrayD, ArrayViewD, Axis};
use scicomp_core::{Tensor, TensorStore};
use serde::Deserialize;

use crate::emit::emit_tensor;
use crate::error::{RegistryError, ToolError};
use crate::registry::{ToolRegistry, ToolSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldArgs {
    name: String,
    #[serde(default)]
    spacing: Option<f64>,
    #[serde(default)]
    result_name: Option<String>,
}

impl FieldArgs {
    fn spacing(&self, tool: &str) -> Result<f64, ToolError> {
        let h = self.spacing.unwrap_or(1.0);
        if !h.is_finite() || h <= 0.0 {
            return Err(ToolError::invalid_arguments(
                tool,
                format!("spacing must be a positive finite number, got {h}"),
            ));
        }
        Ok(h)
    }
}

fn field_schema(name: &str, description: &str) -> ToolSchema {
    ToolSchema::new(name, description)
        .param("name", "string", "Name of the field tensor", true)
        .param("spacing", "number", "Grid spacing along every axis (default 1.0)", false)
        .param("result_name", "string", "Store the result under this name", false)
}

/// Register the vector calculus tools.
pub fn register_tools(registry: &mut ToolRegistry, store: &TensorStore) -> Result<(), RegistryError> {
    let s = store.clone();
    registry.register(
        field_schema(
            "gradient",
            "Gradient of a scalar field. A 1-D field yields its derivative; a k-D field \
             yields the k partial derivatives stacked on a new leading axis.",
        ),
        move |args: FieldArgs| {
            let h = args.spacing("gradient")?;
            let field = s.get(&args.name)?;
            require_samples("gradient", &field, 0)?;
            emit_tensor(&s, args.result_name.as_deref(), gradient(field.array().view(), h)?)
        },
    )?;

    let s = store.clone();
    registry.register(
        field_schema(
            "divergence",
            "Divergence of a vector field of shape [k, d1, ..., dk].",
        ),
        move |args: FieldArgs| {
            let h = args.spacing("divergence")?;
            let field = s.get(&args.name)?;
            let dims = field.dims();
            let k = dims.len() - 1;
            if k == 0 || dims[0] != k {
                return Err(ToolError::shape_mismatch(format!(
                    "divergence needs a field of shape [k, d1..dk], got {}",
                    field.shape()
                )));
            }
            require_samples("divergence", &field, 1)?;
            let mut total = ArrayD::<f64>::zeros(&dims[1..]);
            for (axis, component) in field.array().axis_iter(Axis(0)).enumerate() {
                total += &partial(component, axis, h);
            }
            emit_tensor(&s, args.result_name.as_deref(), total)
        },
    )?;

    let s = store.clone();
    registry.register(
        field_schema(
            "curl",
            "Curl of a 3-D vector field of shape [3, nx, ny, nz], or the scalar \
             vorticity of a 2-D field of shape [2, nx, ny].",
        ),
        move |args: FieldArgs| {
            let h = args.spacing("curl")?;
            let field = s.get(&args.name)?;
            let dims = field.dims();
            let result = match (dims.len(), dims[0]) {
                (4, 3) => {
                    require_samples("curl", &field, 1)?;
                    curl_3d(field.array().view(), h)?
                }
                (3, 2) => {
                    require_samples("curl", &field, 1)?;
                    let a = field.array();
                    let (fx, fy) = (a.index_axis(Axis(0), 0), a.index_axis(Axis(0), 1));
                    partial(fy, 0, h) - partial(fx, 1, h)
                }
                _ => {
                    return Err(ToolError::shape_mismatch(format!(
                        "curl needs shape [3, nx, ny, nz] or [2, nx, ny], got {}",
                        field.shape()
                    )))
                }
            };
            emit_tensor(&s, args.result_name.as_deref(), result)
        },
    )?;

    let s = store.clone();
    registry.register(
        field_schema("laplacian", "Laplacian (sum of second partial derivatives) of a scalar field."),
        move |args: FieldArgs| {
            let h = args.spacing("laplacian")?;
            let field = s.get(&args.name)?;
            require_samples("laplacian", &field, 0)?;
            let a = field.array();
            let mut total = ArrayD::<f64>::zeros(a.raw_dim());
            for axis in 0..a.ndim() {
                let first = partial(a.view(), axis, h);
                total += &partial(first.view(), axis, h);
            }
            emit_tensor(&s, args.result_name.as_deref(), total)
        },
    )?;

    Ok(())
}

/// Every axis from `first_axis` on must carry at least two samples.
fn require_samples(tool: &str, field: &Tensor, first_axis: usize) -> Result<(), ToolError> {
    if field.dims()[first_axis..].iter().any(|&d| d < 2) {
        return Err(ToolError::shape_mismatch(format!(
            "{tool} needs at least 2 samples along every grid axis, got {}",
            field.shape()
        )));
    }
    Ok(())
}

/// Partial derivative of `f` along `axis` with spacing `h`.
fn partial(f: ArrayViewD<'_, f64>, axis: usize, h: f64) -> ArrayD<f64> {
    let n = f.len_of(Axis(axis));
    let mut out = ArrayD::<f64>::zeros(f.raw_dim());
    for i in 0..n {
        let (lo, hi, width) = if i == 0 {
            (0, 1, h)
        } else if i == n - 1 {
            (n - 2, n - 1, h)
        } else {
            (i - 1, i + 1, 2.0 * h)
        };
        let diff = (&f.index_axis(Axis(axis), hi) - &f.index_axis(Axis(axis), lo)) / width;
        out.index_axis_mut(Axis(axis), i).assign(&diff);
    }
    out
}

fn gradient(f: ArrayViewD<'_, f64>, h: f64) -> Result<ArrayD<f64>, ToolError> {
    if f.ndim() == 1 {
        return Ok(partial(f, 0, h));
    }
    let partials: Vec<ArrayD<f64>> = (0..f.ndim()).map(|axis| partial(f.view(), axis, h)).collect();
    stack(&partials)
}

fn curl_3d(field: ArrayViewD<'_, f64>, h: f64) -> Result<ArrayD<f64>, ToolError> {
    let fx = field.index_axis(Axis(0), 0);
    let fy = field.index_axis(Axis(0), 1);
    let fz = field.index_axis(Axis(0), 2);
    let cx = partial(fz.view(), 1, h) - partial(fy.view(), 2, h);
    let cy = partial(fx.view(), 2, h) - partial(fz.view(), 0, h);
    let cz = partial(fy.view(), 0, h) - partial(fx.view(), 1, h);
    stack(&[cx, cy, cz])
}

fn stack(parts: &[ArrayD<f64>]) -> Result<ArrayD<f64>, ToolError> {
    let views: Vec<ArrayViewD<'_, f64>> = parts.iter().map(|p| p.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| ToolError::Computation(e.to_string()))
}
