//! # Visualization Tools
//!
//! `plot_tensor` renders a stored tensor as a standalone SVG document and
//! writes it into the plot directory. One-dimensional tensors become a line
//! chart; two-dimensional tensors become a heatmap (rows top to bottom,
//! columns left to right). The caller receives a `file://` artifact
//! reference rather than the image bytes.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{ArrayView2, Ix2};
use scicomp_core::{TensorStore, ToolOutput};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{RegistryError, ToolError};
use crate::registry::{ToolRegistry, ToolSchema};

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 40.0;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlotArgs {
    name: String,
    #[serde(default)]
    title: Option<String>,
}

/// Register `plot_tensor`, writing output files under `plot_dir`.
pub fn register_tools(
    registry: &mut ToolRegistry,
    store: &TensorStore,
    plot_dir: &Path,
) -> Result<(), RegistryError> {
    let s = store.clone();
    let dir = plot_dir.to_path_buf();
    registry.register(
        ToolSchema::new(
            "plot_tensor",
            "Render a 1-D tensor as a line chart or a 2-D tensor as a heatmap. \
             Returns a file:// reference to the SVG document.",
        )
        .param("name", "string", "Name of the tensor to plot", true)
        .param("title", "string", "Chart title (defaults to the tensor name)", false),
        move |args: PlotArgs| {
            let tensor = s.get(&args.name)?;
            let title = args.title.as_deref().unwrap_or(&args.name);
            let svg = match tensor.ndim() {
                1 => render_line(&tensor.values(), title),
                2 => {
                    let grid = tensor
                        .array()
                        .view()
                        .into_dimensionality::<Ix2>()
                        .map_err(|e| ToolError::Computation(e.to_string()))?;
                    render_heatmap(grid, title)
                }
                _ => {
                    return Err(ToolError::shape_mismatch(format!(
                        "plot_tensor renders 1-D or 2-D tensors, got shape {}",
                        tensor.shape()
                    )))
                }
            };
            let path = write_plot(&dir, &args.name, &svg)?;
            tracing::debug!(tensor = %args.name, path = %path.display(), "plot written");
            Ok(ToolOutput::Artifact {
                uri: format!("file://{}", path.display()),
                media_type: SVG_MEDIA_TYPE.to_string(),
            })
        },
    )?;
    Ok(())
}

fn write_plot(dir: &Path, name: &str, svg: &str) -> Result<PathBuf, ToolError> {
    let io = |e: std::io::Error| ToolError::Computation(format!("failed to write plot: {e}"));
    fs::create_dir_all(dir).map_err(io)?;
    let path = dir.join(format!("{}-{}.svg", file_stem(name), Uuid::new_v4()));
    fs::write(&path, svg).map_err(io)?;
    fs::canonicalize(&path).map_err(io)
}

/// Tensor names are free-form; keep only characters safe in a file name.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Min and max over the finite values, or `(0, 0)` when there are none.
fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}

fn svg_open(title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n"
    ));
    out.push_str(&format!("  <title>{}</title>\n", escape_xml(title)));
    out.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" \
         font-size=\"16\">{}</text>\n",
        WIDTH / 2.0,
        MARGIN / 2.0 + 6.0,
        escape_xml(title)
    ));
    out
}

fn render_line(values: &[f64], title: &str) -> String {
    let (lo, hi) = finite_range(values);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let step = if values.len() > 1 {
        plot_w / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| {
            let x = MARGIN + step * i as f64;
            let y = HEIGHT - MARGIN - (v - lo) / span * plot_h;
            format!("{x:.2},{y:.2}")
        })
        .collect();

    let mut out = svg_open(title);
    out.push_str(&format!(
        "  <path d=\"M{m} {b} H{r} M{m} {b} V{m}\" stroke=\"black\" fill=\"none\"/>\n",
        m = MARGIN,
        b = HEIGHT - MARGIN,
        r = WIDTH - MARGIN,
    ));
    out.push_str(&format!(
        "  <polyline points=\"{}\" stroke=\"steelblue\" stroke-width=\"2\" fill=\"none\"/>\n",
        points.join(" ")
    ));
    out.push_str(&format!(
        "  <text x=\"4\" y=\"{:.2}\" font-size=\"10\">{hi}</text>\n",
        MARGIN + 4.0
    ));
    out.push_str(&format!(
        "  <text x=\"4\" y=\"{:.2}\" font-size=\"10\">{lo}</text>\n",
        HEIGHT - MARGIN
    ));
    out.push_str("</svg>\n");
    out
}

fn render_heatmap(grid: ArrayView2<'_, f64>, title: &str) -> String {
    let (rows, cols) = grid.dim();
    let (lo, hi) = finite_range(grid.iter());
    let span = if hi > lo { hi - lo } else { 1.0 };
    let cell_w = (WIDTH - 2.0 * MARGIN) / cols as f64;
    let cell_h = (HEIGHT - 2.0 * MARGIN) / rows as f64;

    let mut out = svg_open(title);
    for ((r, c), v) in grid.indexed_iter() {
        let fill = if v.is_finite() {
            let t = (v - lo) / span;
            // Blue (low) to red (high).
            let red = (255.0 * t).round() as u8;
            let blue = (255.0 * (1.0 - t)).round() as u8;
            format!("rgb({red},0,{blue})")
        } else {
            "gray".to_string()
        };
        out.push_str(&format!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\">\
             <title>[{r}, {c}] = {v}</title></rect>\n",
            MARGIN + c as f64 * cell_w,
            MARGIN + r as f64 * cell_h,
            cell_w,
            cell_h,
        ));
    }
    out.push_str("</svg>\n");
    out
}
