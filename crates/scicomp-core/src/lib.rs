//! # scicomp-core: Foundational Types for the Computation Service
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! data model every other crate builds on:
//!
//! - **`Shape`** (`shape.rs`): a validated, non-empty list of positive
//!   dimensions. Raw `i64` dimensions from callers are checked once here.
//!
//! - **`Tensor`** (`tensor.rs`): a dense `f64` array backed by
//!   `ndarray::ArrayD`, always exposed in row-major logical order.
//!
//! - **`TensorStore`** (`store.rs`): the named, in-memory tensor registry
//!   shared by every tool. Cloning the store clones the handle, not the data.
//!
//! - **`ToolOutput`** (`output.rs`): the single tagged result type returned
//!   by every tool, regardless of what the numeric kernel produced.
//!
//! - **Errors** (`error.rs`): `TensorError` for store-level failures and
//!   `ErrorKind`, the stable code set the RPC façade exposes to callers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `scicomp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Validation happens before mutation: a rejected request never leaves
//!   partial state in the store.

pub mod error;
pub mod output;
pub mod shape;
pub mod store;
pub mod tensor;

pub use error::{ErrorKind, TensorError};
pub use output::ToolOutput;
pub use shape::Shape;
pub use store::TensorStore;
pub use tensor::Tensor;
