//! # API Route Modules
//!
//! - [`rpc`]: JSON-RPC 2.0 tool dispatch at `/mcp`.
//! - [`tensors`]: REST introspection under `/v1`.

pub mod rpc;
pub mod tensors;
