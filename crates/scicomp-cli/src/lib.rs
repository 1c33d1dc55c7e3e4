//! # scicomp-cli: Command-Line Entry Point
//!
//! ## Subcommands
//!
//! - `scicomp serve`: Build the tensor store and tool registry, then serve
//!   JSON-RPC on stdio (default) or the JSON-RPC and REST API over HTTP.
//! - `scicomp tools`: Print the registered tool catalogue without starting
//!   a server.
//!
//! ```bash
//! scicomp serve --transport http --port 8081 --auth-token "$TOKEN"
//! scicomp tools --json
//! ```

pub mod serve;
pub mod tools;
