//! # Tools Subcommand
//!
//! Prints the tool catalogue a server would register, one name per line or
//! as a JSON array of schemas.

use anyhow::{Context, Result};
use clap::Args;

use scicomp_core::TensorStore;
use scicomp_tools::{build_registry, ToolRegistry, ToolsConfig};

/// Arguments for the `scicomp tools` subcommand.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Print full schemas as JSON instead of names.
    #[arg(long)]
    pub json: bool,
}

/// Execute the tools subcommand.
pub fn run_tools(args: &ToolsArgs) -> Result<u8> {
    let store = TensorStore::new();
    let registry =
        build_registry(&store, &ToolsConfig::default()).context("failed to assemble tool registry")?;
    println!("{}", render(&registry, args.json)?);
    Ok(0)
}

fn render(registry: &ToolRegistry, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(&registry.schemas()).context("failed to encode schemas")
    } else {
        Ok(registry.names().join("\n"))
    }
}
