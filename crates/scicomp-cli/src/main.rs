//! # scicomp CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scicomp_cli::serve::{run_serve, ServeArgs};
use scicomp_cli::tools::{run_tools, ToolsArgs};

/// Named tensor store with linear algebra, vector calculus, and plotting
/// tools, served over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "scicomp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve JSON-RPC on stdio, or the JSON-RPC and REST API over HTTP.
    Serve(ServeArgs),

    /// Print the registered tools.
    Tools(ToolsArgs),
}

fn filter_for(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn,scicomp_api=info,scicomp_cli=info,scicomp_tools=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = filter_for(cli.verbose);
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let result = match cli.command {
        Commands::Serve(args) => run_serve(&args),
        Commands::Tools(args) => run_tools(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
