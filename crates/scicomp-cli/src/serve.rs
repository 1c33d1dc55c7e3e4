//! # Serve Subcommand
//!
//! Flags fall back to environment variables, then to [`AppConfig`] defaults.
//! The default transport is newline-delimited JSON-RPC on stdio; `--transport
//! http` (or `TRANSPORT=http`) serves the HTTP API instead.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, ValueEnum};
use metrics_exporter_prometheus::PrometheusBuilder;

use scicomp_api::state::{AppConfig, AppState};

/// How `scicomp serve` talks to its caller.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC requests on stdin, replies on stdout.
    Stdio,
    /// The axum HTTP API.
    Http,
}

/// Arguments for the `scicomp serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Transport to serve on.
    #[arg(long, env = "TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = 8081)]
    pub port: u16,

    /// Require `Authorization: Bearer <token>` on every non-health route.
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Directory for SVG plots [default: <tmp>/scicomp-plots].
    #[arg(long, env = "SCICOMP_PLOT_DIR", value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Do not install the Prometheus recorder.
    #[arg(long)]
    pub no_metrics: bool,

    #[arg(
        long,
        env = "SCICOMP_METRICS_ENABLED",
        default_value_t = true,
        action = ArgAction::Set,
        hide = true
    )]
    pub metrics_enabled: bool,
}

impl ServeArgs {
    /// Resolve flags into the service configuration.
    pub fn to_config(&self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            host: self.host.clone(),
            port: self.port,
            auth_token: self.auth_token.clone(),
            plot_dir: self.plot_dir.clone().unwrap_or(defaults.plot_dir),
            metrics_enabled: self.metrics_enabled && !self.no_metrics,
        }
    }
}

/// Execute the serve subcommand. Blocks until the server shuts down.
pub fn run_serve(args: &ServeArgs) -> Result<u8> {
    let config = args.to_config();
    tracing::info!(transport = ?args.transport, ?config, "starting scicomp");

    // `/metrics` only exists on the HTTP transport.
    let prometheus = if config.metrics_enabled && args.transport == Transport::Http {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    let state = AppState::with_prometheus(config, prometheus)
        .context("failed to assemble tool registry")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let served = match args.transport {
        Transport::Http => runtime.block_on(scicomp_api::serve(state)),
        Transport::Stdio => runtime.block_on(scicomp_api::stdio::serve_stdio(state)),
    };
    served.context("server terminated with an error")?;

    tracing::info!("scicomp stopped");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            transport: Transport::Http,
            host: "127.0.0.1".into(),
            port: 9000,
            auth_token: Some("t".into()),
            plot_dir: None,
            no_metrics: false,
            metrics_enabled: true,
        }
    }

    #[test]
    fn config_takes_flag_values() {
        let config = args().to_config();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.auth_token.as_deref(), Some("t"));
        assert_eq!(config.plot_dir, AppConfig::default().plot_dir);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn no_metrics_flag_wins_over_env_default() {
        let config = ServeArgs {
            no_metrics: true,
            ..args()
        }
        .to_config();
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn explicit_plot_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServeArgs {
            plot_dir: Some(dir.path().to_path_buf()),
            ..args()
        }
        .to_config();
        assert_eq!(config.plot_dir, dir.path());
    }
}
