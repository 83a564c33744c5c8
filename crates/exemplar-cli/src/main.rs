//! exemplar - runs reflective identity expectations declared in fixture files

use std::io;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use cli::{Cli, Command};
use exemplar_core::HarnessConfig;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod handlers;

/// Install the stderr subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ignored = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = HarnessConfig::load(&cli.config);
    init_tracing(
        config
            .as_ref()
            .map_or("info", |loaded| loaded.log_filter.as_str()),
    );
    let config = config
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Command::Run(args) => handlers::handle_run(args, config).await,
        Command::List(args) => handlers::handle_list(args, &config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match dispatch(Cli::parse()).await {
        Ok(code) => code,
        Err(error) => {
            #[allow(clippy::print_stderr, reason = "Fatal error output")]
            {
                eprintln!("error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}
