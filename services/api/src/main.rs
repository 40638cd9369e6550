use std::sync::Arc;

use anyhow::{Context, Result};
use api::{AppState, ViewScope};
use clap::Parser;
use common::{ClientConfig, FileStorage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }
    info!("Using backend at {}", config.base_url);

    let storage = Arc::new(FileStorage::new(&config.session_file));
    let state = AppState::new(&config, storage).context("Failed to build HTTP client")?;

    let mut scope = ViewScope::new("command");
    let outcome = scope.spawn(cli::execute(state, cli.command));

    tokio::select! {
        outcome = outcome => match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                if let Some(route) = err.redirect() {
                    eprintln!("Continue at {}", route);
                }
                Err(err.into())
            }
            Err(_) => anyhow::bail!("Command was aborted"),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning the running command");
            scope.close();
            Ok(())
        }
    }
}
