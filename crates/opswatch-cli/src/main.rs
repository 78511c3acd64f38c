//! opswatch CLI
//!
//! Polls an ops dashboard backend and prints what it reports.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use opswatch_cli::{App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; library `log` records reach the subscriber
    // through its log bridge.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,opswatch=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    tracing::debug!(base_url = %config.base_url, "Starting opswatch");

    let app = App::new(&config)?;
    let mut stdout = std::io::stdout();
    app.run(&cli.command, &mut stdout).await?;
    Ok(())
}
