//! Command-line arguments and configuration resolution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use opswatch_client::ClientConfig;

use crate::error::Result;

/// opswatch - watch an ops dashboard backend from the terminal
#[derive(Parser, Debug)]
#[command(name = "opswatch")]
#[command(about = "Poll an ops dashboard backend for system health", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "OPSWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the dashboard (the `ops/api` endpoints live below it)
    #[arg(long, env = "OPSWATCH_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Username for Basic login
    #[arg(short, long, env = "OPSWATCH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for Basic login
    #[arg(short, long, env = "OPSWATCH_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds between polls
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll once and print the snapshot
    Status {
        /// Log in first to get the detailed status
        #[arg(short, long)]
        login: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Poll on a schedule and print every snapshot
    Watch {
        /// Log in first to get the detailed status
        #[arg(short, long)]
        login: bool,

        /// Stop after this many snapshots
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Print the identity the backend reports
    Whoami,

    /// Resolve a dashboard path through the access guard
    Open {
        /// Dashboard path, e.g. `/dashboard/traefik`
        path: String,

        /// Log in before resolving
        #[arg(short, long)]
        login: bool,
    },
}

impl Cli {
    /// Build the client configuration: file (if any), then flags and
    /// environment on top, then validation.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }

        config.validate()?;
        Ok(config)
    }
}
