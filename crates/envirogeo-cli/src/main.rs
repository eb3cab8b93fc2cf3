//! EnviroGeo CLI - Environmental monitoring service
//!
//! Usage:
//!   envirogeo parameters                 List supported parameters
//!   envirogeo analyze --parameter NDVI   Analyze a point or bounding box
//!   envirogeo history --user U           Show saved analyses
//!   envirogeo serve --port 3000          Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use envirogeo_core::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => commands::cmd_serve(&config, &host, port, no_auth, static_dir.as_deref()).await,
        Commands::Parameters => commands::cmd_parameters(),
        Commands::Analyze(args) => commands::cmd_analyze(&config, &args).await,
        Commands::History { user, delete } => {
            let store = commands::open_store(&config)?;
            match delete {
                Some(id) => commands::cmd_history_delete(&store, &user, &id),
                None => commands::cmd_history_list(&store, &user),
            }
        }
    }
}
