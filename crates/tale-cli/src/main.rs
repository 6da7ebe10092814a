//! Tale CLI - runs the story relay.
//!
//! `tale serve` runs the webhook gateway, `tale start-story` publishes a
//! new story once (for cron jobs) and `tale check-config` prints the
//! effective configuration.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;

/// Tale - choose-your-own-adventure stories in page comments
#[derive(Parser)]
#[command(name = "tale")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "TALE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Override the listen address
        #[arg(long)]
        bind: Option<String>,

        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Publish a new story once
    StartStory {
        /// Comment on this post instead of creating a new one
        #[arg(long)]
        on: Option<String>,
    },

    /// Validate and print the effective configuration
    CheckConfig {
        /// Show where each setting came from
        #[arg(long)]
        sources: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = tale_config::Config::load(cli.config.as_deref());

    let mut log_config = match &resolved {
        Ok(r) => config_bridge::to_log_config(&r.config),
        Err(_) => tale_telemetry::LogConfig::default(),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = tale_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = resolved?;
    if let Some(path) = &resolved.loaded_file {
        tracing::debug!(path = %path.display(), "Loaded configuration file");
    }

    match cli.command {
        Commands::Serve { bind, port } => {
            commands::serve::run(&resolved.config, bind.as_deref(), port).await
        },
        Commands::StartStory { on } => {
            commands::start_story::run(&resolved.config, on).await
        },
        Commands::CheckConfig { sources } => commands::check_config::run(&resolved, sources),
    }
}
