// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ventra - WhatsApp-compatible webhook ingestion and sale pipeline.
//!
//! This is the binary entry point for the Ventra server.

mod pipeline;
mod server;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ventra_config::model::VentraConfig;

/// Ventra - WhatsApp-compatible webhook ingestion and sale pipeline.
#[derive(Parser, Debug)]
#[command(name = "ventra", version, about, long_about = None)]
struct Cli {
    /// Path to an explicit config file (skips the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
    /// Print the resolved configuration and exit.
    Config,
}

fn load_config(cli: &Cli) -> Result<VentraConfig, figment::Error> {
    match &cli.config {
        Some(path) => ventra_config::load_config_from_path(path),
        None => ventra_config::load_config(),
    }
}

fn init_tracing(config: &VentraConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ventra={}", config.bot.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ventra: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                println!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ventra: cannot render config: {e}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::Serve) | None => {
            init_tracing(&config);
            let pipeline = match pipeline::Pipeline::build(&config).await {
                Ok(pipeline) => pipeline,
                Err(e) => {
                    eprintln!("ventra: startup failed: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = server::start_server(&config.server, pipeline).await {
                eprintln!("ventra: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
    }
}
