//! Dandelion - web asset pipeline
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use dandelion::cli::{Cli, Commands};
use dandelion::config::ConfigManager;
use dandelion::error::DandelionResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DandelionResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load(cli.profile).await?;

    // 0 = warn, 1 = info, 2+ = debug; general.verbose counts as -v
    let level = cli.verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("dandelion=warn"),
        1 => EnvFilter::new("dandelion=info"),
        _ => EnvFilter::new("dandelion=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
    debug!("Using configuration {}", config_manager.path().display());

    match cli.command {
        Commands::Resolve(args) => dandelion::cli::commands::resolve(args, &config).await,
        Commands::Config(args) => {
            dandelion::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
