//! SWSOC Pipeline Synth - resolves the pipeline configuration into resource declarations

use anyhow::{Context, Result};
use clap::Parser;
use config::EnvironmentSignals;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_result = dotenv::dotenv();

    // Initialize logging
    init_logging()?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        Err(e) if !e.not_found() => warn!("Could not load .env file: {}", e),
        Err(_) => {}
    }

    let cli = Cli::parse();
    info!("Starting pipeline-synth v{}", env!("CARGO_PKG_VERSION"));

    // Environment signals are read once, here, and passed down explicitly
    let signals = EnvironmentSignals::from_env();
    info!(
        "Deployment environment: {}",
        signals.deployment_environment()
    );

    let output = match cli.command.clone().unwrap_or(Commands::Plan) {
        Commands::Validate => commands::validate(&cli.config, &signals, cli.output)?,
        Commands::Plan => commands::plan(&cli.config, &signals, cli.output)?,
        Commands::Init { path, force } => commands::init(&path, force)?,
    };

    println!("{}", output);
    Ok(())
}

/// Initialize logging based on environment variables
fn init_logging() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so stdout carries only the rendered output
    match log_format.as_str() {
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
    }

    info!("Logging initialized");
    info!("Log level: {}", log_level);
    info!("Log format: {}", log_format);

    Ok(())
}
