//! govwatch - governance service health and alerting daemon

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use govwatch::config::Config;
use govwatch::monitoring::MonitoringSystem;
use govwatch::utils::logging::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "govwatch", version, about = "Health polling and alerting for governance services")]
struct Cli {
    /// YAML configuration file; the environment is used when omitted
    #[arg(short, long, env = "GOVWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single check round, print the status as JSON and exit
    #[arg(long)]
    once: bool,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json_logs;
    init_logging(&config.logging)?;

    let system = MonitoringSystem::new(&config)?;

    if cli.once {
        system.run_health_checks().await;
        println!("{}", serde_json::to_string_pretty(&system.status())?);
        system.stop().await?;
        return Ok(());
    }

    if !config.monitoring.enabled {
        info!("Periodic monitoring disabled, nothing to do");
        return Ok(());
    }

    system.start().await?;
    info!(version = govwatch::VERSION, "govwatch running, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    system.stop().await?;
    Ok(())
}
