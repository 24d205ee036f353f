//! Claim Denial Risk API - Main Entry Point

use anyhow::Context;
use api::run_server;
use app_config::{init_logging, AppConfig, DEFAULT_CONFIG_PATH};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Serve real-time claim denial predictions")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    init_logging(&config.logging)?;

    info!("=== Claim Denial Risk API v{} ===", env!("CARGO_PKG_VERSION"));
    run_server(&config).await?;
    Ok(())
}
