//! Build the labeled claim denial dataset from the raw tables

use anyhow::Context;
use app_config::{init_logging, AppConfig, DEFAULT_CONFIG_PATH};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Join raw claim tables into the labeled training dataset")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    init_logging(&config.logging)?;

    info!("=== Claim Denial Dataset Builder v{} ===", env!("CARGO_PKG_VERSION"));
    let summary = trainer::build_dataset(&config)?;
    info!(
        "Dataset ready: {} rows, {} denied, {}",
        summary.rows,
        summary.denied,
        summary.path.display()
    );
    Ok(())
}
