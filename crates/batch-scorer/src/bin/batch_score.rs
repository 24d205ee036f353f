//! Score the next incoming claim file

use anyhow::Context;
use app_config::{init_logging, AppConfig, DEFAULT_CONFIG_PATH};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Append denial probabilities to the next incoming claim file")]
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

    info!("=== Claim Denial Batch Scorer v{} ===", env!("CARGO_PKG_VERSION"));
    let summary = batch_scorer::run_batch(&config)?;
    info!("Output saved to: {}", summary.output.display());
    Ok(())
}
