//! Train, evaluate and persist the claim denial pipeline

use anyhow::Context;
use app_config::{init_logging, AppConfig, DEFAULT_CONFIG_PATH};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(version, about = "Fit the claim denial model on the labeled dataset")]
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

    info!("=== Claim Denial Trainer v{} ===", env!("CARGO_PKG_VERSION"));
    let report = trainer::train(&config)?;
    if !report.converged {
        warn!("Model stopped at max_iter={} before converging", report.iterations);
    }
    info!(
        "Model saved at {} (accuracy {:.4}, f1 {:.4})",
        report.model_path.display(),
        report.evaluation.accuracy,
        report.evaluation.f1
    );
    Ok(())
}
