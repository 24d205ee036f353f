//! Labeled dataset assembly

use crate::TrainingError;
use app_config::AppConfig;
use claim_data::{build_claim_denial_dataset, enrich_claims, split_labels, write_csv, RawTables};
use std::path::PathBuf;
use tracing::info;

/// Outcome of a dataset build
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub denied: usize,
}

/// Label and enrich the raw tables, then write the base dataset
pub fn build_dataset(config: &AppConfig) -> Result<DatasetSummary, TrainingError> {
    let tables = RawTables::load(&config.paths.raw_data)?;
    let labeled = build_claim_denial_dataset(
        &tables,
        &config.data.claim_id_column,
        &config.data.target_column,
    )?;
    let mut enriched = enrich_claims(labeled, &tables)?;

    let path = config.paths.base_dataset_path();
    write_csv(&mut enriched, &path)?;

    let (_, labels) = split_labels(&enriched, &config.data.target_column)?;
    let denied = labels.iter().filter(|&&l| l == 1).count();
    info!(
        "Wrote {} claims ({} denied, {} columns) to {}",
        enriched.height(),
        denied,
        enriched.width(),
        path.display()
    );

    Ok(DatasetSummary {
        path,
        rows: enriched.height(),
        denied,
    })
}
