//! Claim Denial Trainer
//!
//! Builds the labeled dataset from the raw healthcare tables and fits,
//! evaluates and persists the scoring pipeline.

mod dataset;
mod training;

#[cfg(test)]
mod fixtures;

pub use dataset::{build_dataset, DatasetSummary};
pub use training::{train, TrainingReport, METRICS_FILE_NAME};

use claim_data::DataError;
use inference_engine::InferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while building the dataset or training
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Pipeline(#[from] InferenceError),
    #[error("Labeled dataset {0} has no rows")]
    EmptyDataset(PathBuf),
    #[error("Failed to write {path}: {message}")]
    Report { path: PathBuf, message: String },
}
