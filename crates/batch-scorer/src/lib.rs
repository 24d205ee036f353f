//! Claim Batch Scorer
//!
//! Scores the next claim file dropped into the incoming directory and
//! writes a timestamped copy with denial probabilities appended.

use app_config::AppConfig;
use chrono::{DateTime, Local};
use claim_data::{read_csv, write_csv, ClaimBatch, DataError};
use inference_engine::{InferenceEngine, InferenceError};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Appended probability column
pub const PROBABILITY_COLUMN: &str = "denial_probability";

/// Appended 0/1 decision column
pub const PREDICTION_COLUMN: &str = "denial_prediction";

/// Errors during batch scoring
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("No new claim files found in {0}")]
    NoInputFiles(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Frame error: {0}")]
    Frame(#[from] PolarsError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub claims: usize,
    pub predicted_denials: usize,
}

/// CSV files in `dir`, sorted by file name
pub fn find_incoming(dir: &Path) -> Result<Vec<PathBuf>, ScoringError> {
    let entries = fs::read_dir(dir).map_err(|source| ScoringError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ScoringError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Score every row of a frame, returning it with the probability and
/// prediction columns appended. Existing columns of those names are replaced.
pub fn score_frame(engine: &InferenceEngine, df: &DataFrame) -> Result<DataFrame, ScoringError> {
    let mut scored = df.clone();
    for column in [PROBABILITY_COLUMN, PREDICTION_COLUMN] {
        if scored.get_column_index(column).is_some() {
            warn!("Input already has {}; overwriting", column);
            scored = scored.drop(column)?;
        }
    }

    let batch = ClaimBatch::from_frame(&scored)?;
    let predictions = engine.score(&batch)?;

    let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
    let decisions: Vec<i32> = predictions.iter().map(|p| i32::from(p.is_denied)).collect();
    scored.with_column(Series::new(PROBABILITY_COLUMN.into(), probabilities))?;
    scored.with_column(Series::new(PREDICTION_COLUMN.into(), decisions))?;
    Ok(scored)
}

/// Output file name for a run started at `timestamp`
pub fn output_file_name(timestamp: &DateTime<Local>) -> String {
    format!("scored_claims_{}.csv", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Score one file into `output_dir`
pub fn score_file(
    engine: &InferenceEngine,
    input: &Path,
    output_dir: &Path,
    timestamp: &DateTime<Local>,
) -> Result<BatchSummary, ScoringError> {
    info!("Processing file: {}", input.display());
    let df = read_csv(input)?;
    let mut scored = score_frame(engine, &df)?;

    let output = output_dir.join(output_file_name(timestamp));
    write_csv(&mut scored, &output)?;

    let predicted_denials = scored
        .column(PREDICTION_COLUMN)?
        .i32()?
        .into_iter()
        .filter(|&v| v == Some(1))
        .count();
    debug!("{} of {} claims predicted denied", predicted_denials, scored.height());

    Ok(BatchSummary {
        input: input.to_path_buf(),
        output,
        claims: scored.height(),
        predicted_denials,
    })
}

/// Load the persisted pipeline and score the first incoming file
pub fn run_batch(config: &AppConfig) -> Result<BatchSummary, ScoringError> {
    let incoming = find_incoming(&config.paths.new_data_dir)?;
    let input = incoming
        .first()
        .ok_or_else(|| ScoringError::NoInputFiles(config.paths.new_data_dir.clone()))?;
    if incoming.len() > 1 {
        info!(
            "{} files waiting; scoring {} only",
            incoming.len(),
            input.display()
        );
    }

    let engine = InferenceEngine::load(&config.paths.model_path(), config.model.decision_threshold)?;
    let summary = score_file(&engine, input, &config.paths.output_dir, &Local::now())?;
    info!(
        "Batch scoring completed: {} claims, {} predicted denials, output {}",
        summary.claims,
        summary.predicted_denials,
        summary.output.display()
    );
    Ok(summary)
}
