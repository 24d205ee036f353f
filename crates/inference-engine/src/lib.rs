//! Claim Denial Inference Engine
//!
//! Composes the feature transform, a column preprocessor and a logistic
//! regression into one pipeline that is fitted once, persisted, and reused
//! unchanged for batch and online scoring.

mod engine;
mod evaluation;
mod model;
mod pipeline;
mod preprocess;
mod split;

pub use engine::{InferenceEngine, InferenceResult, Prediction};
pub use evaluation::{evaluate, ClassificationReport};
pub use model::{FittedLogisticRegression, LogisticRegression, LogisticRegressionConfig};
pub use pipeline::{
    build_pipeline, load_pipeline, save_pipeline, ClaimPipeline, FittedClaimPipeline,
    MODEL_FILE_NAME, MODEL_FORMAT_VERSION,
};
pub use preprocess::{ColumnPreprocessor, FittedPreprocessor, PreprocessorConfig};
pub use split::{stratified_split, Split};

use feature_engine::FeatureError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while fitting, persisting or running the pipeline
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("Preprocessor column {0:?} is not an engineered feature")]
    UnknownColumn(String),
    #[error("Column {column} expects numbers, got {value:?}")]
    NonNumeric { column: String, value: String },
    #[error("Training data is empty")]
    EmptyTrainingData,
    #[error("Got {labels} labels for {rows} rows")]
    LabelMismatch { rows: usize, labels: usize },
    #[error("Training labels contain a single class")]
    SingleClass,
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Unsupported model format version {found}, expected {expected}")]
    FormatVersion { found: u32, expected: u32 },
    #[error("Model serialization failed: {0}")]
    Serialization(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InferenceError {
    /// Whether the request data, rather than the service, is at fault
    pub fn is_client_error(&self) -> bool {
        match self {
            InferenceError::Feature(e) => e.is_schema_error(),
            InferenceError::NonNumeric { .. } => true,
            _ => false,
        }
    }
}
