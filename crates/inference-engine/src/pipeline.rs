//! Pipeline assembly and persistence

use crate::model::{FittedLogisticRegression, LogisticRegression, LogisticRegressionConfig};
use crate::preprocess::{ColumnPreprocessor, FittedPreprocessor, PreprocessorConfig};
use crate::InferenceError;
use feature_engine::{Chain, ClaimFeatureEngineer, FeatureConfig, StageExt};
use std::fs;
use std::path::Path;
use tracing::info;

/// File name of the persisted pipeline inside the model directory
pub const MODEL_FILE_NAME: &str = "claim_denial_model.bin";

/// Bumped whenever the persisted layout changes
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Feature transform, preprocessor and classifier, unfitted
pub type ClaimPipeline = Chain<Chain<ClaimFeatureEngineer, ColumnPreprocessor>, LogisticRegression>;

/// The fitted pipeline: raw claims in, denial probabilities out
pub type FittedClaimPipeline =
    Chain<Chain<ClaimFeatureEngineer, FittedPreprocessor>, FittedLogisticRegression>;

/// Assemble an unfitted pipeline, validating every stage's configuration
pub fn build_pipeline(
    features: FeatureConfig,
    preprocessor: PreprocessorConfig,
    model: LogisticRegressionConfig,
) -> Result<ClaimPipeline, InferenceError> {
    let engineer = ClaimFeatureEngineer::new(features)?;
    let preprocessor = ColumnPreprocessor::new(preprocessor, engineer.output_columns())?;
    let model = LogisticRegression::new(model)?;
    Ok(engineer.then(preprocessor).then(model))
}

/// Write a fitted pipeline, creating the parent directory if needed
pub fn save_pipeline(pipeline: &FittedClaimPipeline, path: &Path) -> Result<(), InferenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| InferenceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut bytes = postcard::to_allocvec(&MODEL_FORMAT_VERSION)
        .map_err(|e| InferenceError::Serialization(e.to_string()))?;
    bytes.extend(
        postcard::to_allocvec(pipeline).map_err(|e| InferenceError::Serialization(e.to_string()))?,
    );

    fs::write(path, &bytes).map_err(|source| InferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved pipeline to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Read a pipeline written by [`save_pipeline`]
pub fn load_pipeline(path: &Path) -> Result<FittedClaimPipeline, InferenceError> {
    let bytes = fs::read(path).map_err(|source| InferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (version, rest) = postcard::take_from_bytes::<u32>(&bytes)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
    if version != MODEL_FORMAT_VERSION {
        return Err(InferenceError::FormatVersion {
            found: version,
            expected: MODEL_FORMAT_VERSION,
        });
    }

    let pipeline: FittedClaimPipeline = postcard::from_bytes(rest)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

    let width = pipeline.first.second.width();
    if width != pipeline.second.width() {
        return Err(InferenceError::ModelLoadError(format!(
            "preprocessor emits {} columns but the model expects {}",
            width,
            pipeline.second.width()
        )));
    }

    info!("Loaded pipeline from {}", path.display());
    Ok(pipeline)
}
