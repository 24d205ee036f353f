//! Inference Engine Implementation

use crate::pipeline::{load_pipeline, FittedClaimPipeline};
use crate::InferenceError;
use claim_data::{ClaimBatch, ClaimRecord};
use feature_engine::Transformer;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Denial decision for one claim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Whether the claim is predicted to be denied
    pub is_denied: bool,
    /// Probability of denial (0.0 to 1.0)
    pub probability: f64,
}

/// Result of a single-claim inference
#[derive(Debug, Clone)]
pub struct InferenceResult {
    pub prediction: Prediction,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Scores claims with a fitted pipeline.
///
/// Read-only after construction; share it behind an `Arc` across request
/// handlers.
pub struct InferenceEngine {
    pipeline: FittedClaimPipeline,
    model_path: Option<PathBuf>,
    threshold: f64,
}

impl InferenceEngine {
    /// Wrap an in-memory fitted pipeline
    pub fn new(pipeline: FittedClaimPipeline, threshold: f64) -> Result<Self, InferenceError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(InferenceError::InvalidConfig(format!(
                "decision threshold must be in [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self {
            pipeline,
            model_path: None,
            threshold,
        })
    }

    /// Load a persisted pipeline
    pub fn load(path: &Path, threshold: f64) -> Result<Self, InferenceError> {
        info!("Loading inference engine from {}", path.display());
        let mut engine = Self::new(load_pipeline(path)?, threshold)?;
        engine.model_path = Some(path.to_path_buf());
        Ok(engine)
    }

    /// Score every claim of a batch, in input order. A claim is denied when
    /// its probability reaches the threshold; batch and HTTP scoring share this.
    pub fn score(&self, batch: &ClaimBatch) -> Result<Vec<Prediction>, InferenceError> {
        let start = Instant::now();

        let probabilities = match self.pipeline.transform(batch) {
            Ok(p) => p,
            Err(e) => {
                counter!("claim_scoring_errors_total").increment(1);
                warn!("Scoring failed for batch of {}: {}", batch.len(), e);
                return Err(e);
            }
        };

        let predictions: Vec<Prediction> = probabilities
            .into_iter()
            .map(|probability| Prediction {
                is_denied: probability >= self.threshold,
                probability,
            })
            .collect();

        let elapsed = start.elapsed();
        counter!("claims_scored_total").increment(predictions.len() as u64);
        histogram!("claim_scoring_latency_seconds").record(elapsed.as_secs_f64());
        debug!("Scored {} claims in {:?}", predictions.len(), elapsed);

        Ok(predictions)
    }

    /// Score a single claim
    pub fn predict(&self, record: ClaimRecord) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();
        let prediction = self
            .score(&ClaimBatch::from(record))?
            .pop()
            .ok_or_else(|| InferenceError::InvalidInputShape {
                expected: "1 prediction".to_string(),
                actual: "0 predictions".to_string(),
            })?;

        Ok(InferenceResult {
            prediction,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    pub fn pipeline(&self) -> &FittedClaimPipeline {
        &self.pipeline
    }

    /// Path the pipeline was loaded from, if any
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
