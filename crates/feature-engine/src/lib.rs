//! Claim Feature Engineering
//!
//! Maps raw claims to a fixed-order set of model features. The same
//! transform runs during training, batch scoring and online inference.

mod config;
mod features;
mod frame;
pub mod stage;
pub mod statistics;

pub use config::{ExperienceImputation, FeatureConfig};
pub use features::{AgeBucket, ClaimFeatureEngineer, REQUIRED_RAW_COLUMNS};
pub use frame::{FeatureColumn, FeatureFrame, FeatureValue};
pub use stage::{Chain, Estimator, StageExt, Transformer};

use claim_data::RawColumn;
use thiserror::Error;

/// Errors during feature engineering
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Schema error: missing raw column {0}")]
    MissingRawColumn(RawColumn),
    #[error("Schema error: unknown feature {0:?}")]
    UnknownFeature(String),
    #[error("Schema error: duplicate feature {0:?}")]
    DuplicateFeature(String),
    #[error("Invalid feature configuration: {0}")]
    InvalidConfig(String),
    #[error("years_experience median is not fitted; fit the pipeline or set years_experience_median")]
    UnfittedStatistic,
    #[error("Cannot fit years_experience median: training data has no values")]
    EmptyStatistic,
}

impl FeatureError {
    /// Whether the input or configured schema caused the failure
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FeatureError::MissingRawColumn(_)
                | FeatureError::UnknownFeature(_)
                | FeatureError::DuplicateFeature(_)
        )
    }
}
