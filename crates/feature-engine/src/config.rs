//! Feature configuration

use crate::frame::FeatureColumn;
use crate::FeatureError;
use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How missing `years_experience` values are filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceImputation {
    /// Median frozen at training time, reused for every later batch
    #[default]
    TrainingMedian,
    /// Median of the batch being transformed. Single-claim requests impute
    /// with their own value, so online scores can drift from training.
    BatchMedian,
}

/// Feature configuration, immutable for the lifetime of a transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Insurance types flagged as high risk
    pub high_risk_insurance: BTreeSet<String>,
    /// Output columns, in output order
    pub final_features: Vec<String>,
    #[serde(default)]
    pub years_experience_imputation: ExperienceImputation,
    /// Frozen training median; filled in by `fit` when absent
    #[serde(default)]
    pub years_experience_median: Option<f64>,
    /// Plausible value ranges; values outside raise data quality warnings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl FeatureConfig {
    /// Resolve `final_features` to known columns, rejecting unknown or
    /// repeated names
    pub fn resolve_features(&self) -> Result<Vec<FeatureColumn>, FeatureError> {
        if self.final_features.is_empty() {
            return Err(FeatureError::InvalidConfig(
                "final_features must not be empty".to_string(),
            ));
        }
        if let Some(median) = self.years_experience_median {
            if !median.is_finite() {
                return Err(FeatureError::InvalidConfig(format!(
                    "years_experience_median must be finite, got {}",
                    median
                )));
            }
        }

        let mut seen = HashSet::new();
        self.final_features
            .iter()
            .map(|name| {
                let column = FeatureColumn::from_name(name)
                    .ok_or_else(|| FeatureError::UnknownFeature(name.clone()))?;
                if !seen.insert(column) {
                    return Err(FeatureError::DuplicateFeature(name.clone()));
                }
                Ok(column)
            })
            .collect()
    }
}
