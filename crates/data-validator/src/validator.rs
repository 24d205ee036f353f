//! Claim Validator for Range Checking

use crate::warning::DataQualityWarning;
use claim_data::{ClaimBatch, ClaimRecord, RawColumn};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration. Each range is `[min, max]`; omitted ranges
/// keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Billed amount valid range
    pub billed_amount_range: (f64, f64),
    /// Age range; the lower bound is exclusive, matching the (0, 18] first bucket
    pub age_range: (f64, f64),
    /// Length of stay valid range (days)
    pub length_of_stay_range: (f64, f64),
    /// Provider experience valid range (years)
    pub years_experience_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            billed_amount_range: (0.0, f64::MAX),
            age_range: (0.0, 120.0),
            length_of_stay_range: (0.0, 365.0),
            years_experience_range: (0.0, 70.0),
        }
    }
}

/// Range checker for raw claims
#[derive(Debug, Clone, Default)]
pub struct ClaimValidator {
    config: ValidationConfig,
}

impl ClaimValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an inclusive range.
    /// Non-finite values are always out of range.
    pub fn validate_range(
        &self,
        row: usize,
        field: RawColumn,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), DataQualityWarning> {
        if value >= range.0 && value <= range.1 {
            Ok(())
        } else {
            Err(DataQualityWarning::OutOfRange {
                row,
                field,
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Validate age; zero and below have no bucket
    pub fn validate_age(&self, row: usize, age: f64) -> Result<(), DataQualityWarning> {
        let (min, max) = self.config.age_range;
        if age > min && age <= max {
            Ok(())
        } else {
            Err(DataQualityWarning::OutOfRange {
                row,
                field: RawColumn::Age,
                value: age,
                min,
                max,
            })
        }
    }

    /// Check one claim; `row` is its position in the batch
    pub fn inspect(&self, row: usize, record: &ClaimRecord) -> Vec<DataQualityWarning> {
        let mut warnings = Vec::new();

        if let Some(amount) = record.billed_amount {
            warnings.extend(
                self.validate_range(row, RawColumn::BilledAmount, amount, self.config.billed_amount_range)
                    .err(),
            );
        }

        match record.age {
            Some(age) => warnings.extend(self.validate_age(row, age).err()),
            None => warnings.push(DataQualityWarning::Missing {
                row,
                field: RawColumn::Age,
            }),
        }

        if let Some(stay) = record.length_of_stay {
            warnings.extend(
                self.validate_range(row, RawColumn::LengthOfStay, stay, self.config.length_of_stay_range)
                    .err(),
            );
        }

        if let Some(years) = record.years_experience {
            warnings.extend(
                self.validate_range(
                    row,
                    RawColumn::YearsExperience,
                    years,
                    self.config.years_experience_range,
                )
                .err(),
            );
        }

        warnings
    }

    /// Check every claim of a batch
    pub fn inspect_batch(&self, batch: &ClaimBatch) -> Vec<DataQualityWarning> {
        let warnings: Vec<_> = batch
            .iter()
            .enumerate()
            .flat_map(|(row, record)| self.inspect(row, record))
            .collect();
        if !warnings.is_empty() {
            debug!("{} data quality findings in batch of {}", warnings.len(), batch.len());
        }
        warnings
    }
}
