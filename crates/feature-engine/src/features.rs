//! Claim Feature Engineer

use crate::config::{ExperienceImputation, FeatureConfig};
use crate::frame::{FeatureColumn, FeatureFrame, FeatureValue};
use crate::stage::{Estimator, Transformer};
use crate::statistics::median;
use crate::FeatureError;
use claim_data::{ClaimBatch, ClaimRecord, RawColumn};
use data_validator::ClaimValidator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Raw columns every batch must carry, whatever `final_features` selects
pub const REQUIRED_RAW_COLUMNS: [RawColumn; 6] = [
    RawColumn::Age,
    RawColumn::InsuranceType,
    RawColumn::ReadmittedFlag,
    RawColumn::DiagnosisCode,
    RawColumn::YearsExperience,
    RawColumn::LengthOfStay,
];

/// Stays longer than this many days are long stays
const LONG_STAY_DAYS: f64 = 5.0;

/// Providers with less experience than this (years) are low experience
const LOW_EXPERIENCE_YEARS: f64 = 5.0;

/// Age group over half-open bins (0,18], (18,35], (35,50], (50,65], (65,120]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBucket {
    Child,
    YoungAdult,
    Adult,
    Senior,
    Elder,
}

impl AgeBucket {
    /// Bucket an age. Ages at or below zero clamp to `Child` and ages above
    /// 120 clamp to `Elder`; NaN has no bucket.
    pub fn from_age(age: f64) -> Option<Self> {
        if age.is_nan() {
            None
        } else if age <= 18.0 {
            Some(AgeBucket::Child)
        } else if age <= 35.0 {
            Some(AgeBucket::YoungAdult)
        } else if age <= 50.0 {
            Some(AgeBucket::Adult)
        } else if age <= 65.0 {
            Some(AgeBucket::Senior)
        } else {
            Some(AgeBucket::Elder)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBucket::Child => "child",
            AgeBucket::YoungAdult => "young_adult",
            AgeBucket::Adult => "adult",
            AgeBucket::Senior => "senior",
            AgeBucket::Elder => "elder",
        }
    }
}

/// Normalized and derived values of one claim
struct DerivedClaim<'a> {
    record: &'a ClaimRecord,
    length_of_stay: f64,
    years_experience: Option<f64>,
    age_bucket: Option<AgeBucket>,
    readmitted: bool,
    high_risk_insurance: bool,
}

impl<'a> DerivedClaim<'a> {
    fn derive(
        record: &'a ClaimRecord,
        experience_fill: Option<f64>,
        high_risk: &BTreeSet<String>,
    ) -> Self {
        Self {
            record,
            length_of_stay: record.length_of_stay.unwrap_or(0.0),
            years_experience: record.years_experience.or(experience_fill),
            age_bucket: record.age.and_then(AgeBucket::from_age),
            readmitted: record.readmitted_flag.as_deref() == Some("Yes"),
            high_risk_insurance: record
                .insurance_type
                .as_ref()
                .is_some_and(|t| high_risk.contains(t)),
        }
    }

    fn value(&self, column: FeatureColumn) -> FeatureValue {
        let r = self.record;
        match column {
            FeatureColumn::BilledAmount => r.billed_amount.into(),
            FeatureColumn::LengthOfStay => FeatureValue::Number(self.length_of_stay),
            FeatureColumn::Age => r.age.into(),
            FeatureColumn::InsuranceType => r.insurance_type.as_deref().into(),
            FeatureColumn::VisitType => r.visit_type.as_deref().into(),
            FeatureColumn::Department => r.department.as_deref().into(),
            FeatureColumn::AdmissionType => r.admission_type.as_deref().into(),
            FeatureColumn::DiagnosisCode => r.diagnosis_code.as_deref().into(),
            FeatureColumn::YearsExperience => self.years_experience.into(),
            FeatureColumn::LongStayFlag => FeatureValue::flag(self.length_of_stay > LONG_STAY_DAYS),
            FeatureColumn::AgeBucket => self
                .age_bucket
                .map_or(FeatureValue::Missing, |b| FeatureValue::Category(b.as_str().to_string())),
            FeatureColumn::ReadmittedFlag => FeatureValue::flag(self.readmitted),
            FeatureColumn::HighRiskInsuranceFlag => FeatureValue::flag(self.high_risk_insurance),
            // an empty string still counts as a recorded code
            FeatureColumn::HasDiagnosis => FeatureValue::flag(r.diagnosis_code.is_some()),
            FeatureColumn::LowExperienceProvider => FeatureValue::flag(
                self.years_experience
                    .is_some_and(|y| y < LOW_EXPERIENCE_YEARS),
            ),
        }
    }
}

/// Rule-based claim feature transform.
///
/// Holds nothing but its configuration, so one instance can be shared by
/// concurrent callers. Serializes as its configuration and re-validates on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeatureConfig", into = "FeatureConfig")]
pub struct ClaimFeatureEngineer {
    config: FeatureConfig,
    selection: Vec<FeatureColumn>,
}

impl ClaimFeatureEngineer {
    /// Create a transform, rejecting unknown or duplicate output features
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        let selection = config.resolve_features()?;
        debug!(
            "Feature engineer: {} output columns, {} high-risk insurance types, imputation={:?}",
            selection.len(),
            config.high_risk_insurance.len(),
            config.years_experience_imputation
        );
        Ok(Self { config, selection })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Output column names, in output order
    pub fn output_columns(&self) -> &[String] {
        &self.config.final_features
    }

    /// Check the batch carries every raw column the transform reads
    fn check_schema(&self, batch: &ClaimBatch) -> Result<(), FeatureError> {
        let selected = self.selection.iter().filter_map(|c| c.source());
        for column in REQUIRED_RAW_COLUMNS.into_iter().chain(selected) {
            if !batch.has_column(column) {
                return Err(FeatureError::MissingRawColumn(column));
            }
        }
        Ok(())
    }

    /// Value used for missing `years_experience`
    fn experience_fill(&self, batch: &ClaimBatch) -> Result<Option<f64>, FeatureError> {
        match self.config.years_experience_imputation {
            ExperienceImputation::TrainingMedian => self
                .config
                .years_experience_median
                .map(Some)
                .ok_or(FeatureError::UnfittedStatistic),
            ExperienceImputation::BatchMedian => Ok(batch_experience_median(batch)),
        }
    }
}

impl Transformer for ClaimFeatureEngineer {
    type Input = ClaimBatch;
    type Output = FeatureFrame;
    type Error = FeatureError;

    fn transform(&self, batch: &ClaimBatch) -> Result<FeatureFrame, FeatureError> {
        self.check_schema(batch)?;
        let experience_fill = self.experience_fill(batch)?;

        let warnings = ClaimValidator::new(self.config.validation.clone()).inspect_batch(batch);
        if !warnings.is_empty() {
            warn!(
                "{} data quality warnings in batch of {} claims",
                warnings.len(),
                batch.len()
            );
            for w in &warnings {
                debug!("{}", w);
            }
        }

        let rows = batch
            .iter()
            .map(|record| {
                let derived =
                    DerivedClaim::derive(record, experience_fill, &self.config.high_risk_insurance);
                self.selection.iter().map(|&c| derived.value(c)).collect()
            })
            .collect();

        Ok(FeatureFrame::new(
            self.config.final_features.clone(),
            rows,
            warnings,
        ))
    }
}

impl Estimator for ClaimFeatureEngineer {
    type Input = ClaimBatch;
    type Fitted = ClaimFeatureEngineer;
    type Error = FeatureError;

    /// Rules are fixed, so fitting returns the same transform. The one
    /// exception is a training-median imputation without a configured
    /// median: the median of the training batch is frozen into the result.
    fn fit(&self, batch: &ClaimBatch, _target: &[u8]) -> Result<Self, FeatureError> {
        let needs_median = self.config.years_experience_imputation
            == ExperienceImputation::TrainingMedian
            && self.config.years_experience_median.is_none();
        if !needs_median {
            return Ok(self.clone());
        }

        if !batch.has_column(RawColumn::YearsExperience) {
            return Err(FeatureError::MissingRawColumn(RawColumn::YearsExperience));
        }
        let frozen = batch_experience_median(batch).ok_or(FeatureError::EmptyStatistic)?;
        info!("Froze years_experience training median at {}", frozen);

        let mut config = self.config.clone();
        config.years_experience_median = Some(frozen);
        Ok(Self {
            config,
            selection: self.selection.clone(),
        })
    }
}

impl TryFrom<FeatureConfig> for ClaimFeatureEngineer {
    type Error = FeatureError;

    fn try_from(config: FeatureConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<ClaimFeatureEngineer> for FeatureConfig {
    fn from(engineer: ClaimFeatureEngineer) -> Self {
        engineer.config
    }
}

fn batch_experience_median(batch: &ClaimBatch) -> Option<f64> {
    let values: Vec<f64> = batch.iter().filter_map(|r| r.years_experience).collect();
    median(&values)
}
