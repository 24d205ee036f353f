//! Feature frame: the tabular output of the feature transform

use claim_data::RawColumn;
use data_validator::DataQualityWarning;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns the feature transform can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    BilledAmount,
    /// Length of stay with missing filled as 0
    LengthOfStay,
    Age,
    InsuranceType,
    VisitType,
    Department,
    AdmissionType,
    DiagnosisCode,
    /// Provider experience after median imputation
    YearsExperience,
    LongStayFlag,
    AgeBucket,
    /// Readmission mapped to 0/1
    ReadmittedFlag,
    HighRiskInsuranceFlag,
    HasDiagnosis,
    LowExperienceProvider,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 15] = [
        FeatureColumn::BilledAmount,
        FeatureColumn::LengthOfStay,
        FeatureColumn::Age,
        FeatureColumn::InsuranceType,
        FeatureColumn::VisitType,
        FeatureColumn::Department,
        FeatureColumn::AdmissionType,
        FeatureColumn::DiagnosisCode,
        FeatureColumn::YearsExperience,
        FeatureColumn::LongStayFlag,
        FeatureColumn::AgeBucket,
        FeatureColumn::ReadmittedFlag,
        FeatureColumn::HighRiskInsuranceFlag,
        FeatureColumn::HasDiagnosis,
        FeatureColumn::LowExperienceProvider,
    ];

    /// Canonical column name
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::LongStayFlag => "long_stay_flag",
            FeatureColumn::AgeBucket => "age_bucket",
            FeatureColumn::ReadmittedFlag => "readmitted_flag",
            FeatureColumn::HighRiskInsuranceFlag => "high_risk_insurance_flag",
            FeatureColumn::HasDiagnosis => "has_diagnosis",
            FeatureColumn::LowExperienceProvider => "low_experience_provider",
            other => other.source().map(|c| c.name()).unwrap_or_default(),
        }
    }

    /// Look up a column by canonical name or raw-column alias
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name).or_else(|| {
            let raw = RawColumn::from_header(name)?;
            Self::ALL.into_iter().find(|c| c.source() == Some(raw))
        })
    }

    /// Whether two column names refer to the same feature, either verbatim
    /// or through a raw-column alias such as `department_x`
    pub fn same_feature(a: &str, b: &str) -> bool {
        a == b
            || matches!(
                (Self::from_name(a), Self::from_name(b)),
                (Some(x), Some(y)) if x == y
            )
    }

    /// Raw column a pass-through feature is read from
    pub fn source(&self) -> Option<RawColumn> {
        match self {
            FeatureColumn::BilledAmount => Some(RawColumn::BilledAmount),
            FeatureColumn::LengthOfStay => Some(RawColumn::LengthOfStay),
            FeatureColumn::Age => Some(RawColumn::Age),
            FeatureColumn::InsuranceType => Some(RawColumn::InsuranceType),
            FeatureColumn::VisitType => Some(RawColumn::VisitType),
            FeatureColumn::Department => Some(RawColumn::Department),
            FeatureColumn::AdmissionType => Some(RawColumn::AdmissionType),
            FeatureColumn::DiagnosisCode => Some(RawColumn::DiagnosisCode),
            FeatureColumn::YearsExperience => Some(RawColumn::YearsExperience),
            _ => None,
        }
    }
}

/// One feature cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    Missing,
}

impl FeatureValue {
    pub(crate) fn flag(value: bool) -> Self {
        FeatureValue::Number(if value { 1.0 } else { 0.0 })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Missing, FeatureValue::Number)
    }
}

impl From<Option<&str>> for FeatureValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(FeatureValue::Missing, |v| FeatureValue::Category(v.to_string()))
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(v) => write!(f, "{}", v),
            FeatureValue::Category(v) => f.write_str(v),
            FeatureValue::Missing => Ok(()),
        }
    }
}

/// Model-ready features: one row per input claim, columns in configured order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
    warnings: Vec<DataQualityWarning>,
}

impl FeatureFrame {
    pub(crate) fn new(
        columns: Vec<String>,
        rows: Vec<Vec<FeatureValue>>,
        warnings: Vec<DataQualityWarning>,
    ) -> Self {
        Self {
            columns,
            rows,
            warnings,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<FeatureValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column; alias spellings of a column match it too
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| FeatureColumn::same_feature(c, name))
            })
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&FeatureValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Data quality findings raised while deriving the features
    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for column in FeatureColumn::ALL {
            assert_eq!(FeatureColumn::from_name(column.name()), Some(column));
        }
    }

    #[test]
    fn test_department_alias() {
        assert_eq!(
            FeatureColumn::from_name("department_x"),
            Some(FeatureColumn::Department)
        );
    }

    #[test]
    fn test_same_feature_through_alias() {
        assert!(FeatureColumn::same_feature("department", "department_x"));
        assert!(FeatureColumn::same_feature("age", "age"));
        assert!(!FeatureColumn::same_feature("department", "department_y"));
        assert!(!FeatureColumn::same_feature("age", "age_bucket"));
        // unknown names only match themselves
        assert!(FeatureColumn::same_feature("credit_score", "credit_score"));
    }

    #[test]
    fn test_frame_lookup_accepts_alias() {
        let frame = FeatureFrame::new(
            vec!["department".to_string(), "age".to_string()],
            vec![vec![FeatureValue::Category("Oncology".into()), FeatureValue::Number(40.0)]],
            Vec::new(),
        );
        assert_eq!(frame.column_index("department_x"), Some(0));
        assert_eq!(frame.column_index("age"), Some(1));
        assert_eq!(frame.column_index("department_y"), None);
    }

    #[test]
    fn test_readmitted_flag_is_derived() {
        // the derived 0/1 column replaces the raw Yes/No column
        assert_eq!(
            FeatureColumn::from_name("readmitted_flag"),
            Some(FeatureColumn::ReadmittedFlag)
        );
        assert_eq!(FeatureColumn::ReadmittedFlag.source(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Number(1.0).to_string(), "1");
        assert_eq!(FeatureValue::Category("adult".into()).to_string(), "adult");
        assert_eq!(FeatureValue::Missing.to_string(), "");
    }
}
