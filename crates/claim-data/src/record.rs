//! Raw Claim Record

use serde::{Deserialize, Serialize};

/// Raw input columns the feature pipeline knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RawColumn {
    BilledAmount,
    LengthOfStay,
    Age,
    InsuranceType,
    VisitType,
    Department,
    AdmissionType,
    DiagnosisCode,
    YearsExperience,
    ReadmittedFlag,
}

impl RawColumn {
    /// Every raw column, in canonical order
    pub const ALL: [RawColumn; 10] = [
        RawColumn::BilledAmount,
        RawColumn::LengthOfStay,
        RawColumn::Age,
        RawColumn::InsuranceType,
        RawColumn::VisitType,
        RawColumn::Department,
        RawColumn::AdmissionType,
        RawColumn::DiagnosisCode,
        RawColumn::YearsExperience,
        RawColumn::ReadmittedFlag,
    ];

    /// Column header name
    pub fn name(&self) -> &'static str {
        match self {
            RawColumn::BilledAmount => "billed_amount",
            RawColumn::LengthOfStay => "length_of_stay",
            RawColumn::Age => "age",
            RawColumn::InsuranceType => "insurance_type",
            RawColumn::VisitType => "visit_type",
            RawColumn::Department => "department",
            RawColumn::AdmissionType => "admission_type",
            RawColumn::DiagnosisCode => "diagnosis_code",
            RawColumn::YearsExperience => "years_experience",
            RawColumn::ReadmittedFlag => "readmitted_flag",
        }
    }

    /// Alternative headers accepted for this column.
    ///
    /// Joining encounters and providers leaves two `department` columns,
    /// suffixed `_x` (encounter) and `_y` (provider); the encounter one is
    /// the claim's department.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            RawColumn::Department => &["department_x"],
            _ => &[],
        }
    }

    /// Whether this column holds numbers rather than text
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            RawColumn::BilledAmount
                | RawColumn::LengthOfStay
                | RawColumn::Age
                | RawColumn::YearsExperience
        )
    }

    /// Find a raw column by header name or alias
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == header || c.aliases().contains(&header))
    }
}

impl std::fmt::Display for RawColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One claim joined with its patient, encounter and provider attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Claim identifier, carried through but never used as a feature
    pub claim_id: Option<String>,
    pub billed_amount: Option<f64>,
    /// Missing means outpatient / no stay recorded
    pub length_of_stay: Option<f64>,
    pub age: Option<f64>,
    pub insurance_type: Option<String>,
    pub visit_type: Option<String>,
    pub department: Option<String>,
    pub admission_type: Option<String>,
    pub diagnosis_code: Option<String>,
    /// Attending provider's years of experience
    pub years_experience: Option<f64>,
    /// "Yes" / "No"
    pub readmitted_flag: Option<String>,
}

impl ClaimRecord {
    /// Numeric value of a raw column, `None` for text columns or missing cells
    pub fn number(&self, column: RawColumn) -> Option<f64> {
        match column {
            RawColumn::BilledAmount => self.billed_amount,
            RawColumn::LengthOfStay => self.length_of_stay,
            RawColumn::Age => self.age,
            RawColumn::YearsExperience => self.years_experience,
            _ => None,
        }
    }

    /// Text value of a raw column, `None` for numeric columns or missing cells
    pub fn text(&self, column: RawColumn) -> Option<&str> {
        let value = match column {
            RawColumn::InsuranceType => &self.insurance_type,
            RawColumn::VisitType => &self.visit_type,
            RawColumn::Department => &self.department,
            RawColumn::AdmissionType => &self.admission_type,
            RawColumn::DiagnosisCode => &self.diagnosis_code,
            RawColumn::ReadmittedFlag => &self.readmitted_flag,
            _ => return None,
        };
        value.as_deref()
    }

    pub(crate) fn set_number(&mut self, column: RawColumn, value: Option<f64>) {
        match column {
            RawColumn::BilledAmount => self.billed_amount = value,
            RawColumn::LengthOfStay => self.length_of_stay = value,
            RawColumn::Age => self.age = value,
            RawColumn::YearsExperience => self.years_experience = value,
            _ => {}
        }
    }

    pub(crate) fn set_text(&mut self, column: RawColumn, value: Option<String>) {
        match column {
            RawColumn::InsuranceType => self.insurance_type = value,
            RawColumn::VisitType => self.visit_type = value,
            RawColumn::Department => self.department = value,
            RawColumn::AdmissionType => self.admission_type = value,
            RawColumn::DiagnosisCode => self.diagnosis_code = value,
            RawColumn::ReadmittedFlag => self.readmitted_flag = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup() {
        assert_eq!(RawColumn::from_header("age"), Some(RawColumn::Age));
        assert_eq!(
            RawColumn::from_header("department_x"),
            Some(RawColumn::Department)
        );
        assert_eq!(RawColumn::from_header("department_y"), None);
        assert_eq!(RawColumn::from_header("claim_id"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let record = ClaimRecord {
            age: Some(42.0),
            insurance_type: Some("Medicaid".to_string()),
            ..Default::default()
        };
        assert_eq!(record.number(RawColumn::Age), Some(42.0));
        assert_eq!(record.number(RawColumn::InsuranceType), None);
        assert_eq!(record.text(RawColumn::InsuranceType), Some("Medicaid"));
        assert_eq!(record.text(RawColumn::DiagnosisCode), None);
    }
}
