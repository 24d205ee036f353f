//! Column preprocessing: imputation, scaling and one-hot encoding

use crate::InferenceError;
use feature_engine::statistics::{mean_std, median, most_frequent};
use feature_engine::{Estimator, FeatureColumn, FeatureFrame, FeatureValue, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Fill used when a categorical column has no values at all during fit
const EMPTY_CATEGORY_FILL: &str = "missing";

/// Which engineered columns are numeric and which are categorical.
/// Columns in neither list are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

/// Unfitted preprocessor
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPreprocessor {
    config: PreprocessorConfig,
}

impl ColumnPreprocessor {
    /// Create a preprocessor over the given engineered columns. Names may
    /// use either spelling of an aliased column.
    pub fn new(
        config: PreprocessorConfig,
        engineered_columns: &[String],
    ) -> Result<Self, InferenceError> {
        for name in config
            .numeric_features
            .iter()
            .chain(&config.categorical_features)
        {
            if !engineered_columns
                .iter()
                .any(|c| FeatureColumn::same_feature(c, name))
            {
                return Err(InferenceError::UnknownColumn(name.clone()));
            }
        }
        if config.numeric_features.is_empty() && config.categorical_features.is_empty() {
            return Err(InferenceError::InvalidConfig(
                "preprocessor selects no columns".to_string(),
            ));
        }
        Ok(Self { config })
    }
}

/// Learned median fill and standard scaling of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub fill: f64,
    pub mean: f64,
    pub scale: f64,
}

/// Learned most-frequent fill and category vocabulary of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub fill: String,
    pub categories: Vec<String>,
}

/// Fitted preprocessor producing a dense design matrix:
/// scaled numeric columns first, then one-hot blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
}

impl FittedPreprocessor {
    /// Number of output columns
    pub fn width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
    }

    /// Output column names, `num__<col>` and `cat__<col>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|c| format!("num__{}", c.name));
        let categorical = self.categorical.iter().flat_map(|c| {
            c.categories
                .iter()
                .map(move |cat| format!("cat__{}_{}", c.name, cat))
        });
        numeric.chain(categorical).collect()
    }

    pub fn numeric_columns(&self) -> &[NumericColumn] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[CategoricalColumn] {
        &self.categorical
    }
}

impl Estimator for ColumnPreprocessor {
    type Input = FeatureFrame;
    type Fitted = FittedPreprocessor;
    type Error = InferenceError;

    fn fit(&self, frame: &FeatureFrame, _target: &[u8]) -> Result<FittedPreprocessor, InferenceError> {
        let mut numeric = Vec::with_capacity(self.config.numeric_features.len());
        for name in &self.config.numeric_features {
            let values = numeric_values(frame, name)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let fill = median(&present).unwrap_or_else(|| {
                warn!("Numeric column {} has no values; filling with 0", name);
                0.0
            });
            let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill)).collect();
            let (mean, std_dev) = mean_std(&imputed).unwrap_or((0.0, 1.0));
            let scale = if std_dev > 0.0 { std_dev } else { 1.0 };
            debug!(
                "num {}: fill={} mean={:.4} scale={:.4}",
                name, fill, mean, scale
            );
            numeric.push(NumericColumn {
                name: name.clone(),
                fill,
                mean,
                scale,
            });
        }

        let mut categorical = Vec::with_capacity(self.config.categorical_features.len());
        for name in &self.config.categorical_features {
            let values = categorical_values(frame, name)?;
            let fill = most_frequent(values.iter().filter_map(|v| v.as_deref()))
                .unwrap_or(EMPTY_CATEGORY_FILL)
                .to_string();
            let categories: BTreeSet<String> = values
                .into_iter()
                .map(|v| v.unwrap_or_else(|| fill.clone()))
                .collect();
            debug!(
                "cat {}: fill={} categories={}",
                name,
                fill,
                categories.len()
            );
            categorical.push(CategoricalColumn {
                name: name.clone(),
                fill,
                categories: categories.into_iter().collect(),
            });
        }

        Ok(FittedPreprocessor {
            numeric,
            categorical,
        })
    }
}

impl Transformer for FittedPreprocessor {
    type Input = FeatureFrame;
    type Output = Array2<f64>;
    type Error = InferenceError;

    fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>, InferenceError> {
        let mut matrix = Array2::<f64>::zeros((frame.len(), self.width()));

        for (j, column) in self.numeric.iter().enumerate() {
            let values = numeric_values(frame, &column.name)?;
            for (i, value) in values.into_iter().enumerate() {
                matrix[[i, j]] = (value.unwrap_or(column.fill) - column.mean) / column.scale;
            }
        }

        let mut offset = self.numeric.len();
        for column in &self.categorical {
            let values = categorical_values(frame, &column.name)?;
            for (i, value) in values.into_iter().enumerate() {
                let value = value.unwrap_or_else(|| column.fill.clone());
                // unseen categories leave the whole block at zero
                if let Ok(k) = column.categories.binary_search(&value) {
                    matrix[[i, offset + k]] = 1.0;
                }
            }
            offset += column.categories.len();
        }

        Ok(matrix)
    }
}

fn column_index(frame: &FeatureFrame, name: &str) -> Result<usize, InferenceError> {
    frame
        .column_index(name)
        .ok_or_else(|| InferenceError::UnknownColumn(name.to_string()))
}

fn numeric_values(frame: &FeatureFrame, name: &str) -> Result<Vec<Option<f64>>, InferenceError> {
    let idx = column_index(frame, name)?;
    frame
        .rows()
        .iter()
        .map(|row| match &row[idx] {
            FeatureValue::Number(v) if v.is_finite() => Ok(Some(*v)),
            FeatureValue::Number(_) | FeatureValue::Missing => Ok(None),
            FeatureValue::Category(c) => Err(InferenceError::NonNumeric {
                column: name.to_string(),
                value: c.clone(),
            }),
        })
        .collect()
}

fn categorical_values(frame: &FeatureFrame, name: &str) -> Result<Vec<Option<String>>, InferenceError> {
    let idx = column_index(frame, name)?;
    Ok(frame
        .rows()
        .iter()
        .map(|row| match &row[idx] {
            FeatureValue::Missing => None,
            value => Some(value.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_data::{ClaimBatch, ClaimRecord};
    use feature_engine::{ClaimFeatureEngineer, ExperienceImputation, FeatureConfig};

    fn engineer() -> ClaimFeatureEngineer {
        ClaimFeatureEngineer::new(FeatureConfig {
            high_risk_insurance: ["Medicaid".to_string()].into_iter().collect(),
            final_features: ["billed_amount", "insurance_type", "admission_type", "readmitted_flag"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            years_experience_imputation: ExperienceImputation::BatchMedian,
            years_experience_median: None,
            validation: Default::default(),
        })
        .unwrap()
    }

    fn claim(amount: Option<f64>, insurance: &str, admission: Option<&str>) -> ClaimRecord {
        ClaimRecord {
            billed_amount: amount,
            insurance_type: Some(insurance.to_string()),
            admission_type: admission.map(str::to_string),
            age: Some(40.0),
            ..Default::default()
        }
    }

    fn frame(records: Vec<ClaimRecord>) -> FeatureFrame {
        engineer().transform(&ClaimBatch::new(records)).unwrap()
    }

    fn preprocessor() -> ColumnPreprocessor {
        ColumnPreprocessor::new(
            PreprocessorConfig {
                numeric_features: vec!["billed_amount".to_string()],
                categorical_features: vec![
                    "insurance_type".to_string(),
                    "admission_type".to_string(),
                    "readmitted_flag".to_string(),
                ],
            },
            engineer().output_columns(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_learns_fill_scale_and_vocabulary() {
        let training = frame(vec![
            claim(Some(100.0), "Medicaid", Some("Emergency")),
            claim(None, "Private", Some("Elective")),
            claim(Some(300.0), "Private", None),
        ]);
        let fitted = preprocessor().fit(&training, &[0, 1, 0]).unwrap();

        let num = &fitted.numeric_columns()[0];
        assert_eq!(num.fill, 200.0);
        assert!((num.mean - 200.0).abs() < 1e-12);

        let admission = &fitted.categorical_columns()[1];
        // tie between Elective and Emergency goes to the smaller name
        assert_eq!(admission.fill, "Elective");
        assert_eq!(admission.categories, vec!["Elective", "Emergency"]);

        // 1 numeric + 2 insurance + 2 admission + 1 readmitted ("0")
        assert_eq!(fitted.width(), 6);
        assert_eq!(fitted.feature_names()[0], "num__billed_amount");
        assert_eq!(fitted.feature_names()[1], "cat__insurance_type_Medicaid");
    }

    #[test]
    fn test_transform_scales_and_one_hot_encodes() {
        let training = frame(vec![
            claim(Some(100.0), "Medicaid", Some("Emergency")),
            claim(Some(300.0), "Private", Some("Elective")),
        ]);
        let fitted = preprocessor().fit(&training, &[0, 1]).unwrap();
        let matrix = fitted.transform(&training).unwrap();

        assert_eq!(matrix.shape(), &[2, fitted.width()]);
        assert!((matrix[[0, 0]] + 1.0).abs() < 1e-12);
        assert!((matrix[[1, 0]] - 1.0).abs() < 1e-12);
        assert_eq!(matrix[[0, 1]], 1.0);
        assert_eq!(matrix[[0, 2]], 0.0);
    }

    #[test]
    fn test_unknown_category_encodes_as_zero_block() {
        let training = frame(vec![
            claim(Some(100.0), "Medicaid", Some("Emergency")),
            claim(Some(300.0), "Private", Some("Elective")),
        ]);
        let fitted = preprocessor().fit(&training, &[0, 1]).unwrap();
        let scoring = frame(vec![claim(Some(50.0), "Tricare", Some("Emergency"))]);
        let matrix = fitted.transform(&scoring).unwrap();
        assert_eq!(matrix[[0, 1]], 0.0);
        assert_eq!(matrix[[0, 2]], 0.0);
    }

    #[test]
    fn test_constant_column_gets_unit_scale() {
        let training = frame(vec![
            claim(Some(10.0), "Private", None),
            claim(Some(10.0), "Private", None),
        ]);
        let fitted = preprocessor().fit(&training, &[0, 1]).unwrap();
        assert_eq!(fitted.numeric_columns()[0].scale, 1.0);
        let matrix = fitted.transform(&training).unwrap();
        assert_eq!(matrix[[0, 0]], 0.0);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = ColumnPreprocessor::new(
            PreprocessorConfig {
                numeric_features: vec!["credit_score".to_string()],
                categorical_features: vec![],
            },
            engineer().output_columns(),
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::UnknownColumn(c) if c == "credit_score"));
    }

    #[test]
    fn test_department_alias_matches_engineered_column() {
        let engineer = ClaimFeatureEngineer::new(FeatureConfig {
            high_risk_insurance: Default::default(),
            final_features: vec!["billed_amount".to_string(), "department_x".to_string()],
            years_experience_imputation: ExperienceImputation::BatchMedian,
            years_experience_median: None,
            validation: Default::default(),
        })
        .unwrap();
        let pre = ColumnPreprocessor::new(
            PreprocessorConfig {
                numeric_features: vec!["billed_amount".to_string()],
                categorical_features: vec!["department".to_string()],
            },
            engineer.output_columns(),
        )
        .unwrap();

        let records = ["Cardiology", "Oncology"]
            .iter()
            .map(|dept| ClaimRecord {
                department: Some(dept.to_string()),
                ..claim(Some(10.0), "Private", None)
            })
            .collect();
        let training = engineer.transform(&ClaimBatch::new(records)).unwrap();
        let fitted = pre.fit(&training, &[0, 1]).unwrap();

        assert_eq!(fitted.categorical_columns()[0].categories, vec!["Cardiology", "Oncology"]);
        let matrix = fitted.transform(&training).unwrap();
        assert_eq!(matrix[[1, 2]], 1.0);
    }

    #[test]
    fn test_text_in_numeric_column_rejected() {
        let pre = ColumnPreprocessor::new(
            PreprocessorConfig {
                numeric_features: vec!["insurance_type".to_string()],
                categorical_features: vec![],
            },
            engineer().output_columns(),
        )
        .unwrap();
        let training = frame(vec![claim(Some(1.0), "Private", None)]);
        assert!(matches!(
            pre.fit(&training, &[0]),
            Err(InferenceError::NonNumeric { .. })
        ));
    }
}
