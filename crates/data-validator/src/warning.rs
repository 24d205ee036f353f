//! Data Quality Warning Types

use claim_data::RawColumn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Non-fatal finding about a raw claim value
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DataQualityWarning {
    /// Value outside the expected domain
    #[error("row {row}: {field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        row: usize,
        field: RawColumn,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value needed for a derived feature is absent
    #[error("row {row}: {field} is missing")]
    Missing { row: usize, field: RawColumn },
}

impl DataQualityWarning {
    /// Row the warning refers to
    pub fn row(&self) -> usize {
        match self {
            DataQualityWarning::OutOfRange { row, .. } | DataQualityWarning::Missing { row, .. } => {
                *row
            }
        }
    }

    /// Column the warning refers to
    pub fn field(&self) -> RawColumn {
        match self {
            DataQualityWarning::OutOfRange { field, .. }
            | DataQualityWarning::Missing { field, .. } => *field,
        }
    }
}
