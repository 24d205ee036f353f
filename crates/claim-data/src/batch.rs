//! Claim Batch

use crate::record::{ClaimRecord, RawColumn};
use crate::DataError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Header carrying the claim identifier
const CLAIM_ID_HEADER: &str = "claim_id";

/// Ordered batch of raw claims plus the set of raw columns the source provided
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimBatch {
    columns: BTreeSet<RawColumn>,
    records: Vec<ClaimRecord>,
}

impl ClaimBatch {
    /// Batch built from typed records; every raw column counts as present
    pub fn new(records: Vec<ClaimRecord>) -> Self {
        Self {
            columns: RawColumn::ALL.into_iter().collect(),
            records,
        }
    }

    /// Batch with an explicit set of present raw columns
    pub fn with_columns(columns: BTreeSet<RawColumn>, records: Vec<ClaimRecord>) -> Self {
        Self { columns, records }
    }

    /// Read claims out of a frame. Unknown columns are ignored and nulls
    /// become missing values. Numeric columns are read as `Float64`; a
    /// numeric column holding text fails on its first unparsable cell.
    pub fn from_frame(df: &DataFrame) -> Result<Self, DataError> {
        let mut records = vec![ClaimRecord::default(); df.height()];
        let mut columns = BTreeSet::new();

        if df.get_column_index(CLAIM_ID_HEADER).is_some() {
            let ids = df.column(CLAIM_ID_HEADER)?.cast(&DataType::String)?;
            for (record, id) in records.iter_mut().zip(ids.str()?) {
                record.claim_id = id.map(str::to_string);
            }
        }

        for column in RawColumn::ALL {
            let Some(header) = header_for(df, column) else {
                continue;
            };
            let source = df.column(header)?;
            if column.is_numeric() {
                let numbers = numeric_values(source, column)?;
                for (record, value) in records.iter_mut().zip(numbers.f64()?) {
                    record.set_number(column, value);
                }
            } else {
                let text = source.cast(&DataType::String)?;
                for (record, value) in records.iter_mut().zip(text.str()?) {
                    record.set_text(column, value.map(str::to_string));
                }
            }
            columns.insert(column);
        }

        Ok(Self { columns, records })
    }

    /// Raw columns present in the source
    pub fn columns(&self) -> &BTreeSet<RawColumn> {
        &self.columns
    }

    pub fn has_column(&self, column: RawColumn) -> bool {
        self.columns.contains(&column)
    }

    pub fn records(&self) -> &[ClaimRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClaimRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sub-batch of the given row positions, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

}

impl From<ClaimRecord> for ClaimBatch {
    fn from(record: ClaimRecord) -> Self {
        Self::new(vec![record])
    }
}

/// Header the frame uses for a raw column, canonical name first
fn header_for(df: &DataFrame, column: RawColumn) -> Option<&'static str> {
    std::iter::once(column.name())
        .chain(column.aliases().iter().copied())
        .find(|header| df.get_column_index(header).is_some())
}

/// Cast a column to `Float64`, reporting the first text cell that does not
/// parse as a number
fn numeric_values(source: &Column, column: RawColumn) -> Result<Column, DataError> {
    let numbers = source.cast(&DataType::Float64)?;
    if source.dtype() == &DataType::String {
        let bad = source
            .str()?
            .into_iter()
            .zip(numbers.f64()?)
            .enumerate()
            .find_map(|(row, (text, number))| match (text, number) {
                (Some(text), None) => Some((row, text.to_string())),
                _ => None,
            });
        if let Some((row, value)) = bad {
            return Err(DataError::InvalidNumber {
                row,
                column: column.name(),
                value,
            });
        }
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_csv;

    fn frame(csv: &str) -> DataFrame {
        parse_csv(csv.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_parse_claims_from_frame() {
        let df = frame(
            "claim_id,billed_amount,age,insurance_type,department_x,length_of_stay,diagnosis_code,extra\n\
             C1,1200.50,45,Medicaid,Cardiology,3,E11.9,foo\n\
             C2,80,19,Private,Oncology,,,bar\n",
        );
        let batch = ClaimBatch::from_frame(&df).unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch.has_column(RawColumn::Department));
        assert!(batch.has_column(RawColumn::LengthOfStay));
        assert!(!batch.has_column(RawColumn::YearsExperience));

        let first = &batch.records()[0];
        assert_eq!(first.claim_id.as_deref(), Some("C1"));
        assert_eq!(first.billed_amount, Some(1200.5));
        assert_eq!(first.age, Some(45.0));
        assert_eq!(first.length_of_stay, Some(3.0));
        assert_eq!(first.department.as_deref(), Some("Cardiology"));
        assert_eq!(first.diagnosis_code.as_deref(), Some("E11.9"));

        let second = &batch.records()[1];
        assert_eq!(second.length_of_stay, None);
        assert_eq!(second.diagnosis_code, None);
    }

    #[test]
    fn test_numeric_ids_and_codes_read_as_text() {
        let df = frame("claim_id,diagnosis_code,age\n17,250,40\n");
        let batch = ClaimBatch::from_frame(&df).unwrap();
        assert_eq!(batch.records()[0].claim_id.as_deref(), Some("17"));
        assert_eq!(batch.records()[0].diagnosis_code.as_deref(), Some("250"));
    }

    #[test]
    fn test_na_markers_are_missing() {
        let df = frame("age,readmitted_flag\nNaN,NA\n30,Yes\n");
        let batch = ClaimBatch::from_frame(&df).unwrap();
        assert_eq!(batch.records()[0].age, None);
        assert_eq!(batch.records()[0].readmitted_flag, None);
        assert_eq!(batch.records()[1].age, Some(30.0));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let df = frame("age\n41\nforty\n");
        let err = ClaimBatch::from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidNumber { row: 1, column: "age", ref value } if value == "forty"
        ));
    }

    #[test]
    fn test_select_keeps_column_set() {
        let df = frame("age\n1\n2\n3\n");
        let batch = ClaimBatch::from_frame(&df).unwrap();
        let picked = batch.select(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.records()[0].age, Some(3.0));
        assert_eq!(picked.columns(), batch.columns());
    }
}
