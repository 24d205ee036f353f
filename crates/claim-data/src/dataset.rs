//! Labeled claim denial dataset assembly

use crate::table::{left_join, read_csv, require_column};
use crate::DataError;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// File name of the merged, labeled dataset
pub const BASE_DATASET_FILE: &str = "claims_denial_base.csv";

const CLAIMS_FILE: &str = "claims_and_billing.csv";
const DENIALS_FILE: &str = "denials.csv";
const PATIENTS_FILE: &str = "patients.csv";
const ENCOUNTERS_FILE: &str = "encounters.csv";
const PROVIDERS_FILE: &str = "providers.csv";

/// Raw healthcare tables, read once and never modified
#[derive(Debug, Clone)]
pub struct RawTables {
    pub claims: DataFrame,
    pub denials: DataFrame,
    pub patients: DataFrame,
    pub encounters: DataFrame,
    pub providers: DataFrame,
}

impl RawTables {
    /// Load every raw table from a directory
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        info!("Loading raw tables from {}", dir.display());
        Ok(Self {
            claims: read_csv(&dir.join(CLAIMS_FILE))?,
            denials: read_csv(&dir.join(DENIALS_FILE))?,
            patients: read_csv(&dir.join(PATIENTS_FILE))?,
            encounters: read_csv(&dir.join(ENCOUNTERS_FILE))?,
            providers: read_csv(&dir.join(PROVIDERS_FILE))?,
        })
    }
}

/// Attach a binary denial label to every claim.
///
/// A claim with at least one denial record gets `1`, any other claim `0`.
/// Each denial record of a claim yields one labeled row.
pub fn build_claim_denial_dataset(
    tables: &RawTables,
    claim_id_column: &str,
    target_column: &str,
) -> Result<DataFrame, DataError> {
    require_column(&tables.denials, claim_id_column)?;
    let mut labels = tables.denials.select([claim_id_column])?;
    let denied = Series::new(target_column.into(), vec![1i32; labels.height()]);
    labels.with_column(denied)?;

    let df = left_join(&tables.claims, &labels, claim_id_column)?
        .lazy()
        .with_column(col(target_column).fill_null(lit(0)).cast(DataType::Int32))
        .collect()?;

    let (_, targets) = split_labels(&df, target_column)?;
    info!(
        "Labeled {} claims, {} denied",
        df.height(),
        targets.iter().filter(|&&t| t == 1).count()
    );
    Ok(df)
}

/// Enrich claims with patient, encounter and provider attributes
pub fn enrich_claims(df: DataFrame, tables: &RawTables) -> Result<DataFrame, DataError> {
    let df = left_join(&df, &tables.patients, "patient_id")?;
    let df = left_join(&df, &tables.encounters, "encounter_id")?;
    left_join(&df, &tables.providers, "provider_id")
}

/// Split the target column off a labeled frame.
///
/// Labels must be `0` or `1` (`0.0` / `1.0` are accepted); nulls are
/// rejected like any other value.
pub fn split_labels(df: &DataFrame, target_column: &str) -> Result<(DataFrame, Vec<u8>), DataError> {
    require_column(df, target_column)?;
    let raw = df.column(target_column)?;
    let numbers = raw.cast(&DataType::Float64)?;
    let text = raw.cast(&DataType::String)?;

    let labels = numbers
        .f64()?
        .into_iter()
        .zip(text.str()?)
        .enumerate()
        .map(|(row, (number, value))| match number {
            Some(v) if v == 0.0 => Ok(0),
            Some(v) if v == 1.0 => Ok(1),
            _ => Err(DataError::InvalidLabel {
                row,
                value: value.unwrap_or_default().to_string(),
            }),
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok((df.drop(target_column)?, labels))
}
