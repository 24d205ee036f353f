//! Claim Data
//!
//! Raw claim records, CSV IO and joins over polars data frames, and
//! assembly of the labeled claim denial dataset.

mod batch;
mod dataset;
mod record;
mod table;

pub use batch::ClaimBatch;
pub use dataset::{
    build_claim_denial_dataset, enrich_claims, split_labels, RawTables, BASE_DATASET_FILE,
};
pub use record::{ClaimRecord, RawColumn};
pub use table::{left_join, parse_csv, read_csv, require_column, write_csv};

pub use polars::prelude::DataFrame;

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading, joining or parsing claim tables
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Frame error: {0}")]
    Frame(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: column {column} has non-numeric value {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Row {row}: invalid label {value:?}, expected 0 or 1")]
    InvalidLabel { row: usize, value: String },
}
