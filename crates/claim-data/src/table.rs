//! CSV IO and relational joins over polars data frames

use crate::DataError;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Cell values read as missing, matching the usual CSV null markers
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Rows scanned to infer column types
const INFER_SCHEMA_ROWS: usize = 10_000;

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

const LEFT_ROW: &str = "__left_row";
const RIGHT_ROW: &str = "__right_row";

/// Read a headed CSV file
pub fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    let bytes = fs::read(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = parse_csv(bytes)?;
    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Parse headed CSV held in memory. Column types are inferred and the NA
/// markers become nulls.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, DataError> {
    let null_values: Vec<PlSmallStr> = NA_VALUES.iter().map(|v| (*v).into()).collect();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .map_parse_options(|opts| opts.with_null_values(Some(NullValues::AllColumns(null_values.clone()))))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

/// Write a frame as headed CSV, creating parent directories. Nulls are
/// written as empty cells.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DataError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = File::create(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Fail with `MissingColumn` unless the frame has `name`
pub fn require_column(df: &DataFrame, name: &str) -> Result<(), DataError> {
    match df.get_column_index(name) {
        Some(_) => Ok(()),
        None => Err(DataError::MissingColumn(name.to_string())),
    }
}

/// Left join on a shared key column.
///
/// Every left row is kept in order; a left row matching several right
/// rows is repeated once per match, in right-table order. Unmatched rows
/// get null right cells and null keys never match. Keys are compared as
/// text. Non-key columns present on both sides are renamed with `_x`
/// (left) and `_y` (right).
pub fn left_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame, DataError> {
    require_column(left, key)?;
    require_column(right, key)?;

    let collisions: Vec<String> = left
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != key && right.get_column_index(name.as_str()).is_some())
        .map(|name| name.to_string())
        .collect();

    let left_rows = left.with_row_index(LEFT_ROW.into(), None)?;
    let right_rows = right.with_row_index(RIGHT_ROW.into(), None)?;

    let mut joined = left_rows
        .lazy()
        .with_column(col(key).cast(DataType::String))
        .join(
            right_rows.lazy().with_column(col(key).cast(DataType::String)),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Left).with_suffix(Some(RIGHT_SUFFIX.into())),
        )
        .sort_by_exprs([col(LEFT_ROW), col(RIGHT_ROW)], SortMultipleOptions::default())
        .collect()?
        .drop(LEFT_ROW)?
        .drop(RIGHT_ROW)?;

    for name in &collisions {
        joined.rename(name, format!("{}{}", name, LEFT_SUFFIX).into())?;
    }

    debug!(
        "Left join on {}: {} left rows -> {} rows",
        key,
        left.height(),
        joined.height()
    );
    Ok(joined)
}
