//! Ingestion and validation of uploaded sales tables.
//!
//! The upload contract is a comma separated file with a header row that names
//! at least a `Date` and a `Sales` column. Only the presence of those columns
//! is validated here; bad values travel downstream untouched.

use polars::prelude::*;
use std::io::Cursor;
use tracing::{debug, instrument, warn};

use crate::error::{ComputeError, Result};

/// Header of the date column in uploaded files.
pub const DATE_COLUMN: &str = "Date";
/// Header of the sales column in uploaded files.
pub const SALES_COLUMN: &str = "Sales";

/// One uploaded row, as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Free-form date string, `None` when the cell is empty.
    pub date: Option<String>,
    /// Numeric sales value, `None` when the cell is empty or not a number.
    pub sales: Option<f64>,
}

/// Reads the uploaded CSV bytes into a DataFrame with every column as text.
///
/// Reading everything as strings keeps type inference from rejecting a file
/// because of one odd cell; conversion happens in [`read_records`].
pub fn read_table(bytes: &[u8]) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| ComputeError::MalformedUpload(e.to_string()))
}

/// Fails with a schema error naming every required column that is absent.
pub fn validate_columns(df: &DataFrame) -> Result<()> {
    let missing: Vec<String> = [DATE_COLUMN, SALES_COLUMN]
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        warn!(?missing, "Upload is missing required columns");
        Err(ComputeError::Schema { missing })
    }
}

/// Parses and validates an upload, returning its rows in upload order.
#[instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn read_records(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let df = read_table(bytes)?;
    validate_columns(&df)?;

    let dates = df
        .column(DATE_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let sales = df
        .column(SALES_COLUMN)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let records: Vec<RawRecord> = dates
        .str()?
        .into_iter()
        .zip(sales.f64()?.into_iter())
        .map(|(date, sales)| RawRecord {
            date: date.map(str::to_string),
            sales,
        })
        .collect();

    debug!("Read {} records from upload", records.len());
    Ok(records)
}
