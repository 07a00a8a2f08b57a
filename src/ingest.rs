//! Batch data ingestion
//!
//! Loads label records from a CSV file and validates the required columns
//! up front, so a malformed batch is rejected before any rendering starts.

use std::path::Path;
use tracing::info;

use crate::error::{LabelError, Result, ResultExt};
use crate::fields::LabelRecord;

/// Columns every DoD label row must provide
pub const DOD_REQUIRED_COLUMNS: [&str; 5] = [
    "product_description",
    "nato_stock_no",
    "niin",
    "batch_lot_no",
    "date_of_manufacture",
];

/// Columns every drum label row must provide
pub const DRUM_REQUIRED_COLUMNS: [&str; 4] = [
    "product_name",
    "product_code",
    "batch_number",
    "manufacture_date",
];

/// Check that every required column is present in the header row
pub fn validate_columns(headers: &[String], required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == **col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LabelError::MissingColumns { columns: missing }.into())
    }
}

/// Load all rows from a CSV file after validating the required columns
pub fn load_records<P: AsRef<Path>>(path: P, required: &[&str]) -> Result<Vec<LabelRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_path_context("read", path)?;

    let headers: Vec<String> = reader
        .headers()
        .with_path_context("parse headers of", path)?
        .iter()
        .map(str::to_string)
        .collect();
    validate_columns(&headers, required)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_path_context("parse row of", path)?;
        let mut record = LabelRecord::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            record.set(header, value);
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(LabelError::EmptyInput.into());
    }
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
