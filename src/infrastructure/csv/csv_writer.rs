//! Serializes header-keyed rows in a fixed column order.

use csv::WriterBuilder;
use std::io::Write;

use crate::domain::error::{AppError, Result};
use crate::domain::record::FieldMap;

/// Writes `records` in `columns` order. Missing cells are written empty and
/// unknown keys are dropped.
pub fn write_rows<W: Write>(
    out: W,
    columns: &[&str],
    records: &[FieldMap],
    with_header: bool,
) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);

    if with_header {
        writer.write_record(columns)?;
    }
    for record in records {
        let row = columns
            .iter()
            .map(|column| record.get(*column).map(String::as_str).unwrap_or(""));
        writer.write_record(row)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::IoError(format!("Failed to flush CSV output: {}", e)))
}

pub fn render_table(columns: &[&str], records: &[FieldMap]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, columns, records, true)?;
    Ok(buffer)
}
