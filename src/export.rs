use thiserror::Error;
use tracing::debug;

use crate::normalizer::CleanedTable;

/// File name offered for the cleaned download
pub const CLEANED_EXPORT_FILENAME: &str = "cleaned_inventory.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No uploaded columns match the inventory schema; nothing to export")]
    NoColumns,

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the cleaned table as CSV with its original header text
///
/// Missing cells are written as empty fields. A table without columns is
/// rejected with [`ExportError::NoColumns`]: a header-less file could not be
/// imported again.
pub fn to_csv(table: &CleanedTable) -> Result<Vec<u8>, ExportError> {
    if table.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    debug!("Exported {} rows ({} bytes)", table.rows.len(), bytes.len());
    Ok(bytes)
}
