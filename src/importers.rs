// ! Upload importers for delimited-text and Excel inventory exports

pub mod csv_importer;
pub mod excel_importer;

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::table::RawTable;

// Re-export commonly used items
pub use csv_importer::CsvImporter;
pub use excel_importer::ExcelImporter;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file type for {filename:?}; accepted types: .xlsx, .csv")]
    UnsupportedFileType { filename: String },

    #[error("File is empty or has no header row")]
    EmptyFile,

    #[error("Table too large: {rows} rows x {columns} columns exceeds limit of {max_rows} rows x {max_columns} columns")]
    TableTooLarge {
        rows: usize,
        columns: usize,
        max_rows: usize,
        max_columns: usize,
    },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook has no worksheets")]
    NoWorksheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    /// Detect the upload format from the file name's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(FileKind::Csv),
            Some("xlsx") => Ok(FileKind::Xlsx),
            _ => Err(ImportError::UnsupportedFileType {
                filename: filename.to_string(),
            }),
        }
    }
}

/// Upper bounds checked before normalization starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub max_rows: usize,
    pub max_columns: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_rows: 100_000,
            max_columns: 256,
        }
    }
}

impl ImportLimits {
    pub fn check(&self, rows: usize, columns: usize) -> Result<(), ImportError> {
        if rows > self.max_rows || columns > self.max_columns {
            warn!(
                "Rejecting {}x{} table (limit {}x{})",
                rows, columns, self.max_rows, self.max_columns
            );
            return Err(ImportError::TableTooLarge {
                rows,
                columns,
                max_rows: self.max_rows,
                max_columns: self.max_columns,
            });
        }
        Ok(())
    }
}

/// Read an uploaded file into a [`RawTable`], dispatching on its extension
pub fn read_table(
    filename: &str,
    bytes: &[u8],
    limits: &ImportLimits,
) -> Result<RawTable, ImportError> {
    let kind = FileKind::from_filename(filename)?;
    info!("Reading {:?} upload {} ({} bytes)", kind, filename, bytes.len());

    match kind {
        FileKind::Csv => CsvImporter::new(*limits).parse(bytes),
        FileKind::Xlsx => ExcelImporter::new(*limits).parse(bytes),
    }
}
