use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;
use tracing::{debug, info, warn};

use super::{ImportError, ImportLimits};
use crate::table::{CellValue, RawTable};

/// Parser for inventory exports saved as .xlsx workbooks
pub struct ExcelImporter {
    limits: ImportLimits,
}

impl ExcelImporter {
    pub fn new(limits: ImportLimits) -> Self {
        Self { limits }
    }

    /// Parse the first worksheet of an in-memory workbook
    ///
    /// # Expected Sheet Structure:
    /// ```text
    /// Row 1: Column headers ("Item", "Descript", "Qty On Hand", ...)
    /// Row 2+: One inventory item per row
    /// ```
    ///
    /// This is synchronous; async callers should use spawn_blocking.
    pub fn parse(&self, bytes: &[u8]) -> Result<RawTable, ImportError> {
        let mut workbook: Xlsx<Cursor<&[u8]>> = match open_workbook_from_rs(Cursor::new(bytes)) {
            Ok(wb) => wb,
            Err(e) => return Err(ImportError::WorkbookOpen(e.to_string())),
        };

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::NoWorksheet)?;
        debug!("Using worksheet {:?}", sheet_name);

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::WorkbookOpen(e.to_string()))?;

        self.parse_range(&range)
    }

    /// Convert a worksheet range into a raw table, first row as headers
    pub fn parse_range(&self, range: &Range<Data>) -> Result<RawTable, ImportError> {
        let (height, width) = range.get_size();
        if height == 0 {
            return Err(ImportError::EmptyFile);
        }
        self.limits.check(height - 1, width)?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(header_text).collect(),
            None => return Err(ImportError::EmptyFile),
        };

        let mut table = RawTable::new(headers);
        for row in rows {
            table.push_row(row.iter().map(cell_value).collect());
        }

        info!(
            "Parsed worksheet with {} columns and {} data rows",
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map a worksheet cell to a raw cell value
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::String(s) => CellValue::from_text(s.as_str()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) => CellValue::Text(cell.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s.as_str()),
        Data::Error(e) => {
            warn!("Worksheet cell error {:?}, treating as missing", e);
            CellValue::Missing
        }
        Data::Empty => CellValue::Missing,
    }
}
