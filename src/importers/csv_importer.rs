use std::borrow::Cow;
use tracing::{debug, info};

use super::{ImportError, ImportLimits};
use crate::table::{CellValue, RawTable};

const UTF8_BOM: char = '\u{feff}';

/// Parser for comma-delimited inventory exports
///
/// Exports are frequently not UTF-8 clean; input that is not valid UTF-8 is
/// decoded as Latin-1 instead of being rejected.
pub struct CsvImporter {
    limits: ImportLimits,
}

impl CsvImporter {
    pub fn new(limits: ImportLimits) -> Self {
        Self { limits }
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<RawTable, ImportError> {
        let decoded = decode_text(bytes);
        let text = decoded.strip_prefix(UTF8_BOM).unwrap_or(decoded.as_ref());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        self.limits.check(0, headers.len())?;

        let mut table = RawTable::new(headers);
        for result in reader.records() {
            let record = result?;
            // Fail fast instead of buffering an oversized upload
            self.limits.check(table.row_count() + 1, table.column_count())?;
            table.push_row(record.iter().map(CellValue::from_text).collect());
        }

        info!(
            "Parsed CSV with {} columns and {} data rows",
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

/// Decode bytes as UTF-8, falling back to Latin-1 (ISO-8859-1)
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback never fails.
///
/// ```
/// use inventory_eoq_service::importers::csv_importer::decode_text;
///
/// assert_eq!(decode_text(b"Caf\xe9"), "Café");
/// assert_eq!(decode_text("Café".as_bytes()), "Café");
/// ```
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(e) => {
            debug!("Input is not valid UTF-8 ({}), decoding as Latin-1", e);
            Cow::Owned(bytes.iter().map(|&b| b as char).collect())
        }
    }
}
