/// Schema normalization for uploaded inventory tables
///
/// Reconciles an arbitrary header row with the [`CanonicalSchema`], coerces
/// currency/quantity columns to numbers and prunes rows with no data. The
/// result is a display-oriented [`CleanedTable`] (original header text) and
/// a computation-oriented [`NormalizedTable`] (canonical identifiers).
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use crate::schema::{display_identifier, CanonicalSchema, FieldKind, FieldSpec};
use crate::table::{CellValue, RawTable};

/// A retained column as presented to a human
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedColumn {
    /// Original header text, trimmed
    pub header: String,
    /// Header-derived identifier for display purposes
    pub display_id: String,
    /// Canonical identifier the column was matched to
    pub field_id: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedTable {
    pub columns: Vec<CleanedColumn>,
    pub rows: Vec<Vec<CellValue>>,
}

impl CleanedTable {
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// View the cleaned table as if it had been uploaded
    pub fn to_raw_table(&self) -> RawTable {
        RawTable {
            headers: self.columns.iter().map(|c| c.header.clone()).collect(),
            rows: self.rows.clone(),
        }
    }
}

/// Type-coerced table keyed by canonical identifiers
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    schema: CanonicalSchema,
    columns: Vec<&'static FieldSpec>,
    rows: Vec<Vec<CellValue>>,
}

impl NormalizedTable {
    /// Schema the table was normalized against
    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    pub fn columns(&self) -> &[&'static FieldSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.column_index(id).is_some()
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|f| f.id == id)
    }

    /// Values of one column in row order, or `None` if the column was not retained
    pub fn column(&self, id: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(id)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

/// Canonical identifier -> original header text, for re-labeling results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderLookup {
    schema: CanonicalSchema,
    headers: HashMap<&'static str, String>,
}

impl HeaderLookup {
    pub fn original_header(&self, field_id: &str) -> Option<&str> {
        self.headers.get(field_id).map(String::as_str)
    }

    /// Original header if the column was uploaded, otherwise the schema's header
    pub fn label_for(&self, field: &FieldSpec) -> String {
        self.original_header(field.id)
            .unwrap_or(field.header)
            .to_string()
    }

    /// Like [`HeaderLookup::label_for`], by canonical identifier; unknown ids label themselves
    pub fn label(&self, field_id: &str) -> String {
        match self.schema.field(field_id) {
            Some(field) => self.label_for(field),
            None => field_id.to_string(),
        }
    }
}

/// Everything produced by one normalization pass
#[derive(Debug, Clone)]
pub struct Normalized {
    pub cleaned: CleanedTable,
    pub normalized: NormalizedTable,
    pub header_lookup: HeaderLookup,
    /// Non-fatal notes, e.g. duplicate headers that were dropped
    pub warnings: Vec<String>,
}

/// Coerce a raw cell to a number, stripping `,` and `$` first
///
/// Never fails: anything that does not parse to a finite number becomes
/// [`CellValue::Missing`].
///
/// # Examples
///
/// ```
/// use inventory_eoq_service::normalizer::coerce_currency;
/// use inventory_eoq_service::table::CellValue;
///
/// assert_eq!(coerce_currency(&CellValue::from_text("$1,234.50")), CellValue::Number(1234.5));
/// assert_eq!(coerce_currency(&CellValue::from_text("N/A")), CellValue::Missing);
/// ```
pub fn coerce_currency(value: &CellValue) -> CellValue {
    match value {
        CellValue::Number(n) if n.is_finite() => CellValue::Number(*n),
        CellValue::Number(_) | CellValue::Missing => CellValue::Missing,
        CellValue::Text(s) => {
            let stripped: String = s.chars().filter(|c| *c != ',' && *c != '$').collect();
            match stripped.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::Missing,
            }
        }
    }
}

/// Coerce a raw cell to text; numbers keep their shortest textual form
pub fn coerce_text(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => CellValue::from_text(s.as_str()),
        CellValue::Number(n) if n.is_finite() => CellValue::Text(n.to_string()),
        CellValue::Number(_) | CellValue::Missing => CellValue::Missing,
    }
}

fn coerce(kind: FieldKind, value: &CellValue) -> CellValue {
    match kind {
        FieldKind::Text => coerce_text(value),
        FieldKind::NumericCurrency => coerce_currency(value),
    }
}

/// Normalize an uploaded table against the schema
///
/// Columns outside the schema are dropped silently. A table with no schema
/// columns at all yields empty outputs rather than an error; callers decide
/// how to report that.
#[instrument(skip_all, fields(rows = raw.row_count(), columns = raw.column_count()))]
pub fn normalize(raw: &RawTable, schema: &CanonicalSchema) -> Normalized {
    let mut warnings = Vec::new();
    let mut matched: HashMap<&'static str, (usize, String)> = HashMap::new();

    for (idx, label) in raw.headers.iter().enumerate() {
        let trimmed = label.trim();
        let Some(field) = schema.lookup_header(trimmed) else {
            debug!("Dropping column {:?}: not in schema", trimmed);
            continue;
        };

        if matched.contains_key(field.id) {
            warn!("Duplicate column {:?} at position {}, keeping first", trimmed, idx);
            warnings.push(format!(
                "Duplicate column \"{trimmed}\" at position {}; only the first occurrence was kept",
                idx + 1
            ));
            continue;
        }
        matched.insert(field.id, (idx, trimmed.to_string()));
    }

    // Retained columns follow schema order, not upload order
    let selected: Vec<(&'static FieldSpec, usize, String)> = schema
        .fields()
        .iter()
        .filter_map(|field| {
            matched
                .get(field.id)
                .map(|(idx, header)| (field, *idx, header.clone()))
        })
        .collect();

    if selected.is_empty() {
        warn!("Uploaded table shares no columns with the inventory schema");
    }

    let rows: Vec<Vec<CellValue>> = raw
        .rows
        .iter()
        .map(|row| {
            selected
                .iter()
                .map(|(field, idx, _)| {
                    let value = row.get(*idx).unwrap_or(&CellValue::Missing);
                    coerce(field.kind, value)
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|v| !v.is_missing()))
        .collect();

    info!(
        "Normalized {} of {} rows across {} schema columns",
        rows.len(),
        raw.row_count(),
        selected.len()
    );

    let cleaned = CleanedTable {
        columns: selected
            .iter()
            .map(|(field, _, header)| CleanedColumn {
                header: header.clone(),
                display_id: display_identifier(header),
                field_id: field.id,
            })
            .collect(),
        rows: rows.clone(),
    };

    let header_lookup = HeaderLookup {
        schema: *schema,
        headers: selected
            .iter()
            .map(|(field, _, header)| (field.id, header.clone()))
            .collect(),
    };

    let normalized = NormalizedTable {
        schema: *schema,
        columns: selected.iter().map(|(field, _, _)| *field).collect(),
        rows,
    };

    Normalized {
        cleaned,
        normalized,
        header_lookup,
        warnings,
    }
}
