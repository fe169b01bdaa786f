use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::eoq::{compute_eoq, EoqError, EoqParams, EoqPreview, EoqResult};
use crate::export::{self, ExportError};
use crate::importers::{read_table, ImportError, ImportLimits};
use crate::normalizer::{normalize, CleanedTable, HeaderLookup, Normalized};
use crate::schema::CanonicalSchema;

/// EOQ stage output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EoqOutput {
    pub preview: EoqPreview,
    pub results: Vec<EoqResult>,
}

/// Result of one full pipeline run over an upload
///
/// `eoq` fails independently of cleaning: a missing usage or cost column
/// leaves `cleaned` fully usable.
#[derive(Debug, Clone)]
pub struct InventoryReport {
    pub filename: String,
    /// Header row exactly as uploaded
    pub original_columns: Vec<String>,
    pub cleaned: CleanedTable,
    pub header_lookup: HeaderLookup,
    pub warnings: Vec<String>,
    pub eoq: Result<EoqOutput, EoqError>,
}

/// Stateless upload pipeline: import -> normalize -> EOQ
///
/// Every call recomputes from the supplied bytes and parameters.
#[derive(Debug, Clone, Default)]
pub struct InventoryService {
    limits: ImportLimits,
    schema: CanonicalSchema,
}

impl InventoryService {
    pub fn new(limits: ImportLimits) -> Self {
        Self {
            limits,
            schema: CanonicalSchema::inventory(),
        }
    }

    pub fn limits(&self) -> &ImportLimits {
        &self.limits
    }

    /// Import and normalize an upload without running the EOQ stage
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn clean(&self, filename: &str, bytes: &[u8]) -> Result<(Vec<String>, Normalized), ImportError> {
        let raw = read_table(filename, bytes, &self.limits)?;
        let original_columns = raw.headers.clone();

        let mut normalized = normalize(&raw, &self.schema);
        if normalized.normalized.columns().is_empty() {
            warn!("{} has no columns in common with the inventory schema", filename);
            normalized
                .warnings
                .push("No uploaded columns match the inventory schema".to_string());
        }

        Ok((original_columns, normalized))
    }

    /// Run the full pipeline
    ///
    /// Only boundary problems (file type, size, unreadable content) are
    /// errors here; EOQ problems are carried in [`InventoryReport::eoq`].
    #[instrument(skip(self, bytes, params), fields(size = bytes.len()))]
    pub fn process(
        &self,
        filename: &str,
        bytes: &[u8],
        params: &EoqParams,
    ) -> Result<InventoryReport, ImportError> {
        let start_time = Instant::now();
        let (original_columns, normalized) = self.clean(filename, bytes)?;
        let Normalized {
            cleaned,
            normalized,
            header_lookup,
            warnings,
        } = normalized;

        let eoq = compute_eoq(&normalized, params).map(|results| EoqOutput {
            preview: EoqPreview::build(&results, &header_lookup),
            results,
        });
        if let Err(e) = &eoq {
            warn!("EOQ stage failed for {}: {}", filename, e);
        }

        info!(
            "Processed {} in {:.2}ms: {} cleaned rows, EOQ {}",
            filename,
            start_time.elapsed().as_secs_f64() * 1000.0,
            cleaned.rows.len(),
            if eoq.is_ok() { "computed" } else { "unavailable" }
        );

        Ok(InventoryReport {
            filename: filename.to_string(),
            original_columns,
            cleaned,
            header_lookup,
            warnings,
            eoq,
        })
    }

    /// Clean an upload and render it as the downloadable CSV
    pub fn export_cleaned(&self, filename: &str, bytes: &[u8]) -> Result<Vec<u8>, ServiceError> {
        let (_, normalized) = self.clean(filename, bytes)?;
        Ok(export::to_csv(&normalized.cleaned)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
