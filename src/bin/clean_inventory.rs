use clap::Parser;
use inventory_eoq_service::eoq::{EoqParams, DEFAULT_HOLDING_RATE_PCT, DEFAULT_ORDERING_COST};
use inventory_eoq_service::export::{self, ExportError, CLEANED_EXPORT_FILENAME};
use inventory_eoq_service::importers::ImportLimits;
use inventory_eoq_service::services::InventoryService;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "clean-inventory")]
#[command(about = "Clean an inventory export (.xlsx/.csv) and preview Economic Order Quantities", long_about = None)]
struct Cli {
    /// Path to the inventory export (.xlsx or .csv)
    #[arg(long)]
    file: PathBuf,

    /// Cost of placing one order
    #[arg(long, default_value_t = DEFAULT_ORDERING_COST)]
    ordering_cost: f64,

    /// Annual holding cost as a percentage of unit cost (0-100)
    #[arg(long, default_value_t = DEFAULT_HOLDING_RATE_PCT)]
    holding_rate: f64,

    /// Directory to write cleaned_inventory.csv into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Maximum number of data rows accepted
    #[arg(long, env = "MAX_UPLOAD_ROWS", default_value = "100000")]
    max_rows: usize,

    /// Maximum number of columns accepted
    #[arg(long, env = "MAX_UPLOAD_COLUMNS", default_value = "256")]
    max_columns: usize,
}

/// Render rows as a left-aligned text table
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format_row(headers);
    out.push('\n');
    out.push_str(&"=".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row));
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let filename = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("--file must name a file")?
        .to_string();
    let bytes = fs::read(&cli.file)?;

    let service = InventoryService::new(ImportLimits {
        max_rows: cli.max_rows,
        max_columns: cli.max_columns,
    });
    let params = EoqParams {
        ordering_cost: cli.ordering_cost,
        holding_rate_pct: cli.holding_rate,
    };
    let report = service.process(&filename, &bytes, &params)?;

    println!("Original columns:");
    for (i, column) in report.original_columns.iter().enumerate() {
        println!("  {i}: {column}");
    }
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    match export::to_csv(&report.cleaned) {
        Ok(csv) => {
            fs::create_dir_all(&cli.output_dir)?;
            let output_path = cli.output_dir.join(CLEANED_EXPORT_FILENAME);
            fs::write(&output_path, csv)?;
            info!(
                "Wrote {} cleaned rows to {}",
                report.cleaned.rows.len(),
                output_path.display()
            );
        }
        Err(ExportError::NoColumns) => {
            warn!("Nothing to export from {}", filename);
            println!("Warning: {}", ExportError::NoColumns);
        }
        Err(e) => return Err(e.into()),
    }

    println!();
    match &report.eoq {
        Ok(eoq) => {
            println!(
                "EOQ preview (ordering cost {}, holding rate {}%):",
                params.ordering_cost, params.holding_rate_pct
            );
            println!("{}", render_table(&eoq.preview.headers, &eoq.preview.rows));
        }
        Err(e) => {
            // The cleaned file is still written; only the EOQ stage is unavailable
            error!("EOQ not computed: {}", e);
            println!("EOQ not computed: {e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let headers = vec!["Item".to_string(), "EOQ".to_string()];
        let rows = vec![
            vec!["A1".to_string(), "447.21".to_string()],
            vec!["LONGITEM".to_string(), "undefined".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines[0], "Item      EOQ");
        assert_eq!(lines[2], "A1        447.21");
        assert_eq!(lines[3], "LONGITEM  undefined");
    }
}
