/// Economic Order Quantity calculation
///
/// `EOQ = sqrt(2 * D * S / H)` where `D` is annual demand (`annual_usage`),
/// `S` the cost of placing one order and `H = unit_cost * holding_rate`.
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::normalizer::{HeaderLookup, NormalizedTable};
use crate::schema::{ANNUAL_USAGE, ITEM, QTY_ON_HAND, UNIT_COST};
use crate::table::CellValue;

pub const DEFAULT_ORDERING_COST: f64 = 100.0;
pub const DEFAULT_HOLDING_RATE_PCT: f64 = 20.0;

/// Label of the computed column in previews
pub const EOQ_LABEL: &str = "EOQ";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EoqError {
    #[error("Missing required column(s) for EOQ: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Invalid parameter {name}: {msg}")]
    InvalidParameter { name: &'static str, msg: String },
}

/// User-tunable cost parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EoqParams {
    /// Cost of placing a single order
    pub ordering_cost: f64,
    /// Annual holding cost as a percentage of unit cost, 0-100
    pub holding_rate_pct: f64,
}

impl Default for EoqParams {
    fn default() -> Self {
        Self {
            ordering_cost: DEFAULT_ORDERING_COST,
            holding_rate_pct: DEFAULT_HOLDING_RATE_PCT,
        }
    }
}

impl EoqParams {
    pub fn new(ordering_cost: f64, holding_rate_pct: f64) -> Result<Self, EoqError> {
        let params = Self {
            ordering_cost,
            holding_rate_pct,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), EoqError> {
        if !self.ordering_cost.is_finite() || self.ordering_cost < 0.0 {
            return Err(EoqError::InvalidParameter {
                name: "ordering_cost",
                msg: format!("must be a non-negative number, got {}", self.ordering_cost),
            });
        }
        if !self.holding_rate_pct.is_finite() || !(0.0..=100.0).contains(&self.holding_rate_pct) {
            return Err(EoqError::InvalidParameter {
                name: "holding_rate",
                msg: format!("must be between 0 and 100, got {}", self.holding_rate_pct),
            });
        }
        Ok(())
    }

    /// Holding rate as a decimal fraction
    pub fn holding_rate(&self) -> f64 {
        self.holding_rate_pct / 100.0
    }
}

/// Per-row EOQ outcome
///
/// Serializes as a number, the string `"undefined"`, or `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EoqValue {
    Value(f64),
    /// Formula has no real, finite answer (zero holding cost, negative demand)
    Undefined,
    /// An input was missing
    Missing,
}

impl EoqValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            EoqValue::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Text for tabular display: two decimals, `undefined`, or empty
    pub fn render(&self) -> String {
        match self {
            EoqValue::Value(v) => format!("{v:.2}"),
            EoqValue::Undefined => "undefined".to_string(),
            EoqValue::Missing => String::new(),
        }
    }
}

impl Serialize for EoqValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EoqValue::Value(v) => serializer.serialize_f64(*v),
            EoqValue::Undefined => serializer.serialize_str("undefined"),
            EoqValue::Missing => serializer.serialize_none(),
        }
    }
}

/// One computed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EoqResult {
    pub item: CellValue,
    pub qty_on_hand: CellValue,
    pub annual_demand: Option<f64>,
    pub holding_cost: Option<f64>,
    #[serde(rename = "EOQ")]
    pub eoq: EoqValue,
}

/// Apply the formula to a single row's inputs
///
/// ```
/// use inventory_eoq_service::eoq::{economic_order_quantity, EoqValue};
///
/// let eoq = economic_order_quantity(Some(500.0), Some(0.5), 100.0);
/// assert!((eoq.value().unwrap() - 447.2136).abs() < 1e-3);
/// assert_eq!(economic_order_quantity(Some(500.0), Some(0.0), 100.0), EoqValue::Undefined);
/// ```
pub fn economic_order_quantity(
    annual_demand: Option<f64>,
    holding_cost: Option<f64>,
    ordering_cost: f64,
) -> EoqValue {
    let (Some(demand), Some(holding)) = (annual_demand, holding_cost) else {
        return EoqValue::Missing;
    };
    if demand < 0.0 || holding <= 0.0 {
        return EoqValue::Undefined;
    }

    let eoq = ((2.0 * demand * ordering_cost) / holding).sqrt();
    if eoq.is_finite() {
        EoqValue::Value(eoq)
    } else {
        EoqValue::Undefined
    }
}

/// Compute EOQ for every row of a normalized table
///
/// Fails only when `annual_usage` or `unit_cost` were not uploaded at all,
/// or the parameters are out of range. Bad individual rows produce
/// [`EoqValue::Missing`] / [`EoqValue::Undefined`] instead.
#[instrument(skip(table), fields(rows = table.row_count()))]
pub fn compute_eoq(table: &NormalizedTable, params: &EoqParams) -> Result<Vec<EoqResult>, EoqError> {
    params.validate()?;

    let schema = table.schema();
    let missing: Vec<&'static str> = [ANNUAL_USAGE, UNIT_COST]
        .into_iter()
        .filter(|id| !table.has_column(id))
        .map(|id| schema.field(id).map_or(id, |f| f.header))
        .collect();
    if !missing.is_empty() {
        warn!("Cannot compute EOQ, missing columns: {:?}", missing);
        return Err(EoqError::MissingColumns(missing));
    }

    let usage_idx = table.column_index(ANNUAL_USAGE);
    let cost_idx = table.column_index(UNIT_COST);
    let item_idx = table.column_index(ITEM);
    let qty_idx = table.column_index(QTY_ON_HAND);
    let rate = params.holding_rate();

    let cell = |row: &[CellValue], idx: Option<usize>| -> CellValue {
        idx.and_then(|i| row.get(i).cloned())
            .unwrap_or(CellValue::Missing)
    };

    let results: Vec<EoqResult> = table
        .rows()
        .iter()
        .map(|row| {
            let annual_demand = cell(row, usage_idx).as_number();
            let holding_cost = cell(row, cost_idx).as_number().map(|cost| cost * rate);
            EoqResult {
                item: cell(row, item_idx),
                qty_on_hand: cell(row, qty_idx),
                annual_demand,
                holding_cost,
                eoq: economic_order_quantity(annual_demand, holding_cost, params.ordering_cost),
            }
        })
        .collect();

    let computed = results.iter().filter(|r| r.eoq.value().is_some()).count();
    debug!(
        "EOQ computed for {} rows, {} undefined or missing",
        computed,
        results.len() - computed
    );
    info!(
        "Computed EOQ for {} rows (ordering cost {}, holding rate {}%)",
        results.len(),
        params.ordering_cost,
        params.holding_rate_pct
    );

    Ok(results)
}

/// EOQ results labeled for display with the uploaded header text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EoqPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl EoqPreview {
    pub fn build(results: &[EoqResult], lookup: &HeaderLookup) -> Self {
        Self {
            headers: vec![
                lookup.label(ITEM),
                lookup.label(QTY_ON_HAND),
                EOQ_LABEL.to_string(),
            ],
            rows: results
                .iter()
                .map(|r| vec![r.item.to_string(), r.qty_on_hand.to_string(), r.eoq.render()])
                .collect(),
        }
    }
}
