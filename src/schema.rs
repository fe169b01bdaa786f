/// Canonical inventory schema
///
/// The fixed set of columns the cleaner recognizes, in the order they are
/// emitted. Raw headers are matched exactly (after trimming) against
/// `FieldSpec::header`; `FieldSpec::id` is the machine identifier used by
/// the EOQ calculator.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    NumericCurrency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Header text as it appears in inventory exports
    pub header: &'static str,
    /// Canonical machine identifier
    pub id: &'static str,
    pub kind: FieldKind,
}

const fn text(header: &'static str, id: &'static str) -> FieldSpec {
    FieldSpec {
        header,
        id,
        kind: FieldKind::Text,
    }
}

const fn currency(header: &'static str, id: &'static str) -> FieldSpec {
    FieldSpec {
        header,
        id,
        kind: FieldKind::NumericCurrency,
    }
}

pub const ITEM: &str = "item";
pub const QTY_ON_HAND: &str = "qty_on_hand";
pub const ANNUAL_USAGE: &str = "annual_usage";
pub const UNIT_COST: &str = "unit_cost";

static INVENTORY_FIELDS: [FieldSpec; 19] = [
    text("Item", ITEM),
    text("Descript", "description"),
    text("Status Current", "status"),
    text("Replen Cls", "replen_class"),
    text("Special Inst", "special_instructions"),
    text("Std UOM", "std_uom"),
    text("End Use Code", "end_use_code"),
    currency("Qty On Hand", QTY_ON_HAND),
    currency("Qty Avail", "qty_available"),
    currency("Curr Year Usage", ANNUAL_USAGE),
    text("Manufacturer Name", "manufacturer_name"),
    text("Mfg ID", "mfg_id"),
    text("Mfg Itm ID", "mfg_item_id"),
    text("Vendor Name", "vendor_name"),
    text("Currency", "currency"),
    currency("Unit Cost", UNIT_COST),
    text("Code", "code"),
    text("Comm Code", "comm_code"),
    text("MSDS ID", "msds_id"),
];

/// Read-only, process-wide column schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSchema {
    fields: &'static [FieldSpec],
}

impl CanonicalSchema {
    /// Schema over an arbitrary static field list, emitted in the given order
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// The inventory export schema
    pub fn inventory() -> Self {
        Self::new(&INVENTORY_FIELDS)
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Exact, case-sensitive lookup of an already trimmed header label
    pub fn lookup_header(&self, label: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.header == label)
    }

    /// Lookup by canonical identifier
    pub fn field(&self, id: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::inventory()
    }
}

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("valid identifier pattern"));

/// Derive a display identifier from a header label
///
/// Lower-cases, collapses whitespace runs into a single underscore and drops
/// anything outside `[a-z0-9_]`. Used only for presentation; column matching
/// goes through [`CanonicalSchema::lookup_header`].
///
/// # Examples
///
/// ```
/// use inventory_eoq_service::schema::display_identifier;
///
/// assert_eq!(display_identifier("Qty On Hand"), "qty_on_hand");
/// assert_eq!(display_identifier("  Mfg Itm ID "), "mfg_itm_id");
/// assert_eq!(display_identifier("Unit Cost ($)"), "unit_cost_");
/// ```
pub fn display_identifier(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let underscored = WHITESPACE_RUN.replace_all(&lowered, "_");
    NON_IDENTIFIER.replace_all(&underscored, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_inventory_schema_has_all_export_headers() {
        let schema = CanonicalSchema::inventory();
        assert_eq!(schema.fields().len(), 19);
        assert_eq!(schema.fields()[0].header, "Item");
        assert_eq!(schema.fields()[18].header, "MSDS ID");
    }

    #[test]
    fn test_identifiers_are_unique() {
        let schema = CanonicalSchema::inventory();
        let ids: HashSet<_> = schema.fields().iter().map(|f| f.id).collect();
        let headers: HashSet<_> = schema.fields().iter().map(|f| f.header).collect();
        assert_eq!(ids.len(), schema.fields().len());
        assert_eq!(headers.len(), schema.fields().len());
    }

    #[test]
    fn test_numeric_currency_fields() {
        let schema = CanonicalSchema::inventory();
        let numeric: Vec<_> = schema
            .fields()
            .iter()
            .filter(|f| f.kind == FieldKind::NumericCurrency)
            .map(|f| f.header)
            .collect();
        assert_eq!(
            numeric,
            vec!["Qty On Hand", "Qty Avail", "Curr Year Usage", "Unit Cost"]
        );
    }

    #[test]
    fn test_lookup_header_is_exact() {
        let schema = CanonicalSchema::inventory();
        assert_eq!(schema.lookup_header("Unit Cost").map(|f| f.id), Some(UNIT_COST));
        assert!(schema.lookup_header("unit cost").is_none());
        assert!(schema.lookup_header("Unit  Cost").is_none());
        assert!(schema.lookup_header("Unit_Cost").is_none());
    }

    #[test]
    fn test_field_by_id() {
        let schema = CanonicalSchema::inventory();
        assert_eq!(schema.field(ANNUAL_USAGE).map(|f| f.header), Some("Curr Year Usage"));
        assert!(schema.field("Curr Year Usage").is_none());
    }

    #[test]
    fn test_display_identifier_collapses_whitespace() {
        assert_eq!(display_identifier("Status   Current"), "status_current");
        assert_eq!(display_identifier("Std\tUOM"), "std_uom");
    }

    #[test]
    fn test_display_identifier_strips_punctuation() {
        assert_eq!(display_identifier("MSDS-ID#"), "msdsid");
        assert_eq!(display_identifier("Qté"), "qt");
    }
}
