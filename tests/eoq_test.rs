// EOQ calculator tests: formula, per-row edge cases and configuration errors

mod common;

use inventory_eoq_service::eoq::{
    compute_eoq, EoqError, EoqParams, EoqPreview, EoqResult, EoqValue,
};
use inventory_eoq_service::normalizer::normalize;
use inventory_eoq_service::schema::CanonicalSchema;
use inventory_eoq_service::table::CellValue;

fn results_for(
    headers: &[&str],
    rows: &[&[&str]],
    params: EoqParams,
) -> Result<Vec<EoqResult>, EoqError> {
    let raw = common::raw_table(headers, rows);
    let out = normalize(&raw, &CanonicalSchema::inventory());
    compute_eoq(&out.normalized, &params)
}

#[test]
fn test_reference_scenario() {
    let results = results_for(
        &["Item", "Qty On Hand", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "1,200", "$2.50", "500"]],
        EoqParams::new(100.0, 20.0).unwrap(),
    )
    .unwrap();

    let row = &results[0];
    assert_eq!(row.item, CellValue::from_text("A1"));
    assert_eq!(row.qty_on_hand, CellValue::Number(1200.0));
    assert_eq!(row.annual_demand, Some(500.0));
    assert!((row.holding_cost.unwrap() - 0.5).abs() < 1e-12);
    let eoq = row.eoq.value().unwrap();
    assert!((eoq - 200_000f64.sqrt()).abs() < 1e-9);
    assert_eq!(format!("{eoq:.2}"), "447.21");
}

#[test]
fn test_unparseable_unit_cost_only_affects_its_row() {
    let results = results_for(
        &["Item", "Unit Cost", "Curr Year Usage"],
        &[
            &["A1", "$2.50", "500"],
            &["A2", "N/A", "500"],
            &["A3", "$10", "50"],
        ],
        EoqParams::default(),
    )
    .unwrap();

    assert!(results[0].eoq.value().is_some());
    assert_eq!(results[1].holding_cost, None);
    assert_eq!(results[1].eoq, EoqValue::Missing);
    // sqrt(2 * 50 * 100 / 2) = 70.71
    assert!((results[2].eoq.value().unwrap() - 5000f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_zero_holding_cost_is_undefined_not_infinite() {
    let zero_cost = results_for(
        &["Item", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "$0.00", "500"]],
        EoqParams::default(),
    )
    .unwrap();
    assert_eq!(zero_cost[0].holding_cost, Some(0.0));
    assert_eq!(zero_cost[0].eoq, EoqValue::Undefined);

    let zero_rate = results_for(
        &["Item", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "$2.50", "500"]],
        EoqParams::new(100.0, 0.0).unwrap(),
    )
    .unwrap();
    assert_eq!(zero_rate[0].eoq, EoqValue::Undefined);
    assert_eq!(zero_rate[0].eoq.render(), "undefined");
}

#[test]
fn test_negative_or_missing_demand() {
    let results = results_for(
        &["Item", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "$2.50", "-25"], &["A2", "$2.50", ""], &["A3", "$2.50", "n/a"]],
        EoqParams::default(),
    )
    .unwrap();

    assert_eq!(results[0].annual_demand, Some(-25.0));
    assert_eq!(results[0].eoq, EoqValue::Undefined);
    assert_eq!(results[1].eoq, EoqValue::Missing);
    assert_eq!(results[2].eoq, EoqValue::Missing);
}

#[test]
fn test_eoq_never_negative_for_positive_inputs() {
    let demands = [1.0, 12.0, 500.0, 1e6];
    let costs = [0.01, 2.5, 1000.0];
    let rates = [1.0, 20.0, 100.0];

    for demand in demands {
        for cost in costs {
            for rate in rates {
                let params = EoqParams::new(75.0, rate).unwrap();
                let demand_text = demand.to_string();
                let cost_text = cost.to_string();
                let results = results_for(
                    &["Unit Cost", "Curr Year Usage"],
                    &[&[cost_text.as_str(), demand_text.as_str()]],
                    params,
                )
                .unwrap();
                let eoq = results[0].eoq.value().expect("EOQ should be defined");
                assert!(eoq.is_finite() && eoq > 0.0, "demand={demand} cost={cost} rate={rate}");
            }
        }
    }
}

#[test]
fn test_missing_usage_column_is_configuration_error() {
    let err = results_for(
        &["Item", "Qty On Hand", "Unit Cost"],
        &[&["A1", "1", "$2.50"]],
        EoqParams::default(),
    )
    .unwrap_err();

    assert_eq!(err, EoqError::MissingColumns(vec!["Curr Year Usage"]));
    assert!(err.to_string().contains("Curr Year Usage"));
}

#[test]
fn test_both_required_columns_missing() {
    let err = results_for(&["Item"], &[&["A1"]], EoqParams::default()).unwrap_err();
    assert_eq!(
        err,
        EoqError::MissingColumns(vec!["Curr Year Usage", "Unit Cost"])
    );
}

#[test]
fn test_invalid_parameters_rejected() {
    let raw = common::raw_table(&["Unit Cost", "Curr Year Usage"], &[&["1", "1"]]);
    let out = normalize(&raw, &CanonicalSchema::inventory());
    let params = EoqParams {
        ordering_cost: 100.0,
        holding_rate_pct: 150.0,
    };

    assert!(matches!(
        compute_eoq(&out.normalized, &params),
        Err(EoqError::InvalidParameter { name: "holding_rate", .. })
    ));
}

#[test]
fn test_preview_uses_original_headers() {
    let raw = common::raw_table(
        &["  Item", "Qty On Hand ", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "1,200", "$2.50", "500"], &["A2", "", "$0", "10"]],
    );
    let out = normalize(&raw, &CanonicalSchema::inventory());
    let results = compute_eoq(&out.normalized, &EoqParams::default()).unwrap();
    let preview = EoqPreview::build(&results, &out.header_lookup);

    assert_eq!(preview.headers, vec!["Item", "Qty On Hand", "EOQ"]);
    assert_eq!(preview.rows[0], vec!["A1", "1200", "447.21"]);
    assert_eq!(preview.rows[1], vec!["A2", "", "undefined"]);
}

#[test]
fn test_preview_without_identifying_columns() {
    let raw = common::raw_table(&["Unit Cost", "Curr Year Usage"], &[&["$2.50", "500"]]);
    let out = normalize(&raw, &CanonicalSchema::inventory());
    let results = compute_eoq(&out.normalized, &EoqParams::default()).unwrap();
    let preview = EoqPreview::build(&results, &out.header_lookup);

    assert_eq!(preview.headers, vec!["Item", "Qty On Hand", "EOQ"]);
    assert_eq!(preview.rows[0], vec!["", "", "447.21"]);
}

#[test]
fn test_results_serialize_with_markers() {
    let results = results_for(
        &["Item", "Unit Cost", "Curr Year Usage"],
        &[&["A1", "$0", "5"], &["A2", "", "5"]],
        EoqParams::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&results).unwrap();

    assert_eq!(json[0]["EOQ"], "undefined");
    assert!(json[1]["EOQ"].is_null());
    assert!(json[1]["holding_cost"].is_null());
    assert_eq!(json[0]["item"], "A1");
}
