//! End-to-end runs over the sample AWS export in `tests/fixtures`

use std::path::PathBuf;

use optiscale::parsers::ParserRegistry;
use optiscale::services::{build_summary_outline, compare_scenarios, estimate_savings};
use optiscale::types::{OptimizationAction, OptiscaleError};
use optiscale::{load_and_profile, CostProfiler, Settings, ToolRegistry};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sample_csv() -> String {
    std::fs::read_to_string(fixture("aws_sample.csv")).unwrap()
}

fn sample_actions() -> Vec<OptimizationAction> {
    let text = std::fs::read_to_string(fixture("actions.json")).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    serde_json::from_value(value["actions"].clone()).unwrap()
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap_or(f64::NAN);
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {}, got {}",
        expected,
        value
    );
}

// ========== profiling ==========

#[test]
fn test_profile_sample_export() {
    let profile = load_and_profile(&sample_csv()).unwrap();

    assert_eq!(profile.row_count, 12);
    assert_eq!(profile.total, dec!(17639.00));
    assert_eq!(profile.amount_column, "unblended_cost");

    let services: Vec<&str> = profile.by_service.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        services,
        vec!["AmazonEC2", "AmazonRDS", "AmazonS3", "AWSLambda", "AmazonCloudWatch"]
    );
    assert_eq!(profile.service_total("AmazonEC2"), Some(dec!(10230.75)));

    assert_eq!(profile.by_account[0].name, "prod");
    assert_eq!(profile.by_account[0].total, dec!(13409.00));
    let unassigned = profile
        .by_account
        .iter()
        .find(|b| b.name == "unassigned")
        .unwrap();
    assert_eq!(unassigned.total, dec!(124.45));

    assert_eq!(profile.untagged_total, dec!(321.45));
    assert_eq!(profile.by_period.len(), 2);
}

#[test]
fn test_groupings_sum_to_total() {
    let profile = load_and_profile(&sample_csv()).unwrap();
    let by_service: rust_decimal::Decimal = profile.by_service.iter().map(|b| b.total).sum();
    let by_account: rust_decimal::Decimal = profile.by_account.iter().map(|b| b.total).sum();
    let by_period: rust_decimal::Decimal = profile.by_period.iter().map(|b| b.total).sum();

    assert_eq!(by_service, profile.total);
    assert_eq!(by_account, profile.total);
    assert_eq!(by_period, profile.total);
}

#[test]
fn test_file_and_text_paths_agree() {
    let parsed = ParserRegistry::new()
        .parse_files(&[fixture("aws_sample.csv")])
        .unwrap();
    let from_file = CostProfiler::from_settings(&Settings::default())
        .profile(&parsed)
        .unwrap();
    let from_text = load_and_profile(&sample_csv()).unwrap();
    assert_eq!(from_file, from_text);
}

// ========== savings ==========

#[test]
fn test_sample_scenario() {
    let profile = load_and_profile(&sample_csv()).unwrap();
    let actions = sample_actions();

    let estimates = estimate_savings(&actions, &profile).unwrap();
    assert_eq!(estimates[0].estimated_saving, dec!(2046.15));
    // Lowercase target resolves to the exported service name
    assert_eq!(estimates[1].matched_service, "AmazonS3");
    assert_eq!(estimates[1].estimated_saving, dec!(745.59));
    assert_eq!(estimates[2].estimated_saving, dec!(1200));

    let cmp = compare_scenarios(&profile, &actions).unwrap();
    assert_eq!(cmp.total_savings, dec!(3991.74));
    assert_eq!(cmp.optimized_total, dec!(13647.26));
    assert_eq!(cmp.percent_improvement, dec!(22.63));
    assert!(!cmp.clamped);

    let outline = build_summary_outline(&profile, &cmp).unwrap();
    assert_eq!(outline.headings()[0], "Cost Overview");
    assert!(outline.headings().contains(&"Governance"));
}

#[test]
fn test_unknown_service_rejected() {
    let profile = load_and_profile(&sample_csv()).unwrap();
    let actions = vec![OptimizationAction::percent("x", "AmazonRedshift", dec!(0.5))];
    let err = compare_scenarios(&profile, &actions).unwrap_err();
    assert!(matches!(err, OptiscaleError::UnknownService(ref s) if s == "AmazonRedshift"));
}

// ========== tool registry ==========

#[test]
fn test_tool_chain_matches_direct_calls() {
    let registry = ToolRegistry::default();
    let csv_text = sample_csv();

    let profile = registry
        .call("load_and_profile_costs", json!({ "csv_text": csv_text }))
        .unwrap();
    assert_close(&profile["total_cost"], 17639.0);
    assert_eq!(profile["top_services"][0], "AmazonEC2");
    assert_eq!(profile["service_count"], 5);

    let actions_file: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("actions.json")).unwrap()).unwrap();
    let cmp = registry
        .call(
            "compare_cost_scenarios",
            json!({ "csv_text": csv_text, "actions": actions_file["actions"] }),
        )
        .unwrap();
    assert_close(&cmp["optimized_total"], 13647.26);
    assert_close(&cmp["percent_improvement"], 22.63);

    let outline = registry
        .call(
            "generate_summary_outline",
            json!({ "csv_text": csv_text, "actions": actions_file["actions"] }),
        )
        .unwrap();
    assert_eq!(outline["sections"][0]["heading"], "Cost Overview");
}

#[test]
fn test_tool_settings_flow_through() {
    let settings = Settings::default()
        .with_overrides(Some("inr".into()), Some("GCP".into()), Some(2))
        .unwrap();
    let out = ToolRegistry::new(settings)
        .call("load_and_profile_costs", json!({ "csv_text": sample_csv() }))
        .unwrap();

    assert_eq!(out["currency"], "INR");
    assert_eq!(out["cloud_provider"], "gcp");
    assert_eq!(out["top_services"].as_array().unwrap().len(), 2);
    assert_eq!(out["service_count"], 5);
}

#[test]
fn test_malformed_row_reports_line() {
    let mut csv_text = sample_csv();
    csv_text.push_str("AmazonEC2,prod,2025-03,,lots\n");

    let err = ToolRegistry::default()
        .call("load_and_profile_costs", json!({ "csv_text": csv_text }))
        .unwrap_err();
    match err {
        OptiscaleError::MalformedInput { line, .. } => assert_eq!(line, Some(14)),
        other => panic!("unexpected error: {}", other),
    }
}

// ========== out-of-range figures ==========

#[test]
fn test_out_of_range_inputs_are_errors() {
    let registry = ToolRegistry::default();

    let err = registry
        .call(
            "load_and_profile_costs",
            json!({ "csv_text": "service,amount\na,79228162514264337593543950335\nb,1\n" }),
        )
        .unwrap_err();
    assert!(matches!(err, OptiscaleError::MalformedInput { .. }));

    let err = registry
        .call(
            "project_savings",
            json!({ "baseline_monthly_cost": 1e28, "reduction_fraction": 1 }),
        )
        .unwrap_err();
    assert!(matches!(err, OptiscaleError::InvalidArgument(_)));

    let err = registry
        .call(
            "compare_two_cost_scenarios",
            json!({ "baseline_cost": 0.0001, "scenario_a_cost": 7e28, "scenario_b_cost": 1 }),
        )
        .unwrap_err();
    assert!(matches!(err, OptiscaleError::InvalidArgument(_)));
}
