//! Integration tests for the incentive engine.
//!
//! Every test drives the HTTP router with the shipped `config/qip`
//! configuration. Covered here:
//! - Continuous-month reconstruction (reverse lookup, plateau, no match, counters)
//! - Specialist three-part amounts
//! - Line-leader and upper-management rollups
//! - Consecutive-failure policy change
//! - Area reject rate, work-area reconciliation and audit export checks
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use incentive_engine::api::{AppState, create_router};
use incentive_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/qip").expect("Failed to load config");
    create_router(AppState::new(config))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn post_calculate(body: Value) -> (StatusCode, Value) {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn person(id: &str, tier: &str, position: &str, boss: Option<&str>) -> Value {
    json!({
        "employee_id": id,
        "name": format!("Employee {}", id),
        "role_tier": tier,
        "position": position,
        "boss": boss,
        "work_area": "B1"
    })
}

fn present(id: &str) -> Value {
    json!({ "employee_id": id, "actual_days": 26, "total_days": 26 })
}

fn inspected(id: &str) -> Value {
    json!({ "inspector_id": id, "inspected_qty": 400, "pass_qty": 396 })
}

fn audit(id: &str, period: &str, area: &str, result: &str) -> Value {
    json!({ "employee_id": id, "period": period, "work_area": area, "result": result })
}

fn batch(period: &str, records: Vec<Value>) -> Value {
    json!({ "period": period, "records": records })
}

/// Passing audit exports for E1 covering the three months up to `period`.
fn clean_audits(periods: [&str; 3]) -> Vec<Value> {
    periods
        .iter()
        .map(|p| batch(p, vec![audit("E1", p, "B1", "pass")]))
        .collect()
}

fn request(period: &str, roster: Vec<Value>, audits: Vec<Value>, previous: Value) -> Value {
    let attendance: Vec<Value> = roster
        .iter()
        .map(|entry| present(entry["employee_id"].as_str().unwrap()))
        .collect();
    let inspections: Vec<Value> = roster
        .iter()
        .map(|entry| inspected(entry["employee_id"].as_str().unwrap()))
        .collect();

    json!({
        "period": period,
        "working_days": 26,
        "roster": roster,
        "attendance": attendance,
        "audits": audits,
        "inspections": inspections,
        "previous": previous
    })
}

fn previous(period: &str, payouts: Vec<(&str, &str)>) -> Value {
    let payouts: Vec<Value> = payouts
        .into_iter()
        .map(|(id, amount)| json!({ "employee_id": id, "amount": amount }))
        .collect();
    json!({ "period": period, "payouts": payouts })
}

fn employee<'a>(result: &'a Value, id: &str) -> &'a Value {
    result["outcome"]["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["employee_id"] == id)
        .unwrap_or_else(|| panic!("No outcome for {}", id))
}

fn amount(result: &Value, id: &str) -> Decimal {
    decimal(employee(result, id)["amount"].as_str().unwrap())
}

fn has_diagnostic(result: &Value, code: &str) -> bool {
    result["outcome"]["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["code"] == code)
}

fn condition_outcome<'a>(employee: &'a Value, condition: u64) -> &'a str {
    employee["conditions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["condition"] == condition)
        .and_then(|c| c["outcome"].as_str())
        .unwrap()
}

// =============================================================================
// Continuous months
// =============================================================================

#[tokio::test]
async fn test_previous_amount_recovers_month_count() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "ASSEMBLY INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "300000")]),
    );

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::OK);

    let e1 = employee(&result, "E1");
    assert_eq!(e1["eligible"], true);
    assert_eq!(e1["previous_continuous_months"], 3);
    assert_eq!(e1["continuous_months"], 4);
    assert_eq!(e1["month_source"], "reverse_lookup");
    assert_eq!(amount(&result, "E1"), decimal("350000"));
    assert_eq!(e1["breakdown"]["kind"], "standard");
}

#[tokio::test]
async fn test_plateau_amount_is_reported_as_ambiguous() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "FINAL INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "1000000")]),
    );

    let (_, result) = post_calculate(body).await;

    let e1 = employee(&result, "E1");
    assert_eq!(e1["month_source"], "ambiguous");
    assert_eq!(e1["continuous_months"], 13);
    assert_eq!(amount(&result, "E1"), decimal("1000000"));
    assert!(has_diagnostic(&result, "REVERSE_LOOKUP_AMBIGUOUS"));
}

#[tokio::test]
async fn test_unknown_previous_amount_restarts_at_one() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "123456")]),
    );

    let (_, result) = post_calculate(body).await;

    let e1 = employee(&result, "E1");
    assert_eq!(e1["month_source"], "no_match");
    assert_eq!(e1["continuous_months"], 1);
    assert_eq!(amount(&result, "E1"), decimal("150000"));
    assert!(has_diagnostic(&result, "REVERSE_LOOKUP_NO_MATCH"));
}

#[tokio::test]
async fn test_next_snapshot_carries_counter_into_following_month() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "300000")]),
    );
    let (_, october) = post_calculate(body).await;
    assert_eq!(october["next_snapshot"]["counter_version"], 1);

    let body = request(
        "2025-11",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        clean_audits(["2025-09", "2025-10", "2025-11"]),
        october["next_snapshot"].clone(),
    );
    let (status, november) = post_calculate(body).await;
    assert_eq!(status, StatusCode::OK);

    let e1 = employee(&november, "E1");
    assert_eq!(e1["month_source"], "counter");
    assert_eq!(e1["continuous_months"], 5);
    assert_eq!(amount(&november, "E1"), decimal("400000"));
}

#[tokio::test]
async fn test_oversized_counter_is_clamped_and_reported() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        json!({
            "period": "2025-09",
            "counter_version": 1,
            "payouts": [
                { "employee_id": "E1", "amount": "1000000", "continuous_months": 4294967295u64 }
            ]
        }),
    );
    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::OK);

    let e1 = employee(&result, "E1");
    assert_eq!(e1["eligible"], true);
    assert_eq!(e1["continuous_months"], 15);
    assert_eq!(amount(&result, "E1"), decimal("1000000"));

    let diagnostic = result["outcome"]["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["code"] == "COUNTER_OUT_OF_RANGE")
        .unwrap();
    assert_eq!(diagnostic["severity"], "high");
    assert_eq!(result["next_snapshot"]["payouts"][0]["continuous_months"], 15);
}

#[tokio::test]
async fn test_failed_month_resets_count() {
    let mut body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "650000")]),
    );
    body["attendance"][0]["unapproved_absences"] = json!(3);

    let (_, result) = post_calculate(body).await;

    let e1 = employee(&result, "E1");
    assert_eq!(e1["eligible"], false);
    assert_eq!(e1["continuous_months"], 0);
    assert_eq!(e1["month_source"], "reset");
    assert_eq!(e1["next_month_expected"], 1);
    assert_eq!(condition_outcome(e1, 2), "fail");
    assert_eq!(amount(&result, "E1"), Decimal::ZERO);
}

// =============================================================================
// Specialist
// =============================================================================

#[tokio::test]
async fn test_certified_aql_inspector_three_parts() {
    let mut roster = vec![person("E1", "TYPE-1", "AQL INSPECTOR", None)];
    roster[0]["certified"] = json!(true);

    // month 9: 750000 + 700000 + 500000
    let body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "1950000")]),
    );

    let (_, result) = post_calculate(body).await;

    let e1 = employee(&result, "E1");
    assert_eq!(e1["continuous_months"], 10);
    assert_eq!(e1["breakdown"]["kind"], "specialist");
    assert_eq!(decimal(e1["breakdown"]["part1"].as_str().unwrap()), decimal("850000"));
    assert_eq!(decimal(e1["breakdown"]["part2"].as_str().unwrap()), decimal("700000"));
    assert_eq!(decimal(e1["breakdown"]["part3"].as_str().unwrap()), decimal("700000"));
    assert_eq!(amount(&result, "E1"), decimal("2250000"));
}

// =============================================================================
// Hierarchy rollups
// =============================================================================

#[tokio::test]
async fn test_line_leader_and_supervisor_rollup() {
    let roster = vec![
        person("S1", "TYPE-1", "SUPERVISOR", None),
        person("L1", "TYPE-1", "LINE LEADER", Some("S1")),
        person("E1", "TYPE-2", "SEWING QC", Some("L1")),
        person("E2", "TYPE-2", "SEWING QC", Some("Employee L1")),
        person("E3", "TYPE-2", "SEWING QC", Some("L1")),
    ];
    let mut body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        previous("2025-09", vec![("E1", "150000"), ("E3", "350000")]),
    );
    // E2 fails the unapproved-absence condition
    body["attendance"][3]["unapproved_absences"] = json!(5);

    let (_, result) = post_calculate(body).await;

    assert_eq!(amount(&result, "E1"), decimal("200000"));
    assert_eq!(amount(&result, "E2"), Decimal::ZERO);
    assert_eq!(amount(&result, "E3"), decimal("400000"));

    // 600000 x 0.12 x 2/3
    let l1 = employee(&result, "L1");
    assert_eq!(amount(&result, "L1"), decimal("48000"));
    assert_eq!(l1["breakdown"]["kind"], "line_leader");
    assert_eq!(l1["breakdown"]["reports"], 3);
    assert_eq!(l1["breakdown"]["receivers"], 2);

    // 48000 x 2.5
    let s1 = employee(&result, "S1");
    assert_eq!(amount(&result, "S1"), decimal("120000"));
    assert_eq!(s1["breakdown"]["kind"], "upper_management");
    assert_eq!(s1["breakdown"]["contributors"], json!(["L1"]));

    assert_eq!(
        decimal(result["outcome"]["summary"]["total_amount"].as_str().unwrap()),
        decimal("768000")
    );
}

#[tokio::test]
async fn test_terminated_and_protected_leave_reports_not_counted() {
    let mut roster = vec![
        person("L1", "TYPE-1", "LINE LEADER", None),
        person("E1", "TYPE-1", "INSPECTOR", Some("L1")),
        person("E2", "TYPE-1", "INSPECTOR", Some("L1")),
        person("E3", "TYPE-1", "INSPECTOR", Some("L1")),
    ];
    roster[2]["termination_date"] = json!("2025-10-15");
    roster[3]["protected_leave"] = json!(true);

    let body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        json!({}),
    );

    let (_, result) = post_calculate(body).await;

    // only E1 counts: 150000 x 0.12 x 1/1
    assert_eq!(amount(&result, "L1"), decimal("18000"));
    assert_eq!(employee(&result, "L1")["breakdown"]["reports"], 1);
    assert_eq!(result["outcome"]["summary"]["active_employees"], 3);
}

#[tokio::test]
async fn test_manager_cycle_terminates() {
    let roster = vec![
        person("M1", "TYPE-1", "MANAGER", Some("M2")),
        person("M2", "TYPE-1", "S.MANAGER", Some("M1")),
        person("L1", "TYPE-1", "LINE LEADER", Some("M1")),
        person("E1", "TYPE-1", "INSPECTOR", Some("L1")),
    ];
    let body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        json!({}),
    );

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(amount(&result, "L1"), decimal("18000"));
    assert_eq!(amount(&result, "M1"), decimal("63000"));
    assert_eq!(amount(&result, "M2"), decimal("72000"));
}

#[tokio::test]
async fn test_manager_without_line_leaders_uses_pooled_average() {
    let roster = vec![
        person("G1", "TYPE-1", "GROUP LEADER", None),
        person("L1", "TYPE-1", "LINE LEADER", None),
        person("E1", "TYPE-1", "INSPECTOR", Some("L1")),
    ];
    let body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        json!({}),
    );

    let (_, result) = post_calculate(body).await;

    // 18000 x 2.0
    assert_eq!(amount(&result, "G1"), decimal("36000"));
    assert_eq!(employee(&result, "G1")["breakdown"]["pooled"], true);
    assert!(has_diagnostic(&result, "POOLED_AVERAGE_FALLBACK"));
}

// =============================================================================
// Consecutive failures
// =============================================================================

fn failing_team(period: &str, window: [&str; 3]) -> Value {
    let roster = vec![
        person("L1", "TYPE-1", "LINE LEADER", None),
        person("E1", "TYPE-1", "INSPECTOR", Some("L1")),
        person("E2", "TYPE-1", "INSPECTOR", Some("L1")),
    ];
    let audits = vec![
        batch(window[0], vec![audit("E1", window[0], "B1", "pass")]),
        batch(window[1], vec![audit("E1", window[1], "B1", "fail")]),
        batch(
            window[2],
            vec![
                audit("E1", window[2], "B1", "fail"),
                audit("E2", window[2], "B1", "pass"),
            ],
        ),
    ];
    request(period, roster, audits, json!({}))
}

#[tokio::test]
async fn test_two_consecutive_failures_keep_leader_payout_under_three_month_policy() {
    let body = failing_team("2025-10", ["2025-08", "2025-09", "2025-10"]);
    let (_, result) = post_calculate(body).await;

    let tagged = &result["outcome"]["consecutive_failures"]["employees"];
    assert_eq!(tagged[0]["subject"], "E1");
    assert_eq!(tagged[0]["failure"]["tag"], "two_consecutive");

    let l1 = employee(&result, "L1");
    assert_eq!(condition_outcome(l1, 7), "pass");
    // 150000 x 0.12 x 1/2
    assert_eq!(amount(&result, "L1"), decimal("9000"));
}

#[tokio::test]
async fn test_two_consecutive_failures_zero_leader_under_two_month_policy() {
    let body = failing_team("2025-11", ["2025-09", "2025-10", "2025-11"]);
    let (_, result) = post_calculate(body).await;

    assert_eq!(result["outcome"]["policy_effective_date"], "2025-11-01");

    let l1 = employee(&result, "L1");
    assert_eq!(condition_outcome(l1, 7), "fail");
    assert_eq!(l1["eligible"], false);
    assert_eq!(amount(&result, "L1"), Decimal::ZERO);

    let alerts = result["outcome"]["failure_alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["employee_id"], "E1");
    assert_eq!(alerts[0]["boss_chain"][0]["employee_id"], "L1");
}

// =============================================================================
// Areas and audit exports
// =============================================================================

fn area_audits(period: &str, failures: usize) -> Value {
    let records: Vec<Value> = (0..50)
        .map(|i| {
            let result = if i < failures { "fail" } else { "pass" };
            audit(&format!("A{:02}", i), period, "B1", result)
        })
        .collect();
    batch(period, records)
}

#[tokio::test]
async fn test_model_master_area_reject_rate() {
    for (failures, eligible) in [(1, true), (2, false)] {
        let body = request(
            "2025-10",
            vec![person("MM1", "TYPE-1", "MODEL MASTER", None)],
            vec![
                batch("2025-08", vec![]),
                batch("2025-09", vec![]),
                area_audits("2025-10", failures),
            ],
            json!({}),
        );

        let (_, result) = post_calculate(body).await;
        let mm1 = employee(&result, "MM1");
        assert_eq!(mm1["eligible"], eligible, "{} failure(s) of 50", failures);
        assert_eq!(
            condition_outcome(mm1, 8),
            if eligible { "pass" } else { "fail" }
        );
    }
}

#[tokio::test]
async fn test_roster_area_wins_over_audit_area() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        vec![
            batch("2025-08", vec![]),
            batch("2025-09", vec![]),
            batch("2025-10", vec![audit("E1", "2025-10", "B2-L3", "pass")]),
        ],
        json!({}),
    );

    let (_, result) = post_calculate(body).await;

    assert_eq!(employee(&result, "E1")["work_area"], "B1");
    let conflicts = result["outcome"]["location_discrepancies"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["roster_area"], "B1");
    assert_eq!(conflicts[0]["audit_area"], "B2-L3");
    assert!(has_diagnostic(&result, "WORK_AREA_CONFLICT"));
}

#[tokio::test]
async fn test_audit_export_problems_are_diagnostics() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        vec![
            batch("2025-09", vec![audit("E1", "2025-09", "B1", "pass")]),
            batch(
                "2025-10",
                vec![
                    audit("E1", "2025-10", "B1", "pass"),
                    audit("E1", "2025-09", "B1", "fail"),
                ],
            ),
        ],
        json!({}),
    );

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::OK);

    assert!(has_diagnostic(&result, "MISSING_AUDIT_PERIOD"));
    assert!(has_diagnostic(&result, "AUDIT_PERIOD_MISMATCH"));
    assert_eq!(result["outcome"]["consecutive_failures"]["excluded_records"], 1);
    assert_eq!(employee(&result, "E1")["eligible"], true);
}

// =============================================================================
// Unpaid categories
// =============================================================================

#[tokio::test]
async fn test_new_member_and_unclassified_are_not_paid() {
    let roster = vec![
        person("N1", "TYPE-3", "NEW MEMBER", None),
        person("X1", "TYPE-1", "FORKLIFT DRIVER", None),
    ];
    let body = request(
        "2025-10",
        roster,
        clean_audits(["2025-08", "2025-09", "2025-10"]),
        json!({}),
    );

    let (_, result) = post_calculate(body).await;

    let n1 = employee(&result, "N1");
    assert_eq!(n1["category"], "new_member");
    assert_eq!(n1["breakdown"]["kind"], "not_entitled");
    assert_eq!(n1["condition_summary"]["applicable"], 0);

    let x1 = employee(&result, "X1");
    assert_eq!(x1["category"], "unclassified");
    assert_eq!(x1["breakdown"]["kind"], "unclassified");
    assert!(has_diagnostic(&result, "UNCLASSIFIED_POSITION"));

    assert_eq!(result["outcome"]["summary"]["paid_employees"], 0);
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_error_malformed_json() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from("{ \"period\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_missing_roster() {
    let (status, result) = post_calculate(json!({ "period": "2025-10" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_error_invalid_period() {
    let (status, result) = post_calculate(json!({ "period": "2025-13", "roster": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_duplicate_employee() {
    let roster = vec![
        person("E1", "TYPE-1", "INSPECTOR", None),
        person("E1", "TYPE-1", "INSPECTOR", None),
    ];
    let body = request("2025-10", roster, vec![], json!({}));

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
    assert!(result["message"].as_str().unwrap().contains("E1"));
}

#[tokio::test]
async fn test_error_snapshot_for_wrong_period() {
    let body = request(
        "2025-10",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        vec![],
        previous("2025-07", vec![("E1", "300000")]),
    );

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(result["code"], "SNAPSHOT_MISMATCH");
}

#[tokio::test]
async fn test_error_period_before_first_policy() {
    let body = request(
        "2025-06",
        vec![person("E1", "TYPE-1", "INSPECTOR", None)],
        vec![],
        json!({}),
    );

    let (status, result) = post_calculate(body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(result["code"], "POLICY_NOT_FOUND");
}
