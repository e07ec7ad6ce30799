//! Hierarchy rollup amounts.
//!
//! Line leaders earn a share of what their direct individual-contributor
//! reports earn. Upper managers earn a multiple of the average line-leader
//! amount found below them in the reporting graph.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    AmountBreakdown, AuditStep, Diagnostic, DiagnosticCode, EmployeeRecord, Period,
    PositionCategory, Severity,
};

use super::{IncentiveResult, ReportingGraph};

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Average of the positive amounts (receivers-only denominator).
///
/// # Example
///
/// ```
/// use incentive_engine::calculation::receiver_average;
/// use rust_decimal::Decimal;
///
/// let amounts = [Decimal::from(200_000), Decimal::ZERO, Decimal::from(400_000)];
/// assert_eq!(receiver_average(&amounts), Some(Decimal::from(300_000)));
/// assert_eq!(receiver_average(&[Decimal::ZERO]), None);
/// ```
pub fn receiver_average(amounts: &[Decimal]) -> Option<Decimal> {
    let receivers: Vec<Decimal> = amounts.iter().copied().filter(|a| *a > Decimal::ZERO).collect();
    if receivers.is_empty() {
        return None;
    }
    let total: Decimal = receivers.iter().sum();
    Some(total / Decimal::from(receivers.len()))
}

/// Calculates a line leader's amount from their direct reports' final
/// amounts.
///
/// `amounts` holds the final individual-contributor amount for every arena
/// index. Reports who are terminated, on protected leave or not individual
/// contributors are not counted.
pub fn calculate_line_leader_incentive(
    leader: usize,
    graph: &ReportingGraph,
    employees: &[EmployeeRecord],
    amounts: &[Decimal],
    share: Decimal,
    period: Period,
    step_number: u32,
) -> IncentiveResult {
    let reports: Vec<usize> = graph
        .direct_reports(leader)
        .iter()
        .copied()
        .filter(|index| {
            let report = &employees[*index];
            report.category.is_individual_contributor() && report.counts_for_rollup(period)
        })
        .collect();

    let reports_total: Decimal = reports.iter().map(|index| amounts[*index]).sum();
    let receivers = reports
        .iter()
        .filter(|index| amounts[**index] > Decimal::ZERO)
        .count() as u32;
    let report_count = reports.len() as u32;

    let (amount, diagnostic, reasoning) = if report_count == 0 {
        (
            Decimal::ZERO,
            Some(Diagnostic::for_employee(
                DiagnosticCode::NoReports,
                graph.id(leader),
                Severity::Medium,
                "Line leader has no eligible direct reports",
            )),
            "No direct individual-contributor reports; amount is 0".to_string(),
        )
    } else {
        let amount = round_currency(
            reports_total * share * Decimal::from(receivers) / Decimal::from(report_count),
        );
        (
            amount,
            None,
            format!(
                "{} x {} x {}/{} receivers = {}",
                reports_total, share, receivers, report_count, amount
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "line_leader_rollup".to_string(),
        rule_name: "Line Leader Rollup".to_string(),
        input: serde_json::json!({
            "reports": reports.iter().map(|i| graph.id(*i)).collect::<Vec<_>>(),
            "reports_total": reports_total.to_string(),
            "share": share.to_string()
        }),
        output: serde_json::json!({
            "amount": amount.to_string(),
            "receivers": receivers
        }),
        reasoning,
    };

    IncentiveResult {
        amount,
        breakdown: AmountBreakdown::LineLeader {
            reports_total,
            reports: report_count,
            receivers,
            share,
        },
        diagnostic,
        audit_step,
    }
}

/// Org-wide average of line-leader amounts, for managers with no line
/// leaders below them.
pub fn pooled_line_lead_average(
    graph: &ReportingGraph,
    employees: &[EmployeeRecord],
    amounts: &[Decimal],
    period: Period,
) -> Option<Decimal> {
    let line_lead_amounts: Vec<Decimal> = (0..graph.len())
        .filter(|index| {
            graph.category(*index) == PositionCategory::LineLeader
                && employees[*index].counts_for_rollup(period)
        })
        .map(|index| amounts[index])
        .collect();
    receiver_average(&line_lead_amounts)
}

/// Calculates an upper manager's amount from the line leaders reachable
/// below them.
///
/// `amounts` holds the final line-leader amount for every arena index.
/// Without reachable line leaders the `pooled_average` is used instead.
#[allow(clippy::too_many_arguments)]
pub fn calculate_upper_management_incentive(
    manager: usize,
    graph: &ReportingGraph,
    employees: &[EmployeeRecord],
    amounts: &[Decimal],
    multiplier: Decimal,
    pooled_average: Option<Decimal>,
    period: Period,
    step_number: u32,
) -> IncentiveResult {
    let line_leads: Vec<usize> = graph
        .reachable_line_leads(manager)
        .into_iter()
        .filter(|index| employees[*index].counts_for_rollup(period))
        .collect();

    let (average, contributors, pooled, diagnostic) = if line_leads.is_empty() {
        match pooled_average {
            Some(average) => (
                average,
                Vec::new(),
                true,
                Some(Diagnostic::for_employee(
                    DiagnosticCode::PooledAverageFallback,
                    graph.id(manager),
                    Severity::Low,
                    format!("No line leaders below; using pooled average {}", average),
                )),
            ),
            None => (
                Decimal::ZERO,
                Vec::new(),
                true,
                Some(Diagnostic::for_employee(
                    DiagnosticCode::NoLineLeadAverage,
                    graph.id(manager),
                    Severity::Medium,
                    "No line leaders below and no pooled line-leader average",
                )),
            ),
        }
    } else {
        let lead_amounts: Vec<Decimal> = line_leads.iter().map(|index| amounts[*index]).collect();
        let contributors: Vec<String> = line_leads
            .iter()
            .filter(|index| amounts[**index] > Decimal::ZERO)
            .map(|index| graph.id(*index).to_string())
            .collect();
        (
            receiver_average(&lead_amounts).unwrap_or(Decimal::ZERO),
            contributors,
            false,
            None,
        )
    };

    let amount = round_currency(average * multiplier);

    let reasoning = if pooled {
        format!(
            "Pooled line-leader average {} x multiplier {} = {}",
            average, multiplier, amount
        )
    } else {
        format!(
            "Average of {} receiving line leader(s) {} x multiplier {} = {}",
            contributors.len(),
            average,
            multiplier,
            amount
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "upper_management_rollup".to_string(),
        rule_name: "Upper Management Rollup".to_string(),
        input: serde_json::json!({
            "line_leaders": line_leads.iter().map(|i| graph.id(*i)).collect::<Vec<_>>(),
            "multiplier": multiplier.to_string(),
            "pooled": pooled
        }),
        output: serde_json::json!({
            "average": average.to_string(),
            "amount": amount.to_string()
        }),
        reasoning,
    };

    IncentiveResult {
        amount,
        breakdown: AmountBreakdown::UpperManagement {
            average,
            multiplier,
            contributors,
            pooled,
        },
        diagnostic,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditAggregate, RoleTier};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> Period {
        Period::new(2025, 10).unwrap()
    }

    fn employee(id: &str, category: PositionCategory, boss: Option<&str>) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            name: format!("Name {}", id),
            role_tier: Some(RoleTier::Type1),
            position: category.as_str().to_uppercase(),
            category,
            boss_reference: boss.map(str::to_string),
            work_area: None,
            hire_date: None,
            termination_date: None,
            protected_leave: false,
            certified: false,
            attendance: None,
            audit: AuditAggregate::default(),
            inspection: None,
            previous: None,
        }
    }

    #[test]
    fn test_line_leader_share_of_receivers() {
        let employees = vec![
            employee("L1", PositionCategory::LineLeader, None),
            employee("E1", PositionCategory::Inspector, Some("L1")),
            employee("E2", PositionCategory::Inspector, Some("L1")),
            employee("E3", PositionCategory::Inspector, Some("L1")),
        ];
        let amounts = vec![
            Decimal::ZERO,
            dec("200000"),
            Decimal::ZERO,
            dec("400000"),
        ];
        let graph = ReportingGraph::build(&employees).graph;

        let result =
            calculate_line_leader_incentive(0, &graph, &employees, &amounts, dec("0.12"), period(), 1);

        // 600000 x 0.12 x 2/3
        assert_eq!(result.amount, dec("48000"));
        assert_eq!(
            result.breakdown,
            AmountBreakdown::LineLeader {
                reports_total: dec("600000"),
                reports: 3,
                receivers: 2,
                share: dec("0.12"),
            }
        );
        assert!(result.diagnostic.is_none());
    }

    #[test]
    fn test_line_leader_excludes_terminated_and_leave() {
        let mut employees = vec![
            employee("L1", PositionCategory::LineLeader, None),
            employee("E1", PositionCategory::Inspector, Some("L1")),
            employee("E2", PositionCategory::Inspector, Some("L1")),
            employee("E3", PositionCategory::Inspector, Some("L1")),
        ];
        employees[2].termination_date = NaiveDate::from_ymd_opt(2025, 10, 15);
        employees[3].protected_leave = true;
        let amounts = vec![Decimal::ZERO, dec("300000"), Decimal::ZERO, Decimal::ZERO];
        let graph = ReportingGraph::build(&employees).graph;

        let result =
            calculate_line_leader_incentive(0, &graph, &employees, &amounts, dec("0.12"), period(), 1);
        assert_eq!(result.amount, dec("36000"));
    }

    #[test]
    fn test_line_leader_without_reports() {
        let employees = vec![employee("L1", PositionCategory::LineLeader, None)];
        let graph = ReportingGraph::build(&employees).graph;

        let result = calculate_line_leader_incentive(
            0,
            &graph,
            &employees,
            &[Decimal::ZERO],
            dec("0.12"),
            period(),
            1,
        );
        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(result.diagnostic.map(|d| d.code), Some(DiagnosticCode::NoReports));
    }

    #[test]
    fn test_rollup_rounds_half_away_from_zero() {
        let employees = vec![
            employee("L1", PositionCategory::LineLeader, None),
            employee("E1", PositionCategory::Inspector, Some("L1")),
        ];
        let amounts = vec![Decimal::ZERO, dec("150012.5")];
        let graph = ReportingGraph::build(&employees).graph;

        // 150012.5 x 0.12 = 18001.5
        let result =
            calculate_line_leader_incentive(0, &graph, &employees, &amounts, dec("0.12"), period(), 1);
        assert_eq!(result.amount, dec("18002"));
    }

    #[test]
    fn test_upper_management_average_of_receivers() {
        let employees = vec![
            employee("S1", PositionCategory::Supervisor, None),
            employee("L1", PositionCategory::LineLeader, Some("S1")),
            employee("L2", PositionCategory::LineLeader, Some("S1")),
            employee("L3", PositionCategory::LineLeader, Some("S1")),
        ];
        let amounts = vec![
            Decimal::ZERO,
            dec("200000"),
            Decimal::ZERO,
            dec("400000"),
        ];
        let graph = ReportingGraph::build(&employees).graph;

        let result = calculate_upper_management_incentive(
            0,
            &graph,
            &employees,
            &amounts,
            dec("2.5"),
            None,
            period(),
            1,
        );

        assert_eq!(result.amount, dec("750000"));
        match result.breakdown {
            AmountBreakdown::UpperManagement {
                average,
                contributors,
                pooled,
                ..
            } => {
                assert_eq!(average, dec("300000"));
                assert_eq!(contributors, vec!["L1".to_string(), "L3".to_string()]);
                assert!(!pooled);
            }
            other => panic!("Expected UpperManagement breakdown, got {:?}", other),
        }
    }

    #[test]
    fn test_upper_management_pooled_fallback() {
        let employees = vec![
            employee("M1", PositionCategory::Manager, None),
            employee("L1", PositionCategory::LineLeader, None),
        ];
        let amounts = vec![Decimal::ZERO, dec("100000")];
        let graph = ReportingGraph::build(&employees).graph;
        let pooled = pooled_line_lead_average(&graph, &employees, &amounts, period());
        assert_eq!(pooled, Some(dec("100000")));

        let result = calculate_upper_management_incentive(
            0,
            &graph,
            &employees,
            &amounts,
            dec("3.5"),
            pooled,
            period(),
            1,
        );
        assert_eq!(result.amount, dec("350000"));
        assert_eq!(
            result.diagnostic.map(|d| d.code),
            Some(DiagnosticCode::PooledAverageFallback)
        );
    }

    #[test]
    fn test_upper_management_without_any_average() {
        let employees = vec![employee("M1", PositionCategory::Manager, None)];
        let graph = ReportingGraph::build(&employees).graph;

        let result = calculate_upper_management_incentive(
            0,
            &graph,
            &employees,
            &[Decimal::ZERO],
            dec("3.5"),
            None,
            period(),
            1,
        );
        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(
            result.diagnostic.map(|d| d.code),
            Some(DiagnosticCode::NoLineLeadAverage)
        );
    }

    #[test]
    fn test_upper_management_with_unpaid_line_leads_is_zero() {
        let employees = vec![
            employee("G1", PositionCategory::GroupLeader, None),
            employee("L1", PositionCategory::LineLeader, Some("G1")),
        ];
        let graph = ReportingGraph::build(&employees).graph;

        let result = calculate_upper_management_incentive(
            0,
            &graph,
            &employees,
            &[Decimal::ZERO, Decimal::ZERO],
            dec("2.0"),
            Some(dec("500000")),
            period(),
            1,
        );
        assert_eq!(result.amount, Decimal::ZERO);
        assert!(result.diagnostic.is_none());
    }
}
