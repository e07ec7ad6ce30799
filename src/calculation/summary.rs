//! Period summary statistics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    ConditionId, ConditionOutcome, ConditionStats, EmployeeOutcome, EmployeeRecord, Period,
    PeriodSummary, SummaryBreakdown,
};

const UNKNOWN_TIER: &str = "UNKNOWN";
const UNASSIGNED_AREA: &str = "UNASSIGNED";

/// Builds totals, tier and area breakdowns, and per-condition statistics.
///
/// `outcomes` and `records` are parallel slices in roster order.
pub fn summarize_period(
    outcomes: &[EmployeeOutcome],
    records: &[EmployeeRecord],
    period: Period,
) -> PeriodSummary {
    let total_employees = outcomes.len() as u32;
    let eligible_employees = outcomes.iter().filter(|o| o.eligible).count() as u32;
    let paid_employees = outcomes.iter().filter(|o| o.amount > Decimal::ZERO).count() as u32;
    let total_amount: Decimal = outcomes.iter().map(|o| o.amount).sum();
    let active_employees = records.iter().filter(|r| !r.is_terminated(period)).count() as u32;

    let eligibility_rate = if total_employees == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(eligible_employees) * Decimal::ONE_HUNDRED / Decimal::from(total_employees))
            .round_dp(2)
    };

    let by_tier = breakdown(outcomes, |o| {
        o.role_tier
            .map(|tier| tier.label().to_string())
            .unwrap_or_else(|| UNKNOWN_TIER.to_string())
    });
    let by_area = breakdown(outcomes, |o| {
        o.work_area
            .clone()
            .unwrap_or_else(|| UNASSIGNED_AREA.to_string())
    });

    let conditions = ConditionId::ALL
        .iter()
        .map(|condition| {
            let mut stats = ConditionStats {
                condition: *condition,
                passed: 0,
                failed: 0,
                not_applicable: 0,
            };
            for outcome in outcomes {
                match outcome
                    .conditions
                    .iter()
                    .find(|r| r.condition == *condition)
                    .map(|r| r.outcome)
                {
                    Some(ConditionOutcome::Pass) => stats.passed += 1,
                    Some(ConditionOutcome::Fail) => stats.failed += 1,
                    Some(ConditionOutcome::NotApplicable) | None => stats.not_applicable += 1,
                }
            }
            stats
        })
        .collect();

    PeriodSummary {
        total_employees,
        active_employees,
        eligible_employees,
        paid_employees,
        total_amount,
        eligibility_rate,
        by_tier,
        by_area,
        conditions,
    }
}

fn breakdown(
    outcomes: &[EmployeeOutcome],
    key: impl Fn(&EmployeeOutcome) -> String,
) -> Vec<SummaryBreakdown> {
    let mut groups: BTreeMap<String, SummaryBreakdown> = BTreeMap::new();
    for outcome in outcomes {
        let group_key = key(outcome);
        let group = groups
            .entry(group_key.clone())
            .or_insert_with(|| SummaryBreakdown {
                key: group_key,
                employees: 0,
                eligible: 0,
                total_amount: Decimal::ZERO,
            });
        group.employees += 1;
        if outcome.eligible {
            group.eligible += 1;
        }
        group.total_amount += outcome.amount;
    }
    groups.into_values().collect()
}
