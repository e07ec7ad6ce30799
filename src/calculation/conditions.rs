//! Eligibility condition evaluation.
//!
//! Every employee is measured against all ten conditions. The period policy
//! decides which apply to the employee's category; applicable conditions
//! with missing data fail. Eligibility is all-or-nothing.

use rust_decimal::Decimal;

use crate::config::PeriodPolicy;
use crate::models::{
    AuditStep, ConditionId, ConditionOutcome, ConditionResult, ConditionSummary, EmployeeRecord,
};

/// The result of evaluating an employee's conditions.
#[derive(Debug, Clone)]
pub struct ConditionEvaluation {
    /// All ten results, in index order.
    pub results: Vec<ConditionResult>,
    /// Applicable/passed counts.
    pub summary: ConditionSummary,
    /// True when at least one condition applied and all applicable passed.
    pub eligible: bool,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// Evaluates the ten conditions for one employee.
///
/// `disqualified_reports` is the number of the employee's direct reports
/// whose consecutive-failure tag disqualifies under `policy` (condition 7).
pub fn evaluate_conditions(
    employee: &EmployeeRecord,
    disqualified_reports: u32,
    policy: &PeriodPolicy,
    step_number: u32,
) -> ConditionEvaluation {
    let results: Vec<ConditionResult> = ConditionId::ALL
        .iter()
        .map(|condition| {
            if policy.is_applicable(employee.category, *condition) {
                evaluate_one(*condition, employee, disqualified_reports, policy)
            } else {
                ConditionResult::not_applicable(*condition)
            }
        })
        .collect();

    let summary = ConditionSummary::from_results(&results);
    let eligible = summary.all_passed();

    let failed: Vec<u8> = results
        .iter()
        .filter(|r| r.outcome == ConditionOutcome::Fail)
        .map(|r| r.condition.index())
        .collect();
    let applicable: Vec<u8> = results
        .iter()
        .filter(|r| r.outcome != ConditionOutcome::NotApplicable)
        .map(|r| r.condition.index())
        .collect();

    let reasoning = if summary.applicable == 0 {
        format!(
            "No conditions apply to category '{}'; not eligible",
            employee.category.as_str()
        )
    } else if eligible {
        format!("Passed all {} applicable conditions", summary.applicable)
    } else {
        format!(
            "Passed {} of {} applicable conditions; failed {:?}",
            summary.passed, summary.applicable, failed
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "condition_evaluation".to_string(),
        rule_name: "Eligibility Conditions".to_string(),
        input: serde_json::json!({
            "category": employee.category,
            "applicable_conditions": applicable,
            "policy_effective_date": policy.effective_date.to_string()
        }),
        output: serde_json::json!({
            "applicable": summary.applicable,
            "passed": summary.passed,
            "pass_ratio": summary.pass_ratio.to_string(),
            "failed_conditions": failed,
            "eligible": eligible
        }),
        reasoning,
    };

    ConditionEvaluation {
        results,
        summary,
        eligible,
        audit_step,
    }
}

fn evaluate_one(
    condition: ConditionId,
    employee: &EmployeeRecord,
    disqualified_reports: u32,
    policy: &PeriodPolicy,
) -> ConditionResult {
    let thresholds = &policy.thresholds;
    let attendance = employee.attendance.as_ref();

    match condition {
        ConditionId::AttendanceRate => match attendance {
            Some(record) if record.expected_days() <= 0 => {
                ConditionResult::not_applicable(condition)
            }
            Some(record) => at_least(condition, record.attendance_rate(), thresholds.attendance_rate),
            None => at_least(condition, None, thresholds.attendance_rate),
        },
        ConditionId::UnapprovedAbsence => at_most(
            condition,
            attendance.map(|a| Decimal::from(a.unapproved_absences)),
            Decimal::from(thresholds.unapproved_absence),
        ),
        ConditionId::ActualWorkingDays => at_least(
            condition,
            attendance.map(|a| Decimal::from(a.actual_days)),
            Decimal::ONE,
        ),
        ConditionId::MinimumWorkingDays => at_least(
            condition,
            attendance.map(|a| Decimal::from(a.actual_days)),
            Decimal::from(thresholds.minimum_working_days),
        ),
        ConditionId::PersonalAuditFailure => at_most(
            condition,
            Some(Decimal::from(employee.audit.failures)),
            Decimal::ZERO,
        ),
        ConditionId::PersonalConsecutiveFailure => {
            let streak = employee.audit.consecutive;
            ConditionResult {
                condition,
                outcome: if policy.disqualifies(&streak) {
                    ConditionOutcome::Fail
                } else {
                    ConditionOutcome::Pass
                },
                value: Some(Decimal::from(streak.streak_months())),
                threshold: Some(Decimal::from(thresholds.consecutive_failure_months)),
            }
        }
        ConditionId::TeamConsecutiveFailure => at_most(
            condition,
            Some(Decimal::from(disqualified_reports)),
            Decimal::ZERO,
        ),
        ConditionId::AreaRejectRate => at_most(
            condition,
            employee.audit.area_reject_rate,
            thresholds.area_reject_rate,
        ),
        ConditionId::InspectionPassRate => at_least(
            condition,
            employee.inspection.and_then(|i| i.pass_rate()),
            thresholds.inspection_pass_rate,
        ),
        ConditionId::InspectionVolume => at_least(
            condition,
            employee.inspection.map(|i| Decimal::from(i.inspected_qty)),
            Decimal::from(thresholds.inspection_min_qty),
        ),
    }
}

fn at_least(condition: ConditionId, value: Option<Decimal>, threshold: Decimal) -> ConditionResult {
    compare(condition, value, threshold, value.is_some_and(|v| v >= threshold))
}

fn at_most(condition: ConditionId, value: Option<Decimal>, threshold: Decimal) -> ConditionResult {
    compare(condition, value, threshold, value.is_some_and(|v| v <= threshold))
}

fn compare(
    condition: ConditionId,
    value: Option<Decimal>,
    threshold: Decimal,
    passed: bool,
) -> ConditionResult {
    ConditionResult {
        condition,
        outcome: if passed {
            ConditionOutcome::Pass
        } else {
            ConditionOutcome::Fail
        },
        value,
        threshold: Some(threshold),
    }
}
