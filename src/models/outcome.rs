//! Period outcome models.
//!
//! These types form the JSON output of a period run: one
//! [`EmployeeOutcome`] per rostered employee plus the period-level reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    AreaConflict, AuditStep, ConditionId, ConditionResult, ConditionSummary, ConsecutiveFailure,
    ConsecutiveFailureRoster, Diagnostic, Period, PositionCategory, PreviousPayout,
    PreviousSnapshot, RoleTier, CURRENT_COUNTER_VERSION,
};

/// How the continuous-month count was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthSource {
    /// Not eligible this period, count reset to zero.
    Reset,
    /// Eligible with no previous payout.
    FirstMonth,
    /// Continued from the counter recorded in the previous snapshot.
    Counter,
    /// Recovered by matching the previous amount against the schedule.
    ReverseLookup,
    /// Several months matched the previous amount; the smallest was used.
    Ambiguous,
    /// The previous amount matched nothing; restarted at one.
    NoMatch,
    /// Rollup category without a recorded counter; restarted at one.
    Untracked,
}

/// How an employee's amount was made up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountBreakdown {
    /// Progression-table lookup.
    Standard {
        /// Name of the table used (`standard` or `type2`).
        table: String,
        /// Month count used for the lookup (capped at 15).
        months: u32,
    },
    /// Specialist three-component amount.
    Specialist {
        /// Base-table amount.
        part1: Decimal,
        /// Certification bonus.
        part2: Decimal,
        /// Long-service bonus.
        part3: Decimal,
    },
    /// Line-lead rollup.
    LineLeader {
        /// Sum of the direct reports' amounts.
        reports_total: Decimal,
        /// Direct individual-contributor reports counted.
        reports: u32,
        /// Of those, reports that received a payout.
        receivers: u32,
        /// Configured share of the reports' total.
        share: Decimal,
    },
    /// Upper-management rollup.
    UpperManagement {
        /// Average line-lead amount used.
        average: Decimal,
        /// Category multiplier.
        multiplier: Decimal,
        /// Line leads whose amounts formed the average.
        contributors: Vec<String>,
        /// True when the org-wide pooled average was used.
        pooled: bool,
    },
    /// Category is never paid.
    NotEntitled,
    /// Position could not be classified.
    Unclassified,
    /// At least one applicable condition failed.
    Ineligible,
}

/// Full result for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOutcome {
    /// Employee number.
    pub employee_id: String,
    /// Full name.
    pub name: String,
    /// Parsed role tier.
    pub role_tier: Option<RoleTier>,
    /// Raw position title.
    pub position: String,
    /// Classified category.
    pub category: PositionCategory,
    /// Reconciled work area.
    pub work_area: Option<String>,
    /// All ten condition results, in index order.
    pub conditions: Vec<ConditionResult>,
    /// Applicable/passed counts.
    pub condition_summary: ConditionSummary,
    /// Result of the all-or-nothing rule.
    pub eligible: bool,
    /// Personal consecutive-failure tag.
    pub consecutive_failure: ConsecutiveFailure,
    /// Amount paid last period.
    pub previous_amount: Decimal,
    /// Continuous months at the end of last period, when known.
    pub previous_continuous_months: Option<u32>,
    /// Continuous qualifying months including this period.
    pub continuous_months: u32,
    /// How `continuous_months` was derived.
    pub month_source: MonthSource,
    /// Month count the employee will be on next period if they qualify again.
    pub next_month_expected: u32,
    /// Amount payable this period.
    pub amount: Decimal,
    /// How `amount` was made up.
    pub breakdown: AmountBreakdown,
    /// Step-by-step audit trace.
    pub trace: Vec<AuditStep>,
}

/// An employee with a consecutive-failure tag, with the people to notify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureAlert {
    /// Employee number.
    pub employee_id: String,
    /// Full name.
    pub name: String,
    /// Reconciled work area.
    pub work_area: Option<String>,
    /// The tag that raised the alert.
    pub failure: ConsecutiveFailure,
    /// Direct manager, then the manager's manager, as far as resolvable.
    pub boss_chain: Vec<ManagerRef>,
}

/// A manager named in a failure alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    /// Employee number.
    pub employee_id: String,
    /// Full name.
    pub name: String,
}

/// Totals for one group of employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBreakdown {
    /// Group key (tier label or work area).
    pub key: String,
    /// Employees in the group.
    pub employees: u32,
    /// Eligible employees in the group.
    pub eligible: u32,
    /// Total amount paid to the group.
    pub total_amount: Decimal,
}

/// Pass/fail counts for one condition across the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionStats {
    /// Which condition.
    pub condition: ConditionId,
    /// Employees that passed.
    pub passed: u32,
    /// Employees that failed.
    pub failed: u32,
    /// Employees for which it did not apply.
    pub not_applicable: u32,
}

/// Period-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Employees on the roster.
    pub total_employees: u32,
    /// Employees with no termination on or before the period's last day.
    pub active_employees: u32,
    /// Eligible employees.
    pub eligible_employees: u32,
    /// Employees with a positive amount.
    pub paid_employees: u32,
    /// Sum of all amounts.
    pub total_amount: Decimal,
    /// Eligible share of the roster, as a percentage.
    pub eligibility_rate: Decimal,
    /// Totals per role tier.
    pub by_tier: Vec<SummaryBreakdown>,
    /// Totals per work area.
    pub by_area: Vec<SummaryBreakdown>,
    /// Per-condition statistics.
    pub conditions: Vec<ConditionStats>,
}

/// The complete result of a period run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOutcome {
    /// The period calculated.
    pub period: Period,
    /// Effective date of the policy that was applied.
    pub policy_effective_date: NaiveDate,
    /// One entry per rostered employee, in roster order.
    pub employees: Vec<EmployeeOutcome>,
    /// Work-area conflicts between roster and audit history.
    pub location_discrepancies: Vec<AreaConflict>,
    /// Consecutive-failure tags for employees and areas.
    pub consecutive_failures: ConsecutiveFailureRoster,
    /// Tagged employees with their managers.
    pub failure_alerts: Vec<FailureAlert>,
    /// Period totals.
    pub summary: PeriodSummary,
    /// Recoverable data problems.
    pub diagnostics: Vec<Diagnostic>,
}

impl PeriodOutcome {
    /// Looks up one employee's outcome.
    pub fn employee(&self, employee_id: &str) -> Option<&EmployeeOutcome> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    /// Builds the snapshot the next period needs, with explicit counters.
    pub fn next_snapshot(&self) -> PreviousSnapshot {
        PreviousSnapshot {
            period: Some(self.period),
            counter_version: CURRENT_COUNTER_VERSION,
            payouts: self
                .employees
                .iter()
                .map(|employee| PreviousPayout {
                    employee_id: employee.employee_id.clone(),
                    amount: employee.amount,
                    continuous_months: Some(employee.continuous_months),
                })
                .collect(),
        }
    }
}
