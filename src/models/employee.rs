//! The assembled per-employee view.
//!
//! An [`EmployeeRecord`] joins a roster row with its attendance, audit,
//! inspection and previous-payout data. Records are built once per period and
//! read by every later stage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AttendanceRecord, ConsecutiveFailure, Period, PositionCategory, PreviousPayout, RoleTier};

/// Where a reconciled value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaSource {
    /// The roster snapshot.
    Roster,
    /// The employee's most recent audit record.
    AuditHistory,
}

/// The roster and audit history disagree on an employee's work area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaConflict {
    /// Employee number.
    pub employee_id: String,
    /// Raw roster area.
    pub roster_area: String,
    /// Raw audit-history area.
    pub audit_area: String,
    /// Position title on the roster.
    pub roster_position: String,
    /// Position recorded by the audit system.
    pub audit_position: Option<String>,
}

/// A value that can come from more than one source.
///
/// # Example
///
/// ```
/// use incentive_engine::models::{AreaSource, Reconciled};
///
/// let area = Reconciled::from_roster("B1".to_string());
/// assert_eq!(area.value, "B1");
/// assert_eq!(area.source, AreaSource::Roster);
/// assert!(!area.has_conflict());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciled<T> {
    /// The chosen, normalised value.
    pub value: T,
    /// Which source supplied it.
    pub source: AreaSource,
    /// Set when both sources had a value and they disagreed.
    pub conflict: Option<AreaConflict>,
}

impl<T> Reconciled<T> {
    /// A roster value with no conflict.
    pub fn from_roster(value: T) -> Self {
        Self {
            value,
            source: AreaSource::Roster,
            conflict: None,
        }
    }

    /// Returns true if the sources disagreed.
    pub fn has_conflict(&self) -> bool {
        self.conflict.is_some()
    }
}

/// Defect-audit figures for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAggregate {
    /// Failed audits attributed to the employee this period.
    pub failures: u32,
    /// All audits attributed to the employee this period.
    pub audits: u32,
    /// Personal consecutive-failure tag.
    pub consecutive: ConsecutiveFailure,
    /// Reject rate of the employee's work area this period, as a percentage.
    pub area_reject_rate: Option<Decimal>,
}

/// Inspection throughput for one inspector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionAggregate {
    /// Pairs inspected.
    pub inspected_qty: u64,
    /// Pairs passed.
    pub pass_qty: u64,
}

impl InspectionAggregate {
    /// Pass rate as a percentage (two decimal places), `None` when nothing
    /// was inspected.
    ///
    /// # Example
    ///
    /// ```
    /// use incentive_engine::models::InspectionAggregate;
    /// use rust_decimal::Decimal;
    ///
    /// let inspection = InspectionAggregate { inspected_qty: 200, pass_qty: 193 };
    /// assert_eq!(inspection.pass_rate(), Some(Decimal::new(9650, 2)));
    /// ```
    pub fn pass_rate(&self) -> Option<Decimal> {
        if self.inspected_qty == 0 {
            return None;
        }
        let rate = Decimal::from(self.pass_qty) * Decimal::ONE_HUNDRED
            / Decimal::from(self.inspected_qty);
        Some(rate.round_dp(2))
    }
}

/// Everything known about one employee for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Employee number.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Parsed role tier, `None` when the roster value was not recognised.
    pub role_tier: Option<RoleTier>,
    /// Raw position title.
    pub position: String,
    /// Classified category.
    pub category: PositionCategory,
    /// Raw boss reference from the roster.
    pub boss_reference: Option<String>,
    /// Reconciled work area.
    pub work_area: Option<Reconciled<String>>,
    /// Date the employee joined.
    pub hire_date: Option<NaiveDate>,
    /// Date the employee stopped working.
    pub termination_date: Option<NaiveDate>,
    /// On protected leave this period.
    pub protected_leave: bool,
    /// Holds the specialist certification.
    pub certified: bool,
    /// Attendance, if a row was supplied.
    pub attendance: Option<AttendanceRecord>,
    /// Audit figures.
    pub audit: AuditAggregate,
    /// Inspection throughput, if any rows were supplied.
    pub inspection: Option<InspectionAggregate>,
    /// Previous period's payout, if any.
    pub previous: Option<PreviousPayout>,
}

impl EmployeeRecord {
    /// Returns true if the employee left on or before the end of `period`.
    pub fn is_terminated(&self, period: Period) -> bool {
        self.termination_date
            .is_some_and(|date| date <= period.last_day())
    }

    /// Returns true if the employee counts towards rollup averages.
    pub fn counts_for_rollup(&self, period: Period) -> bool {
        !self.is_terminated(period) && !self.protected_leave
    }

    /// The normalised work area, if known.
    pub fn area(&self) -> Option<&str> {
        self.work_area.as_ref().map(|area| area.value.as_str())
    }
}
