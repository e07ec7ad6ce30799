//! Period input tables.
//!
//! These are the rows the ingestion layer hands to the engine for one period.
//! They are plain data; all derived values live on
//! [`EmployeeRecord`](super::EmployeeRecord).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;

/// Snapshot counter version that carries trustworthy continuous-month counters.
pub const CURRENT_COUNTER_VERSION: u32 = 1;

/// One row of the roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Employee number.
    pub employee_id: String,
    /// Full name, used to resolve other employees' boss references.
    pub name: String,
    /// Raw role tier (`TYPE-1`, `TYPE-2`, `TYPE-3`).
    pub role_tier: String,
    /// Raw position title.
    pub position: String,
    /// Self-reported direct boss, by name or employee number.
    #[serde(default)]
    pub boss: Option<String>,
    /// Work area from the roster (authoritative source).
    #[serde(default)]
    pub work_area: Option<String>,
    /// Date the employee joined.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Date the employee stopped working, if any.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// On protected leave (e.g. maternity) for this period.
    #[serde(default)]
    pub protected_leave: bool,
    /// Holds the registered certification that earns the specialist bonus.
    #[serde(default)]
    pub certified: bool,
}

/// Aggregated attendance for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Employee number.
    pub employee_id: String,
    /// Days actually worked.
    pub actual_days: u32,
    /// Working days in the period.
    pub total_days: u32,
    /// Unapproved absences.
    #[serde(default)]
    pub unapproved_absences: u32,
    /// Approved leave days (count as attended).
    #[serde(default)]
    pub approved_leave_days: u32,
}

impl AttendanceRecord {
    /// Working days the employee was expected to attend.
    pub fn expected_days(&self) -> i64 {
        i64::from(self.total_days) - i64::from(self.approved_leave_days)
    }

    /// Attendance rate as a percentage with two decimal places.
    ///
    /// Approved leave counts as attendance. Returns `None` when the employee
    /// was not expected to attend at all (e.g. a full month of approved leave).
    ///
    /// # Example
    ///
    /// ```
    /// use incentive_engine::models::AttendanceRecord;
    /// use rust_decimal::Decimal;
    ///
    /// let record = AttendanceRecord {
    ///     employee_id: "E001".to_string(),
    ///     actual_days: 20,
    ///     total_days: 25,
    ///     unapproved_absences: 2,
    ///     approved_leave_days: 3,
    /// };
    /// assert_eq!(record.attendance_rate(), Some(Decimal::from(92)));
    /// ```
    pub fn attendance_rate(&self) -> Option<Decimal> {
        if self.expected_days() <= 0 {
            return None;
        }

        let total = Decimal::from(self.total_days);
        let absent = (i64::from(self.total_days)
            - i64::from(self.actual_days)
            - i64::from(self.approved_leave_days))
        .max(0);
        let absence_rate = Decimal::from(absent) / total * Decimal::ONE_HUNDRED;

        Some((Decimal::ONE_HUNDRED - absence_rate).round_dp(2))
    }
}

/// Result of a single defect audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    /// The audited lot passed.
    Pass,
    /// The audited lot failed.
    Fail,
}

/// One defect-audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Inspector the audit is attributed to.
    pub employee_id: String,
    /// Period the record claims to belong to.
    pub period: Period,
    /// Work area recorded by the audit system.
    #[serde(default)]
    pub work_area: Option<String>,
    /// Position recorded by the audit system.
    #[serde(default)]
    pub position: Option<String>,
    /// Pass or fail.
    pub result: AuditResult,
}

/// The audit records exported for one source period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditBatch {
    /// The period this export was taken for.
    pub period: Period,
    /// The exported records.
    #[serde(default)]
    pub records: Vec<AuditRecord>,
}

/// One inspection-throughput row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
    /// Inspector the row is aggregated under.
    pub inspector_id: String,
    /// Pairs inspected.
    pub inspected_qty: u64,
    /// Pairs passed.
    pub pass_qty: u64,
}

/// Amount paid to an employee in the previous period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousPayout {
    /// Employee number.
    pub employee_id: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Continuous qualifying months at the end of that period, when recorded.
    #[serde(default)]
    pub continuous_months: Option<u32>,
}

/// The previous period's output, reduced to what the next period needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousSnapshot {
    /// The period the snapshot describes.
    #[serde(default)]
    pub period: Option<Period>,
    /// `0` for amount-only snapshots; [`CURRENT_COUNTER_VERSION`] when
    /// `continuous_months` counters are recorded.
    #[serde(default)]
    pub counter_version: u32,
    /// One entry per paid (or evaluated) employee.
    #[serde(default)]
    pub payouts: Vec<PreviousPayout>,
}

impl PreviousSnapshot {
    /// Returns true if the recorded counters can be used directly.
    pub fn counters_trusted(&self) -> bool {
        self.counter_version >= CURRENT_COUNTER_VERSION
    }
}

/// Everything the engine needs to calculate one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInputs {
    /// The period being calculated.
    pub period: Period,
    /// Configured working days, checked against attendance totals.
    #[serde(default)]
    pub working_days: Option<u32>,
    /// Roster snapshot.
    pub roster: Vec<RosterEntry>,
    /// Attendance aggregates.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Audit exports for this period and the two before it.
    #[serde(default)]
    pub audits: Vec<AuditBatch>,
    /// Inspection-throughput rows.
    #[serde(default)]
    pub inspections: Vec<InspectionRecord>,
    /// Previous period's payouts.
    #[serde(default)]
    pub previous: PreviousSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendance(actual: u32, total: u32, unapproved: u32, approved: u32) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "E001".to_string(),
            actual_days: actual,
            total_days: total,
            unapproved_absences: unapproved,
            approved_leave_days: approved,
        }
    }

    #[test]
    fn test_full_attendance_is_one_hundred() {
        assert_eq!(
            attendance(26, 26, 0, 0).attendance_rate(),
            Some(Decimal::ONE_HUNDRED)
        );
    }

    #[test]
    fn test_approved_leave_counts_as_attended() {
        assert_eq!(
            attendance(20, 26, 0, 6).attendance_rate(),
            Some(Decimal::ONE_HUNDRED)
        );
    }

    #[test]
    fn test_rate_rounds_to_two_places() {
        // 3 absent days of 26 = 11.538...% absence
        let rate = attendance(23, 26, 3, 0).attendance_rate().unwrap();
        assert_eq!(rate, Decimal::new(8846, 2));
    }

    #[test]
    fn test_full_leave_has_no_rate() {
        let record = attendance(0, 26, 0, 26);
        assert_eq!(record.expected_days(), 0);
        assert_eq!(record.attendance_rate(), None);
    }

    #[test]
    fn test_zero_working_days_has_no_rate() {
        assert_eq!(attendance(0, 0, 0, 0).attendance_rate(), None);
    }

    #[test]
    fn test_deserialize_roster_entry_defaults() {
        let json = r#"{
            "employee_id": "E001",
            "name": "Nguyen Van A",
            "role_tier": "TYPE-1",
            "position": "ASSEMBLY INSPECTOR"
        }"#;

        let entry: RosterEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.boss, None);
        assert!(!entry.protected_leave);
        assert!(!entry.certified);
    }

    #[test]
    fn test_snapshot_defaults_to_amount_only() {
        let snapshot: PreviousSnapshot =
            serde_json::from_str(r#"{"payouts": [{"employee_id": "E1", "amount": "300000"}]}"#)
                .unwrap();
        assert_eq!(snapshot.counter_version, 0);
        assert!(!snapshot.counters_trusted());
        assert_eq!(snapshot.payouts[0].continuous_months, None);
    }

    #[test]
    fn test_audit_record_deserializes_period_and_result() {
        let json = r#"{
            "employee_id": "E001",
            "period": "2025-10",
            "work_area": "B1",
            "result": "fail"
        }"#;
        let record: AuditRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.period, Period::new(2025, 10).unwrap());
        assert_eq!(record.result, AuditResult::Fail);
        assert_eq!(record.position, None);
    }
}
