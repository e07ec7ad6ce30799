//! Audit trace and diagnostic models.
//!
//! Every calculation step records an [`AuditStep`] explaining its inputs and
//! decision. Data-quality problems that do not stop the run are reported as
//! [`Diagnostic`]s.

use serde::{Deserialize, Serialize};

/// A single step in an employee's audit trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number within the employee's trace.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Machine-readable diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Tier or title could not be mapped to a category.
    UnclassifiedPosition,
    /// No attendance row for a rostered employee.
    MissingAttendance,
    /// Attendance total days disagree with the configured working days.
    WorkingDaysMismatch,
    /// Boss reference matched nobody.
    UnresolvedManager,
    /// Boss reference matched several employees.
    AmbiguousManager,
    /// Boss reference points at the employee.
    SelfReportingManager,
    /// Previous amount matched no month in the schedule.
    ReverseLookupNoMatch,
    /// Previous amount matched several months in the schedule.
    ReverseLookupAmbiguous,
    /// Recorded counter disagrees with the previous amount.
    CounterAmountMismatch,
    /// Recorded counter is larger than the progression cap.
    CounterOutOfRange,
    /// Previous snapshot has several rows for one employee.
    DuplicatePayout,
    /// Continuity for a rollup category restarted without a counter.
    UntrackedContinuity,
    /// Audit records dropped for carrying a different period marker.
    AuditPeriodMismatch,
    /// An audit batch for one of the three periods was not supplied.
    MissingAuditPeriod,
    /// Line leader without eligible direct reports.
    NoReports,
    /// Upper manager fell back to the pooled line-lead average.
    PooledAverageFallback,
    /// No line-lead average available at all.
    NoLineLeadAverage,
    /// Roster and audit history disagree on the work area.
    WorkAreaConflict,
    /// Neither source has a work area.
    MissingWorkArea,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Likely affects a payout.
    Medium,
    /// Payout is unreliable until the data is fixed.
    High,
}

/// A recoverable problem found while calculating a period.
///
/// # Example
///
/// ```
/// use incentive_engine::models::{Diagnostic, DiagnosticCode, Severity};
///
/// let diagnostic = Diagnostic::for_employee(
///     DiagnosticCode::MissingAttendance,
///     "E001",
///     Severity::Medium,
///     "no attendance row",
/// );
/// assert_eq!(diagnostic.employee_id.as_deref(), Some("E001"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What kind of problem.
    pub code: DiagnosticCode,
    /// The affected employee, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// How serious it is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic tied to one employee.
    pub fn for_employee(
        code: DiagnosticCode,
        employee_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            employee_id: Some(employee_id.into()),
            severity,
            message: message.into(),
        }
    }

    /// A diagnostic about the period as a whole.
    pub fn general(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            employee_id: None,
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&DiagnosticCode::ReverseLookupNoMatch).unwrap(),
            "\"REVERSE_LOOKUP_NO_MATCH\""
        );
    }

    #[test]
    fn test_general_diagnostic_omits_employee() {
        let diagnostic = Diagnostic::general(
            DiagnosticCode::MissingAuditPeriod,
            Severity::Medium,
            "no audit batch for 2025-08",
        );
        let json = serde_json::to_string(&diagnostic).unwrap();
        assert!(!json.contains("employee_id"));
        assert!(json.contains("\"severity\":\"medium\""));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
