//! Core data models for the incentive engine.
//!
//! Inputs arrive as plain tables (roster, attendance,
//! audit batches, inspections, previous snapshot), are assembled into
//! [`EmployeeRecord`]s, and leave as a [`PeriodOutcome`].

mod audit;
mod condition;
mod diagnostic;
mod employee;
mod inputs;
mod outcome;
mod period;
mod position;
mod progression;

pub use audit::{ConsecutiveFailure, ConsecutiveFailureEntry, ConsecutiveFailureRoster, FailureScope};
pub use condition::{ConditionId, ConditionOutcome, ConditionResult, ConditionSummary};
pub use diagnostic::{AuditStep, Diagnostic, DiagnosticCode, Severity};
pub use employee::{
    AreaConflict, AreaSource, AuditAggregate, EmployeeRecord, InspectionAggregate, Reconciled,
};
pub use inputs::{
    AttendanceRecord, AuditBatch, AuditRecord, AuditResult, InspectionRecord, PeriodInputs,
    PreviousPayout, PreviousSnapshot, RosterEntry, CURRENT_COUNTER_VERSION,
};
pub use outcome::{
    AmountBreakdown, ConditionStats, EmployeeOutcome, FailureAlert, ManagerRef, MonthSource,
    PeriodOutcome, PeriodSummary, SummaryBreakdown,
};
pub use period::Period;
pub use position::{normalize_title, CategoryKind, PositionCategory, RoleTier};
pub use progression::{ProgressionTable, MAX_CONTINUOUS_MONTHS};
