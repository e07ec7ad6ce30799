//! Calculation logic for the incentive engine.
//!
//! Each stage lives in its own module and returns its result together with
//! an [`AuditStep`](crate::models::AuditStep): consecutive-failure detection,
//! work-area reconciliation, the reporting graph, condition evaluation,
//! continuous-month reconstruction, individual amounts, hierarchy rollups
//! and the period summary. [`run_period`] chains them for one period.

mod audit_history;
mod conditions;
mod continuous_months;
mod hierarchy;
mod incentive;
mod location;
mod pipeline;
mod progression;
mod rollup;
mod summary;

pub use audit_history::{AuditCounts, AuditHistory, detect_consecutive_failures};
pub use conditions::{ConditionEvaluation, evaluate_conditions};
pub use continuous_months::{ContinuousMonthsResult, reconstruct_continuous_months};
pub use hierarchy::{ReportingGraph, ReportingGraphResult, normalize_name};
pub use incentive::{IncentiveResult, calculate_individual_incentive};
pub use location::{normalize_area, reconcile_work_area};
pub use pipeline::run_period;
pub use progression::{AmountSchedule, SpecialistParts};
pub use rollup::{
    calculate_line_leader_incentive, calculate_upper_management_incentive,
    pooled_line_lead_average, receiver_average,
};
pub use summary::summarize_period;
