//! Continuous qualifying-month reconstruction.
//!
//! The month count drives every progression lookup. It comes from the
//! explicit counter in the previous snapshot when that snapshot carries
//! trustworthy counters, and otherwise from matching last period's amount
//! against the category's schedule.

use rust_decimal::Decimal;

use crate::models::{
    AuditStep, Diagnostic, DiagnosticCode, MAX_CONTINUOUS_MONTHS, MonthSource, PreviousPayout,
    Severity,
};

use super::AmountSchedule;

/// The result of reconstructing an employee's continuous months.
#[derive(Debug, Clone)]
pub struct ContinuousMonthsResult {
    /// Continuous qualifying months including this period (0 when ineligible).
    pub months: u32,
    /// Month count at the end of last period, when it could be recovered.
    pub previous_months: Option<u32>,
    /// How `months` was derived.
    pub source: MonthSource,
    /// Month count for next period if the employee qualifies again.
    pub next_month_expected: u32,
    /// A data-quality note, if the derivation was not clean.
    pub diagnostic: Option<Diagnostic>,
    /// The audit step recording this derivation.
    pub audit_step: AuditStep,
}

/// Reconstructs the continuous qualifying-month count for one employee.
///
/// # Rules
///
/// 1. Not eligible: 0 (reset).
/// 2. No previous payout, or a zero amount: 1.
/// 3. Trusted counter `n`, clamped to 15: `min(n + 1, 15)`.
/// 4. Otherwise the previous amount is matched against the schedule. A unique
///    match `n` gives `min(n + 1, 15)`; several matches take the smallest and
///    are reported; no match restarts at 1 and is reported.
/// 5. Untracked schedules without a counter restart at 1.
///
/// # Example
///
/// ```no_run
/// use incentive_engine::calculation::{reconstruct_continuous_months, AmountSchedule};
/// use incentive_engine::config::ConfigLoader;
/// use incentive_engine::models::{PositionCategory, PreviousPayout};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/qip").unwrap();
/// let schedule = AmountSchedule::for_category(
///     PositionCategory::Inspector,
///     loader.config().progression(),
///     false,
/// );
/// let previous = PreviousPayout {
///     employee_id: "E001".to_string(),
///     amount: Decimal::from(300_000),
///     continuous_months: None,
/// };
///
/// let result = reconstruct_continuous_months("E001", true, Some(&previous), false, &schedule, 1);
/// assert_eq!(result.months, 4);
/// ```
pub fn reconstruct_continuous_months(
    employee_id: &str,
    eligible: bool,
    previous: Option<&PreviousPayout>,
    counters_trusted: bool,
    schedule: &AmountSchedule<'_>,
    step_number: u32,
) -> ContinuousMonthsResult {
    let previous_amount = previous.map(|p| p.amount).unwrap_or(Decimal::ZERO);
    let counter = if counters_trusted {
        previous.and_then(|p| p.continuous_months)
    } else {
        None
    };

    let (months, previous_months, source, diagnostic, reasoning) = if !eligible {
        (
            0,
            counter,
            MonthSource::Reset,
            None,
            "Not eligible this period; continuous months reset to 0".to_string(),
        )
    } else if previous_amount <= Decimal::ZERO {
        (
            1,
            previous.map(|_| 0),
            MonthSource::FirstMonth,
            None,
            "No previous payout; first qualifying month".to_string(),
        )
    } else if let Some(recorded) = counter {
        let n = recorded.min(MAX_CONTINUOUS_MONTHS);
        let diagnostic = if recorded > MAX_CONTINUOUS_MONTHS {
            Some(Diagnostic::for_employee(
                DiagnosticCode::CounterOutOfRange,
                employee_id,
                Severity::High,
                format!(
                    "Recorded counter {} exceeds {}; clamped",
                    recorded, MAX_CONTINUOUS_MONTHS
                ),
            ))
        } else {
            (n > 0
                && schedule.is_tracked()
                && !schedule.months_for(previous_amount).contains(&n))
            .then(|| {
                Diagnostic::for_employee(
                    DiagnosticCode::CounterAmountMismatch,
                    employee_id,
                    Severity::Low,
                    format!(
                        "Recorded counter {} does not match previous amount {}",
                        n, previous_amount
                    ),
                )
            })
        };
        (
            advance(n),
            Some(n),
            MonthSource::Counter,
            diagnostic,
            format!("Previous snapshot recorded {} continuous months", n),
        )
    } else if !schedule.is_tracked() {
        (
            1,
            None,
            MonthSource::Untracked,
            Some(Diagnostic::for_employee(
                DiagnosticCode::UntrackedContinuity,
                employee_id,
                Severity::Low,
                "No continuous-month counter for a rollup category; restarting at 1",
            )),
            "Rollup amounts do not encode a month count; restarting at 1".to_string(),
        )
    } else {
        let matches = schedule.months_for(previous_amount);
        match matches.as_slice() {
            [] => (
                1,
                None,
                MonthSource::NoMatch,
                Some(Diagnostic::for_employee(
                    DiagnosticCode::ReverseLookupNoMatch,
                    employee_id,
                    Severity::Medium,
                    format!(
                        "Previous amount {} matches no month in the schedule",
                        previous_amount
                    ),
                )),
                format!(
                    "Previous amount {} not found in schedule; restarting at 1",
                    previous_amount
                ),
            ),
            [n] => (
                advance(*n),
                Some(*n),
                MonthSource::ReverseLookup,
                None,
                format!("Previous amount {} corresponds to month {}", previous_amount, n),
            ),
            [n, ..] => (
                advance(*n),
                Some(*n),
                MonthSource::Ambiguous,
                Some(Diagnostic::for_employee(
                    DiagnosticCode::ReverseLookupAmbiguous,
                    employee_id,
                    Severity::Low,
                    format!(
                        "Previous amount {} matches months {:?}; using {}",
                        previous_amount, matches, n
                    ),
                )),
                format!(
                    "Previous amount {} matches months {:?}; smallest ({}) used",
                    previous_amount, matches, n
                ),
            ),
        }
    };

    let next_month_expected = if eligible { advance(months) } else { 1 };

    let audit_step = AuditStep {
        step_number,
        rule_id: "continuous_months".to_string(),
        rule_name: "Continuous Month Reconstruction".to_string(),
        input: serde_json::json!({
            "eligible": eligible,
            "previous_amount": previous_amount.to_string(),
            "previous_counter": previous.and_then(|p| p.continuous_months),
            "counters_trusted": counters_trusted
        }),
        output: serde_json::json!({
            "months": months,
            "source": source,
            "next_month_expected": next_month_expected
        }),
        reasoning,
    };

    ContinuousMonthsResult {
        months,
        previous_months,
        source,
        next_month_expected,
        diagnostic,
        audit_step,
    }
}

fn advance(months: u32) -> u32 {
    months.saturating_add(1).min(MAX_CONTINUOUS_MONTHS)
}
