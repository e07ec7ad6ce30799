//! Cross-period consecutive-failure detection.
//!
//! Looks at the audit exports for the current period and the two before it,
//! drops records whose period marker disagrees with their export, and tags
//! every employee and work area that failed in consecutive periods.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;

use crate::models::{
    AuditBatch, AuditRecord, AuditResult, ConsecutiveFailure, ConsecutiveFailureEntry,
    ConsecutiveFailureRoster, Diagnostic, DiagnosticCode, FailureScope, Period, Severity,
};

use super::normalize_area;

/// Audit counts for one employee or area in the current period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditCounts {
    /// Records counted.
    pub audits: u32,
    /// Failed records.
    pub failures: u32,
}

impl AuditCounts {
    /// Failures as a percentage of audits (two decimal places), `None` with
    /// no audits.
    pub fn reject_rate(&self) -> Option<Decimal> {
        if self.audits == 0 {
            return None;
        }
        let rate =
            Decimal::from(self.failures) * Decimal::ONE_HUNDRED / Decimal::from(self.audits);
        Some(rate.round_dp(2))
    }

    fn record(&mut self, result: AuditResult) {
        self.audits += 1;
        if result == AuditResult::Fail {
            self.failures += 1;
        }
    }
}

/// Output of the consecutive-failure detector.
#[derive(Debug, Clone, Default)]
pub struct AuditHistory {
    /// Tag per employee, for every employee with any record in the window.
    pub employee_tags: BTreeMap<String, ConsecutiveFailure>,
    /// Tag per normalised area.
    pub area_tags: BTreeMap<String, ConsecutiveFailure>,
    /// Current-period counts per employee.
    pub employee_counts: BTreeMap<String, AuditCounts>,
    /// Current-period counts per normalised area.
    pub area_counts: BTreeMap<String, AuditCounts>,
    /// Records that survived validation, oldest period first.
    pub records: Vec<AuditRecord>,
    /// Tagged employees and areas plus the excluded-record count.
    pub roster: ConsecutiveFailureRoster,
    /// Missing exports and dropped records.
    pub diagnostics: Vec<Diagnostic>,
}

impl AuditHistory {
    /// Tag for an employee, `None` when never tagged.
    pub fn employee_tag(&self, employee_id: &str) -> ConsecutiveFailure {
        self.employee_tags
            .get(employee_id)
            .copied()
            .unwrap_or_default()
    }

    /// Current-period counts for an employee.
    pub fn employee_counts(&self, employee_id: &str) -> AuditCounts {
        self.employee_counts
            .get(employee_id)
            .copied()
            .unwrap_or_default()
    }

    /// Current-period reject rate of a normalised area.
    pub fn area_reject_rate(&self, area: &str) -> Option<Decimal> {
        self.area_counts.get(area).and_then(AuditCounts::reject_rate)
    }

    /// The employee's most recent record that names a work area.
    pub fn latest_record_with_area(&self, employee_id: &str) -> Option<&AuditRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| record.employee_id == employee_id && record.work_area.is_some())
    }
}

/// Detects consecutive audit failures ending in `period`.
///
/// # Example
///
/// ```
/// use incentive_engine::calculation::detect_consecutive_failures;
/// use incentive_engine::models::{AuditBatch, AuditRecord, AuditResult, Period};
///
/// let period = Period::new(2025, 10).unwrap();
/// let batch = |p: Period, result| AuditBatch {
///     period: p,
///     records: vec![AuditRecord {
///         employee_id: "E001".to_string(),
///         period: p,
///         work_area: Some("B1".to_string()),
///         position: None,
///         result,
///     }],
/// };
///
/// let history = detect_consecutive_failures(
///     period,
///     &[
///         batch(period.previous().previous(), AuditResult::Pass),
///         batch(period.previous(), AuditResult::Fail),
///         batch(period, AuditResult::Fail),
///     ],
/// );
/// assert_eq!(history.employee_tag("E001").streak_months(), 2);
/// ```
pub fn detect_consecutive_failures(period: Period, batches: &[AuditBatch]) -> AuditHistory {
    let window = [period.previous().previous(), period.previous(), period];
    let mut history = AuditHistory::default();

    let mut employee_failures: [HashSet<String>; 3] = Default::default();
    let mut area_failures: [HashSet<String>; 3] = Default::default();
    let mut seen_employees: HashSet<String> = HashSet::new();
    let mut seen_areas: HashSet<String> = HashSet::new();
    let mut excluded = 0usize;

    for (slot, window_period) in window.iter().enumerate() {
        let period_batches: Vec<&AuditBatch> = batches
            .iter()
            .filter(|batch| batch.period == *window_period)
            .collect();

        if period_batches.is_empty() {
            history.diagnostics.push(Diagnostic::general(
                DiagnosticCode::MissingAuditPeriod,
                Severity::Medium,
                format!("No audit export supplied for {}", window_period),
            ));
            continue;
        }

        for batch in period_batches {
            let mut dropped = 0usize;
            for record in &batch.records {
                if record.period != batch.period {
                    dropped += 1;
                    continue;
                }

                let area = record.work_area.as_deref().and_then(normalize_area);
                seen_employees.insert(record.employee_id.clone());
                if let Some(area) = &area {
                    seen_areas.insert(area.clone());
                }

                if record.result == AuditResult::Fail {
                    employee_failures[slot].insert(record.employee_id.clone());
                    if let Some(area) = &area {
                        area_failures[slot].insert(area.clone());
                    }
                }

                if slot == 2 {
                    history
                        .employee_counts
                        .entry(record.employee_id.clone())
                        .or_default()
                        .record(record.result);
                    if let Some(area) = area {
                        history.area_counts.entry(area).or_default().record(record.result);
                    }
                }

                history.records.push(record.clone());
            }

            if dropped > 0 {
                excluded += dropped;
                history.diagnostics.push(Diagnostic::general(
                    DiagnosticCode::AuditPeriodMismatch,
                    Severity::Low,
                    format!(
                        "Dropped {} record(s) from the {} export carrying another period marker",
                        dropped, batch.period
                    ),
                ));
            }
        }
    }

    for employee_id in seen_employees {
        let tag = classify(&window, |slot| employee_failures[slot].contains(&employee_id));
        history.employee_tags.insert(employee_id, tag);
    }
    for area in seen_areas {
        let tag = classify(&window, |slot| area_failures[slot].contains(&area));
        history.area_tags.insert(area, tag);
    }

    history.roster = ConsecutiveFailureRoster {
        employees: tagged_entries(&history.employee_tags, FailureScope::Employee),
        areas: tagged_entries(&history.area_tags, FailureScope::Area),
        excluded_records: excluded,
    };

    history
}

fn classify(window: &[Period; 3], failed: impl Fn(usize) -> bool) -> ConsecutiveFailure {
    match (failed(0), failed(1), failed(2)) {
        (true, true, true) => ConsecutiveFailure::ThreeConsecutive { periods: *window },
        (false, true, true) => ConsecutiveFailure::TwoConsecutive {
            periods: [window[1], window[2]],
        },
        _ => ConsecutiveFailure::None,
    }
}

fn tagged_entries(
    tags: &BTreeMap<String, ConsecutiveFailure>,
    scope: FailureScope,
) -> Vec<ConsecutiveFailureEntry> {
    tags.iter()
        .filter(|(_, failure)| failure.is_tagged())
        .map(|(subject, failure)| ConsecutiveFailureEntry {
            subject: subject.clone(),
            scope,
            failure: *failure,
        })
        .collect()
}
