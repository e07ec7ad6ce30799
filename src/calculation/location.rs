//! Work-area reconciliation.
//!
//! The roster and the audit system both record where an inspector works.
//! The roster wins; the audit side fills gaps and any disagreement is kept
//! as an [`AreaConflict`] for the discrepancy report.

use crate::models::{AreaConflict, AreaSource, AuditRecord, Reconciled};

/// Normalises a raw work-area string.
///
/// Trims, upper-cases and collapses whitespace, then cuts any sub-zone
/// suffix starting at `-`, `/` or `(`. Returns `None` when nothing is left.
///
/// # Example
///
/// ```
/// use incentive_engine::calculation::normalize_area;
///
/// assert_eq!(normalize_area("  b1 - line 3 ").as_deref(), Some("B1"));
/// assert_eq!(normalize_area("Assembly  Hall (north)").as_deref(), Some("ASSEMBLY HALL"));
/// assert_eq!(normalize_area(" / ").as_deref(), None);
/// ```
pub fn normalize_area(raw: &str) -> Option<String> {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    let cut = collapsed
        .split(['-', '/', '('])
        .next()
        .unwrap_or_default()
        .trim();

    if cut.is_empty() {
        None
    } else {
        Some(cut.to_string())
    }
}

/// Reconciles an employee's work area from the roster and their most recent
/// audit record.
pub fn reconcile_work_area(
    employee_id: &str,
    roster_area: Option<&str>,
    roster_position: &str,
    latest_audit: Option<&AuditRecord>,
) -> Option<Reconciled<String>> {
    let roster = roster_area.and_then(|raw| normalize_area(raw).map(|area| (raw, area)));
    let audit = latest_audit.and_then(|record| {
        record
            .work_area
            .as_deref()
            .and_then(|raw| normalize_area(raw).map(|area| (raw, area, record)))
    });

    match (roster, audit) {
        (Some((roster_raw, roster_value)), audit) => {
            let conflict = audit
                .filter(|(_, audit_value, _)| *audit_value != roster_value)
                .map(|(audit_raw, _, record)| AreaConflict {
                    employee_id: employee_id.to_string(),
                    roster_area: roster_raw.to_string(),
                    audit_area: audit_raw.to_string(),
                    roster_position: roster_position.to_string(),
                    audit_position: record.position.clone(),
                });

            Some(Reconciled {
                value: roster_value,
                source: AreaSource::Roster,
                conflict,
            })
        }
        (None, Some((_, audit_value, _))) => Some(Reconciled {
            value: audit_value,
            source: AreaSource::AuditHistory,
            conflict: None,
        }),
        (None, None) => None,
    }
}
