//! Request types for the incentive engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::{
    AttendanceRecord, AuditBatch, InspectionRecord, Period, PeriodInputs, PreviousSnapshot,
    RosterEntry,
};

/// Request body for the `/calculate` endpoint.
///
/// Carries the input tables for one period. Only `period` and `roster` are
/// required; the other tables default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The period to calculate, as `YYYY-MM`.
    pub period: Period,
    /// Configured working days for the period, if known.
    #[serde(default)]
    pub working_days: Option<u32>,
    /// Roster snapshot.
    pub roster: Vec<RosterEntry>,
    /// Attendance aggregates.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Audit exports for the period and the two before it.
    #[serde(default)]
    pub audits: Vec<AuditBatch>,
    /// Inspection-throughput rows.
    #[serde(default)]
    pub inspections: Vec<InspectionRecord>,
    /// Previous period's payouts.
    #[serde(default)]
    pub previous: PreviousSnapshot,
    /// Include per-employee audit traces in the response.
    #[serde(default = "default_include_trace")]
    pub include_trace: bool,
}

fn default_include_trace() -> bool {
    true
}

impl From<CalculationRequest> for PeriodInputs {
    fn from(req: CalculationRequest) -> Self {
        PeriodInputs {
            period: req.period,
            working_days: req.working_days,
            roster: req.roster,
            attendance: req.attendance,
            audits: req.audits,
            inspections: req.inspections,
            previous: req.previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_calculation_request() {
        let json = r#"{
            "period": "2025-10",
            "working_days": 26,
            "roster": [
                {
                    "employee_id": "E001",
                    "name": "Nguyen Van A",
                    "role_tier": "TYPE-1",
                    "position": "ASSEMBLY INSPECTOR",
                    "boss": "Tran Thi B",
                    "work_area": "B1"
                }
            ],
            "attendance": [
                {"employee_id": "E001", "actual_days": 26, "total_days": 26}
            ],
            "previous": {
                "period": "2025-09",
                "payouts": [{"employee_id": "E001", "amount": "300000"}]
            }
        }"#;

        let request: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.period, Period::new(2025, 10).unwrap());
        assert_eq!(request.roster.len(), 1);
        assert_eq!(request.roster[0].boss.as_deref(), Some("Tran Thi B"));
        assert!(request.audits.is_empty());
        assert!(request.include_trace);
        assert_eq!(request.previous.payouts.len(), 1);
    }

    #[test]
    fn test_request_without_roster_is_rejected() {
        let result = serde_json::from_str::<CalculationRequest>(r#"{"period": "2025-10"}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("missing field `roster`"));
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let result =
            serde_json::from_str::<CalculationRequest>(r#"{"period": "2025-13", "roster": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_conversion_to_period_inputs() {
        let request: CalculationRequest = serde_json::from_str(
            r#"{"period": "2025-10", "roster": [], "include_trace": false}"#,
        )
        .unwrap();
        assert!(!request.include_trace);

        let inputs: PeriodInputs = request.into();
        assert_eq!(inputs.period, Period::new(2025, 10).unwrap());
        assert_eq!(inputs.working_days, None);
        assert!(!inputs.previous.counters_trusted());
    }
}
