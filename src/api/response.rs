//! Response types for the incentive engine API.
//!
//! This module defines the success bodies, the error response structures
//! and the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{PeriodPolicy, ThresholdSet};
use crate::error::EngineError;
use crate::models::{ConditionId, Period, PeriodOutcome, PositionCategory, PreviousSnapshot};

/// Response body for a successful `/calculate` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// Identifier of this run, also used as the log correlation id.
    pub run_id: Uuid,
    /// When the run was made.
    pub calculated_at: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Program code from the loaded configuration.
    pub program: String,
    /// Currency of every amount.
    pub currency: String,
    /// The period result.
    pub outcome: PeriodOutcome,
    /// Snapshot to send as `previous` when calculating the next period.
    pub next_snapshot: PreviousSnapshot,
}

/// Response body for `/policies/{period}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    /// The period asked about.
    pub period: Period,
    /// First day of the policy in force for that period.
    pub effective_date: NaiveDate,
    /// Thresholds in force.
    pub thresholds: ThresholdSet,
    /// Applicable conditions per category, sorted by category.
    pub applicable_conditions: Vec<CategoryConditions>,
    /// Threshold changes against the preceding policy, if any.
    pub changes_from_previous: Vec<String>,
}

/// The conditions that apply to one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConditions {
    /// The category.
    pub category: PositionCategory,
    /// Applicable condition numbers, ascending.
    pub conditions: Vec<ConditionId>,
}

impl PolicyResponse {
    /// Builds the response for `policy`, diffing against `previous` when given.
    pub fn new(period: Period, policy: &PeriodPolicy, previous: Option<&PeriodPolicy>) -> Self {
        let mut applicable_conditions: Vec<CategoryConditions> = policy
            .applicable_conditions
            .iter()
            .map(|(category, conditions)| CategoryConditions {
                category: *category,
                conditions: conditions.iter().copied().collect(),
            })
            .collect();
        applicable_conditions.sort_by_key(|entry| entry.category);

        Self {
            period,
            effective_date: policy.effective_date,
            thresholds: policy.thresholds.clone(),
            applicable_conditions,
            changes_from_previous: previous
                .map(|prev| policy.thresholds.changes_from(&prev.thresholds))
                .unwrap_or_default(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidProgressionTable { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::PolicyNotFound { period } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "POLICY_NOT_FOUND",
                    message,
                    format!("No policy file has an effective date on or before {}", period.first_day()),
                ),
            },
            EngineError::InvalidPeriod { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_PERIOD", message),
            },
            EngineError::InvalidInput { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
            EngineError::SnapshotMismatch { expected, .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "SNAPSHOT_MISMATCH",
                    message,
                    format!("Send the snapshot produced for {}", expected),
                ),
            },
            EngineError::CalculationError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_policy_not_found_is_404() {
        let api_error: ApiErrorResponse = EngineError::PolicyNotFound {
            period: Period::new(2020, 1).unwrap(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "POLICY_NOT_FOUND");
        assert!(api_error.error.details.unwrap().contains("2020-01-01"));
    }

    #[test]
    fn test_invalid_input_is_validation_error() {
        let api_error: ApiErrorResponse = EngineError::InvalidInput {
            field: "roster".to_string(),
            message: "employee 'E1' appears more than once".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "VALIDATION_ERROR");
        assert!(api_error.error.message.contains("E1"));
    }

    #[test]
    fn test_snapshot_mismatch_is_conflict() {
        let api_error: ApiErrorResponse = EngineError::SnapshotMismatch {
            expected: Period::new(2025, 9).unwrap(),
            found: Period::new(2025, 7).unwrap(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "SNAPSHOT_MISMATCH");
    }

    #[test]
    fn test_config_errors_are_internal() {
        let api_error: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "/missing".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "CONFIG_ERROR");
    }
}
