//! HTTP request handlers for the incentive engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::run_period;
use crate::models::{Period, PeriodInputs, Severity};

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, CalculationResponse, PolicyResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/policies/:period", get(policy_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts the input tables for one period and returns the period outcome
/// together with the snapshot for the next period.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let include_trace = request.include_trace;
    let inputs: PeriodInputs = request.into();
    let period = inputs.period;
    let config = state.config();

    let start_time = Instant::now();
    match run_period(config.config(), &inputs) {
        Ok(mut outcome) => {
            let duration = start_time.elapsed();
            let high_severity = outcome
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::High)
                .count();
            info!(
                correlation_id = %correlation_id,
                period = %period,
                employees = outcome.employees.len(),
                eligible = outcome.summary.eligible_employees,
                total_amount = %outcome.summary.total_amount,
                diagnostics = outcome.diagnostics.len(),
                high_severity,
                duration_us = duration.as_micros(),
                "Calculation completed successfully"
            );

            let next_snapshot = outcome.next_snapshot();
            if !include_trace {
                for employee in &mut outcome.employees {
                    employee.trace.clear();
                }
            }

            let program = config.program();
            json_response(
                StatusCode::OK,
                CalculationResponse {
                    run_id: correlation_id,
                    calculated_at: Utc::now(),
                    engine_version: env!("CARGO_PKG_VERSION").to_string(),
                    program: program.code.clone(),
                    currency: program.currency.clone(),
                    outcome,
                    next_snapshot,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                period = %period,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /policies/:period endpoint.
///
/// Returns the policy in force for a period and how its thresholds differ
/// from the policy before it.
async fn policy_handler(
    State(state): State<AppState>,
    Path(raw_period): Path<String>,
) -> impl IntoResponse {
    let period: Period = match raw_period.parse() {
        Ok(period) => period,
        Err(err) => {
            warn!(period = %raw_period, error = %err, "Invalid period in path");
            return error_response(err.into());
        }
    };

    let config = state.config().config();
    match config.policy_for(period) {
        Ok(policy) => {
            let previous = config
                .policies()
                .iter()
                .rev()
                .find(|p| p.effective_date < policy.effective_date);
            json_response(StatusCode::OK, PolicyResponse::new(period, policy, previous))
        }
        Err(err) => {
            warn!(period = %period, error = %err, "Policy lookup failed");
            error_response(err.into())
        }
    }
}
