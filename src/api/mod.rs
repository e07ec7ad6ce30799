//! HTTP API module for the incentive engine.
//!
//! This module provides the REST endpoints for running a period calculation
//! and for inspecting the policy in force for a period.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, CalculationResponse, CategoryConditions, PolicyResponse};
pub use state::AppState;
