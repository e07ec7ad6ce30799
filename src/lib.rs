//! Quality Inspection Incentive Engine
//!
//! This crate calculates the monthly incentive for quality-inspection staff.
//! For each period it evaluates up to ten eligibility conditions per employee,
//! reconstructs how many months in a row each employee has qualified, looks
//! the amount up on the category's progression table and rolls amounts up the
//! reporting hierarchy to line leaders and upper management.
//!
//! Thresholds and condition applicability are versioned by effective date and
//! loaded from YAML (see [`config::ConfigLoader`]). [`calculation::run_period`]
//! is the entry point; [`api::create_router`] exposes it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
