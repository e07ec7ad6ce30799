//! Configuration loading and management for the incentive engine.
//!
//! This module provides functionality to load the program configuration from
//! YAML files, including progression tables, rollup settings and the
//! effective-dated eligibility policies.
//!
//! # Example
//!
//! ```no_run
//! use incentive_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/qip").unwrap();
//! println!("Loaded program: {}", config.program().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    IncentiveConfig, LineLeaderRollup, PeriodPolicy, ProgramMetadata, ProgressionConfig,
    RollupConfig, SpecialistConfig, ThresholdSet, UpperManagementRollup,
};
