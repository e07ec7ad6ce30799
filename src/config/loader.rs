//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the incentive
//! program configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{Period, PositionCategory};

use super::types::{
    IncentiveConfig, PeriodPolicy, ProgramMetadata, ProgressionConfig, RollupConfig,
};

/// Loads and provides access to the incentive configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and resolves the policy that applies to each period.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/qip/
/// ├── program.yaml      # Program metadata
/// ├── progression.yaml  # Progression tables and specialist settings
/// ├── rollup.yaml       # Line-lead share and management multipliers
/// └── policies/
///     ├── 2025-07-01.yaml  # Thresholds effective from this date
///     └── 2025-11-01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use incentive_engine::config::ConfigLoader;
/// use incentive_engine::models::Period;
///
/// let loader = ConfigLoader::load("./config/qip").unwrap();
/// let policy = loader.policy_for(Period::new(2025, 11).unwrap()).unwrap();
/// println!("Streak limit: {}", policy.thresholds.consecutive_failure_months);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: IncentiveConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, any file contains
    /// invalid YAML, a progression table is malformed, or a policy fails
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<ProgramMetadata>(&path.join("program.yaml"))?;
        let progression = Self::load_yaml::<ProgressionConfig>(&path.join("progression.yaml"))?;

        let rollup_path = path.join("rollup.yaml");
        let rollup = Self::load_yaml::<RollupConfig>(&rollup_path)?;
        Self::validate_rollup(&rollup, &rollup_path)?;

        let policies = Self::load_policies(&path.join("policies"))?;

        let config = IncentiveConfig::new(metadata, progression, rollup, policies);
        Self::log_policy_transitions(config.policies());

        info!(
            program = %config.program().code,
            version = %config.program().version,
            policies = config.policies().len(),
            "Loaded incentive configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all policy files from the policies directory.
    fn load_policies(policies_dir: &Path) -> EngineResult<Vec<PeriodPolicy>> {
        let policies_dir_str = policies_dir.display().to_string();

        if !policies_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: policies_dir_str,
            });
        }

        let entries = fs::read_dir(policies_dir).map_err(|_| EngineError::ConfigNotFound {
            path: policies_dir_str.clone(),
        })?;

        let mut policies = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: policies_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let policy = Self::load_yaml::<PeriodPolicy>(&path)?;
                Self::validate_policy(&policy, &path)?;
                debug!(
                    path = %path.display(),
                    effective_date = %policy.effective_date,
                    "Loaded policy file"
                );
                policies.push(policy);
            }
        }

        if policies.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no policy files found)", policies_dir_str),
            });
        }

        Ok(policies)
    }

    fn validate_policy(policy: &PeriodPolicy, path: &Path) -> EngineResult<()> {
        let invalid = |message: String| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message,
        };

        let streak = policy.thresholds.consecutive_failure_months;
        if streak != 2 && streak != 3 {
            return Err(invalid(format!(
                "consecutive_failure_months must be 2 or 3, found {}",
                streak
            )));
        }

        if let Some(missing) = PositionCategory::ENTITLED
            .iter()
            .find(|category| !policy.applicable_conditions.contains_key(*category))
        {
            return Err(invalid(format!(
                "applicable_conditions has no entry for '{}'",
                missing.as_str()
            )));
        }

        Ok(())
    }

    fn validate_rollup(rollup: &RollupConfig, path: &Path) -> EngineResult<()> {
        if let Some(missing) = PositionCategory::UPPER_MANAGEMENT
            .iter()
            .find(|category| rollup.multiplier(**category).is_none())
        {
            return Err(EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: format!("no multiplier for '{}'", missing.as_str()),
            });
        }
        Ok(())
    }

    fn log_policy_transitions(policies: &[PeriodPolicy]) {
        for pair in policies.windows(2) {
            let changes = pair[1].thresholds.changes_from(&pair[0].thresholds);
            if !changes.is_empty() {
                info!(
                    effective_date = %pair[1].effective_date,
                    changes = %changes.join(", "),
                    "Policy thresholds change"
                );
            }
        }
    }

    /// Returns the underlying incentive configuration.
    pub fn config(&self) -> &IncentiveConfig {
        &self.config
    }

    /// Returns the program metadata.
    pub fn program(&self) -> &ProgramMetadata {
        self.config.program()
    }

    /// Gets the policy effective for a period.
    ///
    /// The method finds the most recent policy that is effective on or
    /// before the first day of the period.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use incentive_engine::config::ConfigLoader;
    /// use incentive_engine::models::Period;
    ///
    /// let loader = ConfigLoader::load("./config/qip")?;
    /// let policy = loader.policy_for("2025-10".parse()?)?;
    /// println!("Effective from {}", policy.effective_date);
    /// # Ok::<(), incentive_engine::error::EngineError>(())
    /// ```
    pub fn policy_for(&self, period: Period) -> EngineResult<&PeriodPolicy> {
        self.config.policy_for(period)
    }
}
