//! Configuration types for the incentive program.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{EngineError, EngineResult};
use crate::models::{ConditionId, ConsecutiveFailure, Period, PositionCategory, ProgressionTable};

/// Metadata about the incentive program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramMetadata {
    /// Short program code (e.g., "QIP").
    pub code: String,
    /// The human-readable name of the program.
    pub name: String,
    /// The version of the program rules.
    pub version: String,
    /// Currency all amounts are expressed in.
    pub currency: String,
}

fn default_attendance_rate() -> Decimal {
    Decimal::from(88)
}

fn default_unapproved_absence() -> u32 {
    2
}

fn default_minimum_working_days() -> u32 {
    12
}

fn default_area_reject_rate() -> Decimal {
    Decimal::from(3)
}

fn default_inspection_pass_rate() -> Decimal {
    Decimal::from(95)
}

fn default_inspection_min_qty() -> u64 {
    100
}

fn default_consecutive_failure_months() -> u32 {
    3
}

/// Eligibility thresholds for one policy.
///
/// Every key is optional in YAML; missing keys take the program defaults.
///
/// # Example
///
/// ```
/// use incentive_engine::config::ThresholdSet;
/// use rust_decimal::Decimal;
///
/// let thresholds: ThresholdSet = serde_yaml::from_str("unapproved_absence: 1").unwrap();
/// assert_eq!(thresholds.unapproved_absence, 1);
/// assert_eq!(thresholds.attendance_rate, Decimal::from(88));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Minimum attendance rate (percent).
    #[serde(default = "default_attendance_rate")]
    pub attendance_rate: Decimal,
    /// Maximum unapproved absences.
    #[serde(default = "default_unapproved_absence")]
    pub unapproved_absence: u32,
    /// Minimum actual working days.
    #[serde(default = "default_minimum_working_days")]
    pub minimum_working_days: u32,
    /// Maximum area reject rate (percent).
    #[serde(default = "default_area_reject_rate")]
    pub area_reject_rate: Decimal,
    /// Minimum inspection pass rate (percent).
    #[serde(default = "default_inspection_pass_rate", alias = "5prs_pass_rate")]
    pub inspection_pass_rate: Decimal,
    /// Minimum inspected quantity.
    #[serde(default = "default_inspection_min_qty", alias = "5prs_min_qty")]
    pub inspection_min_qty: u64,
    /// Streak length that disqualifies (2 or 3).
    #[serde(default = "default_consecutive_failure_months")]
    pub consecutive_failure_months: u32,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            attendance_rate: default_attendance_rate(),
            unapproved_absence: default_unapproved_absence(),
            minimum_working_days: default_minimum_working_days(),
            area_reject_rate: default_area_reject_rate(),
            inspection_pass_rate: default_inspection_pass_rate(),
            inspection_min_qty: default_inspection_min_qty(),
            consecutive_failure_months: default_consecutive_failure_months(),
        }
    }
}

impl ThresholdSet {
    /// Lists the thresholds that differ from `previous`, as `name: old -> new`.
    pub fn changes_from(&self, previous: &ThresholdSet) -> Vec<String> {
        let mut changes = Vec::new();
        let mut compare = |name: &str, old: String, new: String| {
            if old != new {
                changes.push(format!("{}: {} -> {}", name, old, new));
            }
        };

        compare(
            "attendance_rate",
            previous.attendance_rate.to_string(),
            self.attendance_rate.to_string(),
        );
        compare(
            "unapproved_absence",
            previous.unapproved_absence.to_string(),
            self.unapproved_absence.to_string(),
        );
        compare(
            "minimum_working_days",
            previous.minimum_working_days.to_string(),
            self.minimum_working_days.to_string(),
        );
        compare(
            "area_reject_rate",
            previous.area_reject_rate.to_string(),
            self.area_reject_rate.to_string(),
        );
        compare(
            "inspection_pass_rate",
            previous.inspection_pass_rate.to_string(),
            self.inspection_pass_rate.to_string(),
        );
        compare(
            "inspection_min_qty",
            previous.inspection_min_qty.to_string(),
            self.inspection_min_qty.to_string(),
        );
        compare(
            "consecutive_failure_months",
            previous.consecutive_failure_months.to_string(),
            self.consecutive_failure_months.to_string(),
        );

        changes
    }
}

/// Thresholds and condition applicability effective from a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPolicy {
    /// The first day this policy applies to.
    pub effective_date: NaiveDate,
    /// Eligibility thresholds.
    #[serde(default)]
    pub thresholds: ThresholdSet,
    /// Conditions that apply to each category.
    pub applicable_conditions: HashMap<PositionCategory, BTreeSet<ConditionId>>,
}

impl PeriodPolicy {
    /// Returns true if `condition` applies to `category`.
    ///
    /// Categories missing from the map (new members, unclassified) have no
    /// applicable conditions.
    pub fn is_applicable(&self, category: PositionCategory, condition: ConditionId) -> bool {
        self.applicable_conditions
            .get(&category)
            .is_some_and(|conditions| conditions.contains(&condition))
    }

    /// Returns true if a consecutive-failure tag disqualifies under this policy.
    ///
    /// # Example
    ///
    /// ```
    /// use incentive_engine::config::{PeriodPolicy, ThresholdSet};
    /// use incentive_engine::models::{ConsecutiveFailure, Period};
    /// use chrono::NaiveDate;
    ///
    /// let mut policy = PeriodPolicy {
    ///     effective_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
    ///     thresholds: ThresholdSet::default(),
    ///     applicable_conditions: Default::default(),
    /// };
    /// let two = ConsecutiveFailure::TwoConsecutive {
    ///     periods: [Period::new(2025, 9).unwrap(), Period::new(2025, 10).unwrap()],
    /// };
    /// assert!(!policy.disqualifies(&two));
    ///
    /// policy.thresholds.consecutive_failure_months = 2;
    /// assert!(policy.disqualifies(&two));
    /// ```
    pub fn disqualifies(&self, failure: &ConsecutiveFailure) -> bool {
        failure.is_tagged()
            && failure.streak_months() >= self.thresholds.consecutive_failure_months
    }
}

/// Specialist three-component settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistConfig {
    /// Flat bonus paid while certified.
    pub certification_bonus: Decimal,
    /// First month the long-service bonus is paid.
    pub bonus_start_month: u32,
    /// Long-service bonus by month.
    pub bonus_table: ProgressionTable,
}

/// Progression tables from progression.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Table for TYPE-1 individual contributors.
    pub standard: ProgressionTable,
    /// Table for TYPE-2 staff.
    pub type2: ProgressionTable,
    /// Specialist settings.
    pub specialist: SpecialistConfig,
}

/// Line-lead rollup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLeaderRollup {
    /// Share of the direct reports' total paid to the line leader.
    pub share: Decimal,
}

/// Upper-management rollup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpperManagementRollup {
    /// Multiplier applied to the line-lead average, per category.
    pub multipliers: HashMap<PositionCategory, Decimal>,
}

/// Rollup configuration from rollup.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Line-lead settings.
    pub line_leader: LineLeaderRollup,
    /// Upper-management settings.
    pub upper_management: UpperManagementRollup,
}

impl RollupConfig {
    /// Returns the multiplier for an upper-management category.
    pub fn multiplier(&self, category: PositionCategory) -> Option<Decimal> {
        self.upper_management.multipliers.get(&category).copied()
    }
}

/// The complete incentive configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct IncentiveConfig {
    /// Program metadata.
    metadata: ProgramMetadata,
    /// Progression tables.
    progression: ProgressionConfig,
    /// Rollup settings.
    rollup: RollupConfig,
    /// Policies by effective date (sorted oldest first).
    policies: Vec<PeriodPolicy>,
}

impl IncentiveConfig {
    /// Creates a new IncentiveConfig from its component parts.
    pub fn new(
        metadata: ProgramMetadata,
        progression: ProgressionConfig,
        rollup: RollupConfig,
        policies: Vec<PeriodPolicy>,
    ) -> Self {
        let mut sorted_policies = policies;
        sorted_policies.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            progression,
            rollup,
            policies: sorted_policies,
        }
    }

    /// Returns the program metadata.
    pub fn program(&self) -> &ProgramMetadata {
        &self.metadata
    }

    /// Returns the progression tables.
    pub fn progression(&self) -> &ProgressionConfig {
        &self.progression
    }

    /// Returns the rollup settings.
    pub fn rollup(&self) -> &RollupConfig {
        &self.rollup
    }

    /// Returns all policies, oldest first.
    pub fn policies(&self) -> &[PeriodPolicy] {
        &self.policies
    }

    /// Resolves the policy for a period: the most recent effective date on or
    /// before the period's first day.
    pub fn policy_for(&self, period: Period) -> EngineResult<&PeriodPolicy> {
        let first_day = period.first_day();
        self.policies
            .iter()
            .rev()
            .find(|policy| policy.effective_date <= first_day)
            .ok_or(EngineError::PolicyNotFound { period })
    }
}
