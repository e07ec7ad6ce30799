//! Eligibility condition models.
//!
//! Every employee is measured against the same ten conditions; the period
//! policy decides which of them apply to each position category.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the ten eligibility conditions, serialised by its 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConditionId {
    /// Attendance rate at or above the minimum.
    AttendanceRate,
    /// Unapproved absences at or below the maximum.
    UnapprovedAbsence,
    /// At least one actual working day.
    ActualWorkingDays,
    /// Actual working days at or above the minimum.
    MinimumWorkingDays,
    /// No personal audit failure this period.
    PersonalAuditFailure,
    /// No disqualifying personal consecutive-failure streak.
    PersonalConsecutiveFailure,
    /// No direct report with a disqualifying consecutive-failure streak.
    TeamConsecutiveFailure,
    /// Work-area reject rate at or below the ceiling.
    AreaRejectRate,
    /// Inspection pass rate at or above the minimum.
    InspectionPassRate,
    /// Inspection volume at or above the minimum.
    InspectionVolume,
}

impl ConditionId {
    /// All conditions in index order.
    pub const ALL: [ConditionId; 10] = [
        Self::AttendanceRate,
        Self::UnapprovedAbsence,
        Self::ActualWorkingDays,
        Self::MinimumWorkingDays,
        Self::PersonalAuditFailure,
        Self::PersonalConsecutiveFailure,
        Self::TeamConsecutiveFailure,
        Self::AreaRejectRate,
        Self::InspectionPassRate,
        Self::InspectionVolume,
    ];

    /// The 1-based condition index.
    pub fn index(&self) -> u8 {
        match self {
            Self::AttendanceRate => 1,
            Self::UnapprovedAbsence => 2,
            Self::ActualWorkingDays => 3,
            Self::MinimumWorkingDays => 4,
            Self::PersonalAuditFailure => 5,
            Self::PersonalConsecutiveFailure => 6,
            Self::TeamConsecutiveFailure => 7,
            Self::AreaRejectRate => 8,
            Self::InspectionPassRate => 9,
            Self::InspectionVolume => 10,
        }
    }

    /// Looks a condition up by its 1-based index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.index() == index)
    }

    /// A short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AttendanceRate => "Attendance rate",
            Self::UnapprovedAbsence => "Unapproved absences",
            Self::ActualWorkingDays => "Actual working days",
            Self::MinimumWorkingDays => "Minimum working days",
            Self::PersonalAuditFailure => "Personal audit failure",
            Self::PersonalConsecutiveFailure => "Personal consecutive failure",
            Self::TeamConsecutiveFailure => "Team consecutive failure",
            Self::AreaRejectRate => "Area reject rate",
            Self::InspectionPassRate => "Inspection pass rate",
            Self::InspectionVolume => "Inspection volume",
        }
    }
}

impl TryFrom<u8> for ConditionId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| format!("condition index {} is not in 1-10", value))
    }
}

impl From<ConditionId> for u8 {
    fn from(id: ConditionId) -> Self {
        id.index()
    }
}

/// Outcome of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOutcome {
    /// Applicable and met.
    Pass,
    /// Applicable and not met.
    Fail,
    /// Not applicable to this employee.
    NotApplicable,
}

/// The evaluated result of one condition for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// Which condition.
    pub condition: ConditionId,
    /// Pass, fail or not applicable.
    pub outcome: ConditionOutcome,
    /// The measured value, if one was available.
    pub value: Option<Decimal>,
    /// The threshold the value was compared against.
    pub threshold: Option<Decimal>,
}

impl ConditionResult {
    /// A not-applicable result without value or threshold.
    pub fn not_applicable(condition: ConditionId) -> Self {
        Self {
            condition,
            outcome: ConditionOutcome::NotApplicable,
            value: None,
            threshold: None,
        }
    }
}

/// Aggregate of an employee's condition results.
///
/// # Example
///
/// ```
/// use incentive_engine::models::ConditionSummary;
/// use rust_decimal::Decimal;
///
/// let summary = ConditionSummary::new(4, 3);
/// assert!(!summary.all_passed());
/// assert_eq!(summary.pass_ratio, Decimal::from(75));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// Number of applicable conditions.
    pub applicable: u32,
    /// Number of applicable conditions that passed.
    pub passed: u32,
    /// `passed / applicable` as a percentage (two decimal places).
    pub pass_ratio: Decimal,
}

impl ConditionSummary {
    /// Builds a summary from counts.
    pub fn new(applicable: u32, passed: u32) -> Self {
        let pass_ratio = if applicable == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(passed) * Decimal::ONE_HUNDRED / Decimal::from(applicable)).round_dp(2)
        };

        Self {
            applicable,
            passed,
            pass_ratio,
        }
    }

    /// Builds a summary from a set of results, ignoring not-applicable ones.
    pub fn from_results(results: &[ConditionResult]) -> Self {
        let applicable = results
            .iter()
            .filter(|r| r.outcome != ConditionOutcome::NotApplicable)
            .count() as u32;
        let passed = results
            .iter()
            .filter(|r| r.outcome == ConditionOutcome::Pass)
            .count() as u32;
        Self::new(applicable, passed)
    }

    /// The all-or-nothing eligibility rule: at least one applicable condition
    /// and every applicable condition passed.
    pub fn all_passed(&self) -> bool {
        self.applicable > 0 && self.passed == self.applicable
    }
}
