//! Consecutive audit-failure tags.

use serde::{Deserialize, Serialize};

use super::Period;

/// How many of the last three periods an employee or area failed in a row.
///
/// # Example
///
/// ```
/// use incentive_engine::models::{ConsecutiveFailure, Period};
///
/// let tag = ConsecutiveFailure::TwoConsecutive {
///     periods: [Period::new(2025, 9).unwrap(), Period::new(2025, 10).unwrap()],
/// };
/// assert_eq!(tag.streak_months(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum ConsecutiveFailure {
    /// No consecutive failure ending in the current period.
    #[default]
    None,
    /// Failed in the two most recent periods but not the oldest.
    TwoConsecutive {
        /// The two failing periods, oldest first.
        periods: [Period; 2],
    },
    /// Failed in all three periods.
    ThreeConsecutive {
        /// The three failing periods, oldest first.
        periods: [Period; 3],
    },
}

impl ConsecutiveFailure {
    /// Length of the failing streak (0, 2 or 3).
    pub fn streak_months(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::TwoConsecutive { .. } => 2,
            Self::ThreeConsecutive { .. } => 3,
        }
    }

    /// Returns true for any tag other than [`None`](Self::None).
    pub fn is_tagged(&self) -> bool {
        self.streak_months() > 0
    }
}

/// Whether a consecutive-failure entry refers to an employee or a work area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureScope {
    /// An individual inspector.
    Employee,
    /// A work area (team).
    Area,
}

/// One tagged employee or area in the consecutive-failure roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsecutiveFailureEntry {
    /// Employee number or normalised area name.
    pub subject: String,
    /// What `subject` refers to.
    pub scope: FailureScope,
    /// The tag with its contributing periods.
    pub failure: ConsecutiveFailure,
}

/// Consecutive-failure output for the collaborator layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsecutiveFailureRoster {
    /// Tagged employees.
    pub employees: Vec<ConsecutiveFailureEntry>,
    /// Tagged work areas.
    pub areas: Vec<ConsecutiveFailureEntry>,
    /// Records dropped because their period marker disagreed with their batch.
    pub excluded_records: usize,
}
