//! Role tiers and position categories.
//!
//! The roster carries a coarse role tier (`TYPE-1`, `TYPE-2`, `TYPE-3`) and a
//! free-text position title. Both are classified once, at assembly time, into
//! the closed [`PositionCategory`] enum that drives condition applicability
//! and amount dispatch.

use serde::{Deserialize, Serialize};

/// Coarse role tier from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleTier {
    /// Dedicated quality staff.
    #[serde(rename = "TYPE-1")]
    Type1,
    /// Staff with partial quality duties.
    #[serde(rename = "TYPE-2")]
    Type2,
    /// New members not yet entitled to an incentive.
    #[serde(rename = "TYPE-3")]
    Type3,
}

impl RoleTier {
    /// Parses a raw roster value such as `"TYPE-1"`, `"type 1"` or `"1"`.
    ///
    /// # Example
    ///
    /// ```
    /// use incentive_engine::models::RoleTier;
    ///
    /// assert_eq!(RoleTier::parse(" type-2 "), Some(RoleTier::Type2));
    /// assert_eq!(RoleTier::parse("TYPE-9"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        match compact.as_str() {
            "TYPE1" | "1" => Some(Self::Type1),
            "TYPE2" | "2" => Some(Self::Type2),
            "TYPE3" | "3" => Some(Self::Type3),
            _ => None,
        }
    }

    /// The canonical roster label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Type1 => "TYPE-1",
            Self::Type2 => "TYPE-2",
            Self::Type3 => "TYPE-3",
        }
    }
}

/// How an incentive amount is computed for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Direct progression-table lookup.
    Standard,
    /// Three-component formula (base table, certification bonus, bonus table).
    Specialist,
    /// Share of direct reports' payouts.
    LineLead,
    /// Multiple of the average line-lead payout below the employee.
    UpperManagement,
    /// Never paid (new members).
    NotEntitled,
    /// Title could not be classified.
    Unclassified,
}

/// Fine-grained position category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionCategory {
    /// Assembly, stitching and final inspectors.
    Inspector,
    /// AQL inspector (specialist three-component role).
    AqlInspector,
    /// Audit and training team member.
    AuditTrainer,
    /// Model master.
    ModelMaster,
    /// Any TYPE-2 individual contributor.
    Type2Staff,
    /// Line leader.
    LineLeader,
    /// Group leader.
    GroupLeader,
    /// Supervisor.
    Supervisor,
    /// Assistant manager.
    AssistantManager,
    /// Manager.
    Manager,
    /// Senior manager.
    SeniorManager,
    /// TYPE-3 new member.
    NewMember,
    /// Position could not be classified.
    Unclassified,
}

impl PositionCategory {
    /// Categories that must appear in every policy's applicable-condition map.
    pub const ENTITLED: [PositionCategory; 11] = [
        Self::Inspector,
        Self::AqlInspector,
        Self::AuditTrainer,
        Self::ModelMaster,
        Self::Type2Staff,
        Self::LineLeader,
        Self::GroupLeader,
        Self::Supervisor,
        Self::AssistantManager,
        Self::Manager,
        Self::SeniorManager,
    ];

    /// Upper-management categories, lowest to highest.
    pub const UPPER_MANAGEMENT: [PositionCategory; 5] = [
        Self::GroupLeader,
        Self::Supervisor,
        Self::AssistantManager,
        Self::Manager,
        Self::SeniorManager,
    ];

    /// Classifies a roster row.
    ///
    /// Supervisory titles are recognised on any entitled tier. TYPE-3 rows are
    /// always [`NewMember`](Self::NewMember); an unknown tier or an unknown
    /// TYPE-1 title is [`Unclassified`](Self::Unclassified).
    ///
    /// # Example
    ///
    /// ```
    /// use incentive_engine::models::{PositionCategory, RoleTier};
    ///
    /// let category = PositionCategory::classify(Some(RoleTier::Type1), "  aql   inspector");
    /// assert_eq!(category, PositionCategory::AqlInspector);
    ///
    /// let category = PositionCategory::classify(Some(RoleTier::Type1), "forklift driver");
    /// assert_eq!(category, PositionCategory::Unclassified);
    /// ```
    pub fn classify(tier: Option<RoleTier>, title: &str) -> Self {
        let Some(tier) = tier else {
            return Self::Unclassified;
        };
        if tier == RoleTier::Type3 {
            return Self::NewMember;
        }

        let title = normalize_title(title);
        if let Some(category) = Self::management_title(&title) {
            return category;
        }

        match tier {
            RoleTier::Type1 => match title.as_str() {
                "AQL INSPECTOR" => Self::AqlInspector,
                "INSPECTOR" | "ASSEMBLY INSPECTOR" | "STITCHING INSPECTOR" | "FINAL INSPECTOR" => {
                    Self::Inspector
                }
                "AUDIT & TRAINING TEAM" | "AUDIT AND TRAINING TEAM" | "AUDITOR & TRAINER" => {
                    Self::AuditTrainer
                }
                "MODEL MASTER" => Self::ModelMaster,
                _ => Self::Unclassified,
            },
            RoleTier::Type2 => Self::Type2Staff,
            RoleTier::Type3 => Self::NewMember,
        }
    }

    fn management_title(title: &str) -> Option<Self> {
        match title {
            "LINE LEADER" => Some(Self::LineLeader),
            "GROUP LEADER" => Some(Self::GroupLeader),
            "SUPERVISOR" => Some(Self::Supervisor),
            "A.MANAGER" | "ASSISTANT MANAGER" => Some(Self::AssistantManager),
            "MANAGER" => Some(Self::Manager),
            "S.MANAGER" | "SENIOR MANAGER" => Some(Self::SeniorManager),
            _ => None,
        }
    }

    /// Returns how this category's amount is computed.
    pub fn kind(&self) -> CategoryKind {
        match self {
            Self::Inspector | Self::AuditTrainer | Self::ModelMaster | Self::Type2Staff => {
                CategoryKind::Standard
            }
            Self::AqlInspector => CategoryKind::Specialist,
            Self::LineLeader => CategoryKind::LineLead,
            Self::GroupLeader
            | Self::Supervisor
            | Self::AssistantManager
            | Self::Manager
            | Self::SeniorManager => CategoryKind::UpperManagement,
            Self::NewMember => CategoryKind::NotEntitled,
            Self::Unclassified => CategoryKind::Unclassified,
        }
    }

    /// Returns true for categories paid from their own metrics.
    pub fn is_individual_contributor(&self) -> bool {
        matches!(
            self.kind(),
            CategoryKind::Standard | CategoryKind::Specialist
        )
    }

    /// Returns true for categories above line lead.
    pub fn is_upper_management(&self) -> bool {
        self.kind() == CategoryKind::UpperManagement
    }

    /// The snake_case identifier used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspector => "inspector",
            Self::AqlInspector => "aql_inspector",
            Self::AuditTrainer => "audit_trainer",
            Self::ModelMaster => "model_master",
            Self::Type2Staff => "type2_staff",
            Self::LineLeader => "line_leader",
            Self::GroupLeader => "group_leader",
            Self::Supervisor => "supervisor",
            Self::AssistantManager => "assistant_manager",
            Self::Manager => "manager",
            Self::SeniorManager => "senior_manager",
            Self::NewMember => "new_member",
            Self::Unclassified => "unclassified",
        }
    }
}

/// Upper-cases a title, collapses whitespace and joins abbreviations
/// (`"A. Manager"` becomes `"A.MANAGER"`).
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .replace(". ", ".")
}
