//! Amount schedules per position category.
//!
//! An [`AmountSchedule`] answers two questions for a category: what is paid
//! for a month count, and which month counts could have produced a given
//! amount. The second one drives the legacy reverse lookup of continuous
//! months from a previous payout.

use rust_decimal::Decimal;

use crate::config::{ProgressionConfig, SpecialistConfig};
use crate::models::{CategoryKind, MAX_CONTINUOUS_MONTHS, PositionCategory, ProgressionTable};

/// The three parts of a specialist amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialistParts {
    /// Base-table amount.
    pub part1: Decimal,
    /// Certification bonus.
    pub part2: Decimal,
    /// Long-service bonus.
    pub part3: Decimal,
}

impl SpecialistParts {
    /// Sum of the three parts.
    pub fn total(&self) -> Decimal {
        self.part1 + self.part2 + self.part3
    }
}

/// How a category's amount depends on its continuous-month count.
#[derive(Debug, Clone, Copy)]
pub enum AmountSchedule<'a> {
    /// Direct table lookup.
    Table {
        /// Table name for the audit trace.
        name: &'static str,
        /// The table.
        table: &'a ProgressionTable,
    },
    /// Specialist three-component formula.
    Specialist {
        /// Base table (part 1).
        base: &'a ProgressionTable,
        /// Certification and long-service settings.
        settings: &'a SpecialistConfig,
        /// Whether the certification bonus is paid.
        certified: bool,
    },
    /// Rollup and unpaid categories: amounts do not encode a month count.
    Untracked,
}

impl<'a> AmountSchedule<'a> {
    /// Picks the schedule for a category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use incentive_engine::calculation::AmountSchedule;
    /// use incentive_engine::config::ConfigLoader;
    /// use incentive_engine::models::PositionCategory;
    ///
    /// let loader = ConfigLoader::load("./config/qip").unwrap();
    /// let schedule = AmountSchedule::for_category(
    ///     PositionCategory::Inspector,
    ///     loader.config().progression(),
    ///     false,
    /// );
    /// assert_eq!(schedule.months_for(300_000.into()), vec![3]);
    /// ```
    pub fn for_category(
        category: PositionCategory,
        progression: &'a ProgressionConfig,
        certified: bool,
    ) -> Self {
        match category.kind() {
            CategoryKind::Standard if category == PositionCategory::Type2Staff => Self::Table {
                name: "type2",
                table: &progression.type2,
            },
            CategoryKind::Standard => Self::Table {
                name: "standard",
                table: &progression.standard,
            },
            CategoryKind::Specialist => Self::Specialist {
                base: &progression.standard,
                settings: &progression.specialist,
                certified,
            },
            _ => Self::Untracked,
        }
    }

    /// Returns true if amounts on this schedule encode a month count.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Untracked)
    }

    /// The specialist parts for a month count, `None` for other schedules.
    pub fn specialist_parts(&self, months: u32) -> Option<SpecialistParts> {
        match self {
            Self::Specialist {
                base,
                settings,
                certified,
            } => {
                if months == 0 {
                    return Some(SpecialistParts {
                        part1: Decimal::ZERO,
                        part2: Decimal::ZERO,
                        part3: Decimal::ZERO,
                    });
                }
                Some(SpecialistParts {
                    part1: base.amount_for(months),
                    part2: if *certified {
                        settings.certification_bonus
                    } else {
                        Decimal::ZERO
                    },
                    part3: long_service_bonus(settings, months),
                })
            }
            _ => None,
        }
    }

    /// The amount paid for a month count.
    pub fn amount_for(&self, months: u32) -> Decimal {
        match self {
            Self::Table { table, .. } => table.amount_for(months),
            Self::Specialist { .. } => self
                .specialist_parts(months)
                .map(|parts| parts.total())
                .unwrap_or(Decimal::ZERO),
            Self::Untracked => Decimal::ZERO,
        }
    }

    /// Every month count (ascending) that produces `amount`.
    ///
    /// For the specialist the certification bonus is taken off first when the
    /// employee is certified; if that finds nothing the full amount is tried,
    /// which covers a certification gained this period.
    pub fn months_for(&self, amount: Decimal) -> Vec<u32> {
        match self {
            Self::Table { table, .. } => table.months_matching(amount),
            Self::Specialist {
                base,
                settings,
                certified,
            } => {
                let mut candidates = Vec::with_capacity(2);
                if *certified {
                    candidates.push(amount - settings.certification_bonus);
                }
                candidates.push(amount);

                candidates
                    .into_iter()
                    .map(|remaining| {
                        (1..=MAX_CONTINUOUS_MONTHS)
                            .filter(|months| {
                                base.amount_for(*months) + long_service_bonus(settings, *months)
                                    == remaining
                            })
                            .collect::<Vec<_>>()
                    })
                    .find(|matches| !matches.is_empty())
                    .unwrap_or_default()
            }
            Self::Untracked => Vec::new(),
        }
    }
}

fn long_service_bonus(settings: &SpecialistConfig, months: u32) -> Decimal {
    if months >= settings.bonus_start_month {
        settings.bonus_table.amount_for(months)
    } else {
        Decimal::ZERO
    }
}
