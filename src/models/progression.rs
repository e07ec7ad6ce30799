//! Progression table model.
//!
//! A progression table maps the number of consecutive qualifying months to a
//! payout. Tables are validated on construction so every lookup is total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Month count at which every progression table stops growing.
pub const MAX_CONTINUOUS_MONTHS: u32 = 15;

/// Non-decreasing payout amounts for months 1 through 15.
///
/// Month 0 maps to zero and every month beyond 15 maps to the month-15 amount.
///
/// # Example
///
/// ```
/// use incentive_engine::models::ProgressionTable;
/// use rust_decimal::Decimal;
///
/// let table = ProgressionTable::new((1..=15).map(|m| Decimal::from(m * 1000)).collect()).unwrap();
/// assert_eq!(table.amount_for(0), Decimal::ZERO);
/// assert_eq!(table.amount_for(3), Decimal::from(3000));
/// assert_eq!(table.amount_for(40), Decimal::from(15000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Decimal>", into = "Vec<Decimal>")]
pub struct ProgressionTable {
    amounts: Vec<Decimal>,
}

impl ProgressionTable {
    /// Validates and builds a table from exactly 15 amounts.
    pub fn new(amounts: Vec<Decimal>) -> EngineResult<Self> {
        if amounts.len() != MAX_CONTINUOUS_MONTHS as usize {
            return Err(EngineError::InvalidProgressionTable {
                message: format!(
                    "expected {} amounts, found {}",
                    MAX_CONTINUOUS_MONTHS,
                    amounts.len()
                ),
            });
        }

        if let Some(position) = amounts.iter().position(|a| a.is_sign_negative()) {
            return Err(EngineError::InvalidProgressionTable {
                message: format!("month {} has a negative amount", position + 1),
            });
        }

        if let Some(position) = amounts.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(EngineError::InvalidProgressionTable {
                message: format!(
                    "month {} amount {} is lower than month {} amount {}",
                    position + 2,
                    amounts[position + 1],
                    position + 1,
                    amounts[position]
                ),
            });
        }

        Ok(Self { amounts })
    }

    /// Returns the amount for a consecutive-month count, capped at month 15.
    pub fn amount_for(&self, months: u32) -> Decimal {
        if months == 0 {
            return Decimal::ZERO;
        }
        let index = months.min(MAX_CONTINUOUS_MONTHS) as usize - 1;
        self.amounts[index]
    }

    /// Returns every month (1..=15) whose amount equals `amount`, ascending.
    pub fn months_matching(&self, amount: Decimal) -> Vec<u32> {
        (1..=MAX_CONTINUOUS_MONTHS)
            .filter(|months| self.amount_for(*months) == amount)
            .collect()
    }

    /// The raw amounts, month 1 first.
    pub fn amounts(&self) -> &[Decimal] {
        &self.amounts
    }
}

impl TryFrom<Vec<Decimal>> for ProgressionTable {
    type Error = EngineError;

    fn try_from(amounts: Vec<Decimal>) -> Result<Self, Self::Error> {
        Self::new(amounts)
    }
}

impl From<ProgressionTable> for Vec<Decimal> {
    fn from(table: ProgressionTable) -> Self {
        table.amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_amounts() -> Vec<Decimal> {
        [
            150_000, 250_000, 300_000, 350_000, 400_000, 450_000, 500_000, 650_000, 750_000,
            850_000, 950_000, 1_000_000, 1_000_000, 1_000_000, 1_000_000,
        ]
        .iter()
        .map(|a| Decimal::from(*a))
        .collect()
    }

    #[test]
    fn test_lookup_caps_at_fifteen_months() {
        let table = ProgressionTable::new(standard_amounts()).unwrap();
        assert_eq!(table.amount_for(1), Decimal::from(150_000));
        assert_eq!(table.amount_for(4), Decimal::from(350_000));
        assert_eq!(table.amount_for(15), Decimal::from(1_000_000));
        assert_eq!(table.amount_for(27), Decimal::from(1_000_000));
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let result = ProgressionTable::new(vec![Decimal::ONE; 12]);
        match result {
            Err(EngineError::InvalidProgressionTable { message }) => {
                assert!(message.contains("expected 15 amounts, found 12"));
            }
            other => panic!("Expected InvalidProgressionTable, got {:?}", other),
        }
    }

    #[test]
    fn test_decreasing_table_is_rejected() {
        let mut amounts = standard_amounts();
        amounts[5] = Decimal::from(100_000);
        let result = ProgressionTable::new(amounts);
        match result {
            Err(EngineError::InvalidProgressionTable { message }) => {
                assert!(message.contains("month 6"));
            }
            other => panic!("Expected InvalidProgressionTable, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let mut amounts = vec![Decimal::ZERO; 15];
        amounts[0] = Decimal::from(-1);
        assert!(ProgressionTable::new(amounts).is_err());
    }

    #[test]
    fn test_months_matching_reports_plateau() {
        let table = ProgressionTable::new(standard_amounts()).unwrap();
        assert_eq!(table.months_matching(Decimal::from(300_000)), vec![3]);
        assert_eq!(
            table.months_matching(Decimal::from(1_000_000)),
            vec![12, 13, 14, 15]
        );
        assert!(table.months_matching(Decimal::from(123)).is_empty());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<ProgressionTable, _> =
            serde_yaml::from_str("[0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]");
        assert!(ok.is_ok());

        let bad: Result<ProgressionTable, _> = serde_yaml::from_str("[3, 2, 1]");
        assert!(bad.is_err());
    }
}
