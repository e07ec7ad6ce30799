//! Individual-contributor incentive amounts.
//!
//! Standard categories read the amount straight off their progression
//! table; the specialist adds a certification bonus and a long-service
//! bonus. Unpaid, unclassified and ineligible employees short-circuit to
//! zero here as well, so only eligible rollup categories are left for the
//! hierarchy stage.

use rust_decimal::Decimal;

use crate::models::{
    AmountBreakdown, AuditStep, CategoryKind, Diagnostic, MAX_CONTINUOUS_MONTHS, PositionCategory,
};

use super::AmountSchedule;

/// The result of an amount calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct IncentiveResult {
    /// Amount payable.
    pub amount: Decimal,
    /// How the amount was made up.
    pub breakdown: AmountBreakdown,
    /// A data-quality note, if any.
    pub diagnostic: Option<Diagnostic>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the amount for categories paid from their own metrics.
///
/// Returns `None` for eligible line leaders and upper managers, whose amounts
/// depend on other employees' final amounts.
///
/// # Example
///
/// ```no_run
/// use incentive_engine::calculation::{calculate_individual_incentive, AmountSchedule};
/// use incentive_engine::config::ConfigLoader;
/// use incentive_engine::models::PositionCategory;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/qip").unwrap();
/// let schedule = AmountSchedule::for_category(
///     PositionCategory::Inspector,
///     loader.config().progression(),
///     false,
/// );
/// let result =
///     calculate_individual_incentive(PositionCategory::Inspector, true, 4, &schedule, 3).unwrap();
/// assert_eq!(result.amount, Decimal::from(350_000));
/// ```
pub fn calculate_individual_incentive(
    category: PositionCategory,
    eligible: bool,
    months: u32,
    schedule: &AmountSchedule<'_>,
    step_number: u32,
) -> Option<IncentiveResult> {
    let input = serde_json::json!({
        "category": category,
        "eligible": eligible,
        "months": months
    });

    let zero = |breakdown: AmountBreakdown, reasoning: String| IncentiveResult {
        amount: Decimal::ZERO,
        breakdown,
        diagnostic: None,
        audit_step: AuditStep {
            step_number,
            rule_id: "incentive_amount".to_string(),
            rule_name: "Incentive Amount".to_string(),
            input: input.clone(),
            output: serde_json::json!({ "amount": "0" }),
            reasoning,
        },
    };

    match category.kind() {
        CategoryKind::NotEntitled => Some(zero(
            AmountBreakdown::NotEntitled,
            format!("Category '{}' is not entitled to an incentive", category.as_str()),
        )),
        CategoryKind::Unclassified => Some(zero(
            AmountBreakdown::Unclassified,
            "Position could not be classified; amount is 0".to_string(),
        )),
        _ if !eligible => Some(zero(
            AmountBreakdown::Ineligible,
            "Not eligible this period; amount is 0".to_string(),
        )),
        CategoryKind::LineLead | CategoryKind::UpperManagement => None,
        CategoryKind::Standard | CategoryKind::Specialist => {
            let (amount, breakdown, reasoning) = match (schedule, schedule.specialist_parts(months)) {
                (_, Some(parts)) => (
                    parts.total(),
                    AmountBreakdown::Specialist {
                        part1: parts.part1,
                        part2: parts.part2,
                        part3: parts.part3,
                    },
                    format!(
                        "Specialist month {}: base {} + certification {} + long-service {}",
                        months, parts.part1, parts.part2, parts.part3
                    ),
                ),
                (AmountSchedule::Table { name, table }, None) => {
                    let amount = table.amount_for(months);
                    (
                        amount,
                        AmountBreakdown::Standard {
                            table: (*name).to_string(),
                            months: months.min(MAX_CONTINUOUS_MONTHS),
                        },
                        format!("{} table month {}: {}", name, months, amount),
                    )
                }
                _ => (
                    Decimal::ZERO,
                    AmountBreakdown::Unclassified,
                    "No amount schedule for category".to_string(),
                ),
            };

            Some(IncentiveResult {
                amount,
                breakdown,
                diagnostic: None,
                audit_step: AuditStep {
                    step_number,
                    rule_id: "incentive_amount".to_string(),
                    rule_name: "Incentive Amount".to_string(),
                    input,
                    output: serde_json::json!({ "amount": amount.to_string() }),
                    reasoning,
                },
            })
        }
    }
}
