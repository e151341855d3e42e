use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ProjectModel;
use crate::types::Percent;

/// The closed set of knobs a sensitivity or scenario run may turn.
///
/// External callers identify variables by name; the string boundary stays
/// at the edge (`parse`) and unknown names are dropped there, never deep
/// inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentVariable {
    /// Every product's unit price
    Revenue,
    /// Every production schedule row's quantity
    Quantity,
    /// Every operating cost's annual amount
    OperatingCosts,
    /// Every investment's amount
    Investment,
    /// The discount rate itself (multiplicative, not additive)
    DiscountRate,
}

impl AdjustmentVariable {
    /// All variables, in tornado-chart order.
    pub const ALL: [AdjustmentVariable; 5] = [
        AdjustmentVariable::Revenue,
        AdjustmentVariable::Quantity,
        AdjustmentVariable::OperatingCosts,
        AdjustmentVariable::Investment,
        AdjustmentVariable::DiscountRate,
    ];

    /// Resolve an external variable name, including the accepted
    /// synonyms. Unknown names resolve to `None` and are ignored by
    /// callers.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "revenue" | "price" => Some(Self::Revenue),
            "quantity" | "sales" => Some(Self::Quantity),
            "costs" | "operatingCosts" => Some(Self::OperatingCosts),
            "investment" => Some(Self::Investment),
            "discountRate" => Some(Self::DiscountRate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Quantity => "quantity",
            Self::OperatingCosts => "operatingCosts",
            Self::Investment => "investment",
            Self::DiscountRate => "discountRate",
        }
    }
}

/// One percentage delta applied to one variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub variable: AdjustmentVariable,
    /// Percentage delta; +10 scales the target fields by 1.1
    pub delta: Percent,
}

/// Apply a set of deltas to a copy of the model; the original is never
/// touched. Deltas act multiplicatively on disjoint fields, so two
/// adjustments to different variables commute.
pub fn apply_adjustments(model: &ProjectModel, adjustments: &[Adjustment]) -> ProjectModel {
    let mut adjusted = model.clone();
    for adjustment in adjustments {
        let factor = Decimal::ONE + adjustment.delta / dec!(100);
        match adjustment.variable {
            AdjustmentVariable::Revenue => {
                for product in &mut adjusted.products {
                    product.unit_price *= factor;
                }
            }
            AdjustmentVariable::Quantity => {
                for product in &mut adjusted.products {
                    for row in &mut product.production_schedule {
                        row.quantity *= factor;
                    }
                }
            }
            AdjustmentVariable::OperatingCosts => {
                for cost in &mut adjusted.operating_costs {
                    cost.amount *= factor;
                }
            }
            AdjustmentVariable::Investment => {
                for investment in &mut adjusted.investments {
                    investment.amount *= factor;
                    // A shrunk asset cannot salvage more than it costs.
                    investment.salvage_value = investment.salvage_value.min(investment.amount);
                }
            }
            AdjustmentVariable::DiscountRate => {
                adjusted.parameters.discount_rate *= factor;
            }
        }
    }
    adjusted
}

/// Resolve externally supplied `{name: delta}` pairs into adjustments,
/// silently dropping unrecognised names. Returns the dropped names so
/// callers can diagnose typos.
pub fn from_named_deltas(deltas: &BTreeMap<String, Decimal>) -> (Vec<Adjustment>, Vec<String>) {
    let mut adjustments = Vec::new();
    let mut ignored = Vec::new();
    for (name, delta) in deltas {
        match AdjustmentVariable::parse(name) {
            Some(variable) => adjustments.push(Adjustment {
                variable,
                delta: *delta,
            }),
            None => ignored.push(name.clone()),
        }
    }
    (adjustments, ignored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CostType, DepreciationMethod, Investment, InvestmentCategory, OperatingCost, Product,
        ProductionEntry, ProjectParameters,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn model() -> ProjectModel {
        ProjectModel {
            name: "Plant".into(),
            parameters: ProjectParameters {
                construction_years: 1,
                operation_years: 5,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![Investment {
                category: InvestmentCategory::Machinery,
                amount: dec!(1000),
                year: 0,
                useful_life: 10,
                salvage_value: dec!(900),
                depreciation_method: DepreciationMethod::StraightLine,
                depreciation_rate: dec!(0),
            }],
            products: vec![Product {
                name: "Widget".into(),
                unit: "pcs".into(),
                unit_price: dec!(10),
                price_escalation: dec!(0),
                installed_capacity: dec!(100),
                capacity_unit: "pcs/yr".into(),
                production_schedule: vec![ProductionEntry {
                    year: 1,
                    capacity_utilization: dec!(80),
                    quantity: dec!(80),
                }],
            }],
            operating_costs: vec![OperatingCost {
                category: "labour".into(),
                description: "Operators".into(),
                cost_type: CostType::Fixed,
                amount: dec!(200),
                unit_cost: dec!(0),
                escalation_rate: dec!(0),
                start_year: 1,
            }],
            financings: vec![],
        }
    }

    #[test]
    fn test_parse_synonyms() {
        assert_eq!(
            AdjustmentVariable::parse("price"),
            Some(AdjustmentVariable::Revenue)
        );
        assert_eq!(
            AdjustmentVariable::parse("sales"),
            Some(AdjustmentVariable::Quantity)
        );
        assert_eq!(
            AdjustmentVariable::parse("operatingCosts"),
            Some(AdjustmentVariable::OperatingCosts)
        );
        assert_eq!(AdjustmentVariable::parse("npv"), None);
    }

    #[test]
    fn test_revenue_adjustment_scales_prices() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                variable: AdjustmentVariable::Revenue,
                delta: dec!(10),
            }],
        );
        assert_eq!(adjusted.products[0].unit_price, dec!(11.0));
        // Quantities untouched
        assert_eq!(adjusted.products[0].production_schedule[0].quantity, dec!(80));
    }

    #[test]
    fn test_original_model_untouched() {
        let base = model();
        let _ = apply_adjustments(
            &base,
            &[Adjustment {
                variable: AdjustmentVariable::Revenue,
                delta: dec!(50),
            }],
        );
        assert_eq!(base.products[0].unit_price, dec!(10));
    }

    #[test]
    fn test_discount_rate_is_multiplicative() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                variable: AdjustmentVariable::DiscountRate,
                delta: dec!(20),
            }],
        );
        // 10% × 1.2 = 12%, not 10% + 20%
        assert_eq!(adjusted.parameters.discount_rate, dec!(12.0));
    }

    #[test]
    fn test_investment_shrink_clamps_salvage() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                variable: AdjustmentVariable::Investment,
                delta: dec!(-20),
            }],
        );
        assert_eq!(adjusted.investments[0].amount, dec!(800.0));
        assert_eq!(adjusted.investments[0].salvage_value, dec!(800.0));
    }

    #[test]
    fn test_disjoint_adjustments_commute() {
        let a = Adjustment {
            variable: AdjustmentVariable::Revenue,
            delta: dec!(15),
        };
        let b = Adjustment {
            variable: AdjustmentVariable::OperatingCosts,
            delta: dec!(-10),
        };
        let ab = apply_adjustments(&model(), &[a, b]);
        let ba = apply_adjustments(&model(), &[b, a]);
        assert_eq!(ab.products[0].unit_price, ba.products[0].unit_price);
        assert_eq!(ab.operating_costs[0].amount, ba.operating_costs[0].amount);
    }

    #[test]
    fn test_zero_delta_is_identity_on_values() {
        let adjusted = apply_adjustments(
            &model(),
            &[Adjustment {
                variable: AdjustmentVariable::Revenue,
                delta: dec!(0),
            }],
        );
        assert_eq!(adjusted.products[0].unit_price, dec!(10));
    }

    #[test]
    fn test_named_deltas_drop_unknown() {
        let mut deltas = BTreeMap::new();
        deltas.insert("revenue".to_string(), dec!(-10));
        deltas.insert("weather".to_string(), dec!(5));
        let (adjustments, ignored) = from_named_deltas(&deltas);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].variable, AdjustmentVariable::Revenue);
        assert_eq!(ignored, vec!["weather".to_string()]);
    }
}
