use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::adjustment::{apply_adjustments, Adjustment};
use crate::error::ProformaError;
use crate::indicators::FinancialIndicators;
use crate::model::ProjectModel;
use crate::projection::compute_bundle;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::ProformaResult;

/// A named what-if case: a label plus the deltas that define it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefinition {
    pub name: String,
    pub adjustments: Vec<Adjustment>,
}

/// Indicator suite for one scenario, with its NPV deviation from base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub indicators: FinancialIndicators,
    pub npv_deviation: Money,
    pub npv_deviation_pct: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAnalysis {
    pub base: FinancialIndicators,
    pub results: Vec<ScenarioResult>,
}

/// Evaluate named scenarios against the base model. Each scenario is an
/// independent derived run; the base model is projected once.
pub fn evaluate_scenarios(
    model: &ProjectModel,
    scenarios: &[ScenarioDefinition],
) -> ProformaResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if scenarios.is_empty() {
        return Err(ProformaError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    let (base_bundle, _) = compute_bundle(model)?;
    let base = base_bundle.indicators;
    let base_npv = base.npv;

    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let adjusted = apply_adjustments(model, &scenario.adjustments);
        let (bundle, scenario_warnings) = compute_bundle(&adjusted)?;
        for warning in scenario_warnings {
            warnings.push(format!("{}: {warning}", scenario.name));
        }

        let npv_deviation = bundle.indicators.npv - base_npv;
        let npv_deviation_pct = if base_npv.is_zero() {
            if !npv_deviation.is_zero() {
                warnings.push(format!(
                    "Base NPV is zero; no deviation percentage for scenario '{}'",
                    scenario.name
                ));
            }
            Decimal::ZERO
        } else {
            npv_deviation / base_npv * dec!(100)
        };

        results.push(ScenarioResult {
            name: scenario.name.clone(),
            indicators: bundle.indicators,
            npv_deviation,
            npv_deviation_pct,
        });
    }

    let output = ScenarioAnalysis { base, results };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Named Scenario Evaluation",
        &serde_json::json!({
            "project": model.name,
            "num_scenarios": scenarios.len(),
            "base_npv": base_npv.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::AdjustmentVariable;
    use crate::model::{CostType, OperatingCost, Product, ProductionEntry, ProjectParameters};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn model() -> ProjectModel {
        ProjectModel {
            name: "Kiln".into(),
            parameters: ProjectParameters {
                construction_years: 0,
                operation_years: 4,
                discount_rate: dec!(8),
                inflation_rate: dec!(0),
                tax_rate: dec!(20),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![],
            products: vec![Product {
                name: "Brick".into(),
                unit: "k".into(),
                unit_price: dec!(4),
                price_escalation: dec!(0),
                installed_capacity: dec!(500),
                capacity_unit: "k/yr".into(),
                production_schedule: (1..=4)
                    .map(|year| ProductionEntry {
                        year,
                        capacity_utilization: dec!(100),
                        quantity: dec!(500),
                    })
                    .collect(),
            }],
            operating_costs: vec![OperatingCost {
                category: "fuel".into(),
                description: "Gas".into(),
                cost_type: CostType::Variable,
                amount: dec!(600),
                unit_cost: dec!(1.2),
                escalation_rate: dec!(0),
                start_year: 1,
            }],
            financings: vec![],
        }
    }

    fn bear_and_bull() -> Vec<ScenarioDefinition> {
        vec![
            ScenarioDefinition {
                name: "Bear".into(),
                adjustments: vec![
                    Adjustment {
                        variable: AdjustmentVariable::Revenue,
                        delta: dec!(-15),
                    },
                    Adjustment {
                        variable: AdjustmentVariable::OperatingCosts,
                        delta: dec!(10),
                    },
                ],
            },
            ScenarioDefinition {
                name: "Bull".into(),
                adjustments: vec![Adjustment {
                    variable: AdjustmentVariable::Revenue,
                    delta: dec!(10),
                }],
            },
        ]
    }

    #[test]
    fn test_scenarios_bracket_the_base() {
        let output = evaluate_scenarios(&model(), &bear_and_bull()).unwrap();
        let analysis = &output.result;
        assert_eq!(analysis.results.len(), 2);

        let bear = &analysis.results[0];
        let bull = &analysis.results[1];
        assert!(bear.indicators.npv < analysis.base.npv);
        assert!(bull.indicators.npv > analysis.base.npv);
        assert!(bear.npv_deviation < Decimal::ZERO);
        assert!(bull.npv_deviation > Decimal::ZERO);
    }

    #[test]
    fn test_deviation_percentages_are_consistent() {
        let output = evaluate_scenarios(&model(), &bear_and_bull()).unwrap();
        let analysis = &output.result;
        for result in &analysis.results {
            let reconstructed = analysis.base.npv * (Decimal::ONE + result.npv_deviation_pct / dec!(100));
            assert!((reconstructed - result.indicators.npv).abs() < dec!(0.0001));
        }
    }

    #[test]
    fn test_empty_scenario_list_rejected() {
        assert!(evaluate_scenarios(&model(), &[]).is_err());
    }

    #[test]
    fn test_no_op_scenario_matches_base() {
        let scenarios = vec![ScenarioDefinition {
            name: "Base replay".into(),
            adjustments: vec![],
        }];
        let output = evaluate_scenarios(&model(), &scenarios).unwrap();
        let analysis = &output.result;
        assert_eq!(analysis.results[0].indicators.npv, analysis.base.npv);
        assert_eq!(analysis.results[0].npv_deviation, Decimal::ZERO);
    }
}
