use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::adjustment::{apply_adjustments, Adjustment, AdjustmentVariable};
use crate::model::ProjectModel;
use crate::projection::compute_bundle;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::ProformaResult;

/// The standard one-way sweep: ±20% in 5-point steps around the base.
pub fn default_variations() -> Vec<Percent> {
    vec![
        dec!(-20),
        dec!(-15),
        dec!(-10),
        dec!(-5),
        dec!(0),
        dec!(5),
        dec!(10),
        dec!(15),
        dec!(20),
    ]
}

/// Input for a one-way sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityInput {
    /// Variables to sweep, one at a time
    pub variables: Vec<AdjustmentVariable>,
    /// Percentage variations applied to each variable
    #[serde(default = "default_variations")]
    pub variations: Vec<Percent>,
}

impl Default for SensitivityInput {
    fn default() -> Self {
        SensitivityInput {
            variables: AdjustmentVariable::ALL.to_vec(),
            variations: default_variations(),
        }
    }
}

/// One (variable, variation) evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    pub variable: String,
    pub variation: Percent,
    pub npv: Money,
    pub irr: Option<Percent>,
}

/// Per-variable NPV range, ordered most impactful first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TornadoRow {
    pub variable: String,
    pub low_npv: Money,
    pub base_npv: Money,
    pub high_npv: Money,
    pub impact: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityOutput {
    pub results: Vec<SensitivityResult>,
    pub tornado: Vec<TornadoRow>,
}

/// Sweep each variable over each variation, re-projecting the adjusted
/// model every time, and rank the variables by NPV impact.
///
/// The base model must be valid; an adjusted run that fails (which a
/// single multiplicative delta cannot normally cause) is skipped with a
/// warning rather than aborting the sweep.
pub fn run_sensitivity(
    model: &ProjectModel,
    input: &SensitivityInput,
) -> ProformaResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (base_bundle, _) = compute_bundle(model)?;
    let base_npv = base_bundle.indicators.npv;
    let base_irr = base_bundle.indicators.irr;

    let mut results = Vec::with_capacity(input.variables.len() * input.variations.len());
    let mut tornado = Vec::with_capacity(input.variables.len());

    for variable in &input.variables {
        let mut low_npv = base_npv;
        let mut high_npv = base_npv;

        for variation in &input.variations {
            let (npv, irr) = if variation.is_zero() {
                (base_npv, base_irr)
            } else {
                let adjusted = apply_adjustments(
                    model,
                    &[Adjustment {
                        variable: *variable,
                        delta: *variation,
                    }],
                );
                match compute_bundle(&adjusted) {
                    Ok((bundle, _)) => (bundle.indicators.npv, bundle.indicators.irr),
                    Err(e) => {
                        warnings.push(format!(
                            "Skipped {} at {variation}%: {e}",
                            variable.name()
                        ));
                        continue;
                    }
                }
            };

            low_npv = low_npv.min(npv);
            high_npv = high_npv.max(npv);
            results.push(SensitivityResult {
                variable: variable.name().to_string(),
                variation: *variation,
                npv,
                irr,
            });
        }

        tornado.push(TornadoRow {
            variable: variable.name().to_string(),
            low_npv,
            base_npv,
            high_npv,
            impact: (high_npv - low_npv).abs(),
        });
    }

    tornado.sort_by(|a, b| b.impact.cmp(&a.impact));

    let output = SensitivityOutput { results, tornado };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-Way Sensitivity Sweep (tornado-ordered)",
        &serde_json::json!({
            "project": model.name,
            "variables": input.variables.iter().map(|v| v.name()).collect::<Vec<_>>(),
            "variations": input.variations.len(),
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
    use crate::model::{
        CostType, DepreciationMethod, Investment, InvestmentCategory, OperatingCost, Product,
        ProductionEntry, ProjectParameters,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn model() -> ProjectModel {
        ProjectModel {
            name: "Mill".into(),
            parameters: ProjectParameters {
                construction_years: 1,
                operation_years: 6,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![Investment {
                category: InvestmentCategory::Machinery,
                amount: dec!(5000),
                year: 0,
                useful_life: 6,
                salvage_value: dec!(0),
                depreciation_method: DepreciationMethod::StraightLine,
                depreciation_rate: dec!(0),
            }],
            products: vec![Product {
                name: "Board".into(),
                unit: "m3".into(),
                unit_price: dec!(25),
                price_escalation: dec!(0),
                installed_capacity: dec!(100),
                capacity_unit: "m3/yr".into(),
                production_schedule: (1..=6)
                    .map(|year| ProductionEntry {
                        year,
                        capacity_utilization: dec!(100),
                        quantity: dec!(100),
                    })
                    .collect(),
            }],
            operating_costs: vec![OperatingCost {
                category: "materials".into(),
                description: "Logs".into(),
                cost_type: CostType::Variable,
                amount: dec!(800),
                unit_cost: dec!(8),
                escalation_rate: dec!(0),
                start_year: 1,
            }],
            financings: vec![],
        }
    }

    #[test]
    fn test_sweep_shape() {
        let input = SensitivityInput {
            variables: vec![AdjustmentVariable::Revenue, AdjustmentVariable::OperatingCosts],
            variations: default_variations(),
        };
        let output = run_sensitivity(&model(), &input).unwrap();
        let out = &output.result;
        assert_eq!(out.results.len(), 18);
        assert_eq!(out.tornado.len(), 2);
    }

    #[test]
    fn test_revenue_dominates_costs_in_tornado() {
        let input = SensitivityInput {
            variables: vec![AdjustmentVariable::OperatingCosts, AdjustmentVariable::Revenue],
            variations: default_variations(),
        };
        let output = run_sensitivity(&model(), &input).unwrap();
        let tornado = &output.result.tornado;
        // Revenue (2500/yr) swings NPV harder than costs (800/yr)
        assert_eq!(tornado[0].variable, "revenue");
        assert!(tornado[0].impact > tornado[1].impact);
    }

    #[test]
    fn test_npv_monotone_in_revenue_variation() {
        let input = SensitivityInput {
            variables: vec![AdjustmentVariable::Revenue],
            variations: default_variations(),
        };
        let output = run_sensitivity(&model(), &input).unwrap();
        let results = &output.result.results;
        for pair in results.windows(2) {
            assert!(pair[0].npv < pair[1].npv);
        }
    }

    #[test]
    fn test_zero_variation_matches_base() {
        let (base, _) = compute_bundle(&model()).unwrap();
        let input = SensitivityInput {
            variables: vec![AdjustmentVariable::Quantity],
            variations: vec![dec!(0)],
        };
        let output = run_sensitivity(&model(), &input).unwrap();
        assert_eq!(output.result.results[0].npv, base.indicators.npv);
        assert_eq!(output.result.tornado[0].impact, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_base_model_aborts() {
        let mut bad = model();
        bad.parameters.tax_rate = dec!(900);
        let input = SensitivityInput::default();
        assert!(run_sensitivity(&bad, &input).is_err());
    }
}
