use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{build_loan_schedule, LoanSchedule, LoanTerms};
use crate::indicators::{compute_indicators, BreakEvenAssumptions, FinancialIndicators};
use crate::model::{ensure_valid, CostType, ProjectModel};
use crate::statements::{self, BalanceSheetYear, CashFlowYear, IncomeStatementYear};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::ProformaResult;

/// Everything one appraisal needs: the three statements, per-loan
/// amortisation schedules, and the profitability indicator suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionBundle {
    pub cash_flows: Vec<CashFlowYear>,
    pub income_statements: Vec<IncomeStatementYear>,
    pub balance_sheets: Vec<BalanceSheetYear>,
    pub amortizations: Vec<LoanSchedule>,
    pub indicators: FinancialIndicators,
    /// The break-even inputs actually used, so report writers do not
    /// re-derive them
    pub break_even_assumptions: BreakEvenAssumptions,
}

/// Single entry point: project a validated model into the full bundle.
///
/// Validation failures abort with `InvalidModel` before any computation;
/// recoverable conditions travel in the envelope's warnings list. Two
/// calls on the same model produce identical numeric output.
pub fn run_projection(
    model: &ProjectModel,
) -> ProformaResult<ComputationOutput<ProjectionBundle>> {
    let start = Instant::now();
    let (bundle, warnings) = compute_bundle(model)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Project Finance Projection (statements, amortisations, indicators)",
        &serde_json::json!({
            "project": model.name,
            "construction_years": model.parameters.construction_years,
            "operation_years": model.parameters.operation_years,
            "discount_rate": model.parameters.discount_rate.to_string(),
            "tax_rate": model.parameters.tax_rate.to_string(),
            "investments": model.investments.len(),
            "products": model.products.len(),
            "operating_costs": model.operating_costs.len(),
            "financings": model.financings.len(),
        }),
        warnings,
        elapsed,
        bundle,
    ))
}

/// The envelope-free core of `run_projection`, shared with the
/// sensitivity and scenario drivers.
pub(crate) fn compute_bundle(
    model: &ProjectModel,
) -> ProformaResult<(ProjectionBundle, Vec<String>)> {
    ensure_valid(model)?;

    let (statements, mut warnings) = statements::compose(model);

    let mut amortizations = Vec::new();
    for loan in model.loans() {
        let schedule = build_loan_schedule(&LoanTerms::from(loan))?;
        if schedule.fully_in_grace {
            warnings.push(format!(
                "Loan '{}' never leaves its grace period; principal is never repaid",
                schedule.name
            ));
        }
        amortizations.push(schedule);
    }

    let net_cash_flows: Vec<Money> = statements
        .cash_flows
        .iter()
        .map(|row| row.net_cash_flow)
        .collect();
    let total_net_income: Money = statements
        .income_statements
        .iter()
        .map(|row| row.net_income)
        .sum();

    let break_even_assumptions = derive_break_even_assumptions(model);
    let indicators = compute_indicators(
        &net_cash_flows,
        model.parameters.discount_rate,
        total_net_income,
        model.total_investment(),
        &break_even_assumptions,
        &mut warnings,
    );

    Ok((
        ProjectionBundle {
            cash_flows: statements.cash_flows,
            income_statements: statements.income_statements,
            balance_sheets: statements.balance_sheets,
            amortizations,
            indicators,
            break_even_assumptions,
        },
        warnings,
    ))
}

/// Derive the single-product-equivalent break-even inputs.
///
/// Fixed costs are the first-year fixed amounts; the representative unit
/// price is the quantity-weighted average across products (weights are
/// total scheduled quantities, falling back to a plain mean when no
/// output is scheduled); the unit variable cost is the sum across
/// variable cost lines.
pub fn derive_break_even_assumptions(model: &ProjectModel) -> BreakEvenAssumptions {
    let fixed_costs: Money = model
        .operating_costs
        .iter()
        .filter(|cost| cost.cost_type == CostType::Fixed)
        .map(|cost| cost.amount)
        .sum();

    let variable_cost_per_unit: Money = model
        .operating_costs
        .iter()
        .filter(|cost| cost.cost_type == CostType::Variable)
        .map(|cost| cost.unit_cost)
        .sum();

    let mut weighted_price = Decimal::ZERO;
    let mut total_quantity = Decimal::ZERO;
    for product in &model.products {
        let quantity: Decimal = product
            .production_schedule
            .iter()
            .map(|row| row.quantity)
            .sum();
        weighted_price += product.unit_price * quantity;
        total_quantity += quantity;
    }
    let unit_price = if total_quantity > Decimal::ZERO {
        weighted_price / total_quantity
    } else if model.products.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Money = model.products.iter().map(|p| p.unit_price).sum();
        sum / Decimal::from(model.products.len() as u64)
    };

    BreakEvenAssumptions {
        fixed_costs,
        unit_price,
        variable_cost_per_unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OperatingCost, Product, ProductionEntry, ProjectParameters};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn empty_model() -> ProjectModel {
        ProjectModel {
            name: "Shell".into(),
            parameters: ProjectParameters {
                construction_years: 0,
                operation_years: 3,
                discount_rate: dec!(10),
                inflation_rate: dec!(0),
                tax_rate: dec!(25),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            },
            investments: vec![],
            products: vec![],
            operating_costs: vec![],
            financings: vec![],
        }
    }

    fn product(price: Decimal, quantities: Vec<(u32, Decimal)>) -> Product {
        Product {
            name: "P".into(),
            unit: "t".into(),
            unit_price: price,
            price_escalation: dec!(0),
            installed_capacity: dec!(0),
            capacity_unit: "t/yr".into(),
            production_schedule: quantities
                .into_iter()
                .map(|(year, quantity)| ProductionEntry {
                    year,
                    capacity_utilization: dec!(0),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_break_even_price_is_quantity_weighted() {
        let mut model = empty_model();
        model.products = vec![
            product(dec!(10), vec![(1, dec!(300))]),
            product(dec!(20), vec![(1, dec!(100))]),
        ];
        let assumptions = derive_break_even_assumptions(&model);
        // (10×300 + 20×100) / 400 = 12.5
        assert_eq!(assumptions.unit_price, dec!(12.5));
    }

    #[test]
    fn test_break_even_price_falls_back_to_mean() {
        let mut model = empty_model();
        model.products = vec![product(dec!(10), vec![]), product(dec!(20), vec![])];
        let assumptions = derive_break_even_assumptions(&model);
        assert_eq!(assumptions.unit_price, dec!(15));
    }

    #[test]
    fn test_break_even_costs_split() {
        let mut model = empty_model();
        model.operating_costs = vec![
            OperatingCost {
                category: "labour".into(),
                description: "Fixed".into(),
                cost_type: CostType::Fixed,
                amount: dec!(8000),
                unit_cost: dec!(0),
                escalation_rate: dec!(0),
                start_year: 1,
            },
            OperatingCost {
                category: "materials".into(),
                description: "Var".into(),
                cost_type: CostType::Variable,
                amount: dec!(5000),
                unit_cost: dec!(35),
                escalation_rate: dec!(0),
                start_year: 1,
            },
        ];
        let assumptions = derive_break_even_assumptions(&model);
        assert_eq!(assumptions.fixed_costs, dec!(8000));
        assert_eq!(assumptions.variable_cost_per_unit, dec!(35));
    }

    #[test]
    fn test_empty_model_projects_cleanly() {
        let output = run_projection(&empty_model()).unwrap();
        let bundle = &output.result;
        assert_eq!(bundle.cash_flows.len(), 4);
        assert_eq!(bundle.income_statements.len(), 3);
        assert_eq!(bundle.balance_sheets.len(), 4);
        assert!(bundle.amortizations.is_empty());
        assert_eq!(bundle.indicators.npv, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_model_aborts_without_results() {
        let mut model = empty_model();
        model.parameters.operation_years = 0;
        assert!(run_projection(&model).is_err());
    }
}
