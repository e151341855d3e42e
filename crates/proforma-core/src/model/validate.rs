use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{DepreciationMethod, FinancingType, ProjectModel};
use crate::error::ModelProblem;
use crate::types::Percent;
use crate::{ProformaError, ProformaResult};

const MAX_CONSTRUCTION_YEARS: u32 = 10;
const MAX_OPERATION_YEARS: u32 = 50;

/// Single-pass structural validation of a project model.
///
/// Returns every problem found; an empty list means the model is safe to
/// project. No computation is attempted on an invalid model.
pub fn validate_model(model: &ProjectModel) -> Vec<ModelProblem> {
    let mut problems = Vec::new();
    let params = &model.parameters;

    if params.construction_years > MAX_CONSTRUCTION_YEARS {
        push(
            &mut problems,
            "parameters.constructionYears",
            format!("must be at most {MAX_CONSTRUCTION_YEARS}"),
        );
    }
    if params.operation_years < 1 || params.operation_years > MAX_OPERATION_YEARS {
        push(
            &mut problems,
            "parameters.operationYears",
            format!("must be between 1 and {MAX_OPERATION_YEARS}"),
        );
    }
    if !is_percent(params.tax_rate) {
        push(&mut problems, "parameters.taxRate", "must be between 0 and 100");
    }
    if params.discount_rate <= dec!(-100) {
        push(
            &mut problems,
            "parameters.discountRate",
            "must be greater than -100%",
        );
    }

    for (idx, inv) in model.investments.iter().enumerate() {
        let field = |name: &str| format!("investments[{idx}].{name}");
        if inv.amount < Decimal::ZERO {
            push(&mut problems, &field("amount"), "must not be negative");
        }
        if inv.salvage_value < Decimal::ZERO {
            push(&mut problems, &field("salvageValue"), "must not be negative");
        }
        if inv.salvage_value > inv.amount {
            push(
                &mut problems,
                &field("salvageValue"),
                "must not exceed the investment amount",
            );
        }
        if !is_percent(inv.depreciation_rate) {
            push(
                &mut problems,
                &field("depreciationRate"),
                "must be between 0 and 100",
            );
        }
        if inv.category.is_depreciable()
            && inv.depreciation_method != DepreciationMethod::None
            && inv.useful_life < 1
        {
            push(&mut problems, &field("usefulLife"), "must be at least 1");
        }
    }

    for (idx, product) in model.products.iter().enumerate() {
        let field = |name: &str| format!("products[{idx}].{name}");
        if product.unit_price < Decimal::ZERO {
            push(&mut problems, &field("unitPrice"), "must not be negative");
        }
        if !is_percent(product.price_escalation) {
            push(
                &mut problems,
                &field("priceEscalation"),
                "must be between 0 and 100",
            );
        }
        if product.installed_capacity < Decimal::ZERO {
            push(
                &mut problems,
                &field("installedCapacity"),
                "must not be negative",
            );
        }

        let mut seen_years = std::collections::BTreeSet::new();
        for (row_idx, row) in product.production_schedule.iter().enumerate() {
            let row_field =
                |name: &str| format!("products[{idx}].productionSchedule[{row_idx}].{name}");
            if row.year < 1 || row.year > params.operation_years {
                push(
                    &mut problems,
                    &row_field("year"),
                    format!("must be between 1 and {}", params.operation_years),
                );
            }
            if !seen_years.insert(row.year) {
                push(&mut problems, &row_field("year"), "duplicate schedule year");
            }
            if row.quantity < Decimal::ZERO {
                push(&mut problems, &row_field("quantity"), "must not be negative");
            }
            if !is_percent(row.capacity_utilization) {
                push(
                    &mut problems,
                    &row_field("capacityUtilization"),
                    "must be between 0 and 100",
                );
            }
        }
    }

    for (idx, cost) in model.operating_costs.iter().enumerate() {
        let field = |name: &str| format!("operatingCosts[{idx}].{name}");
        if cost.amount < Decimal::ZERO {
            push(&mut problems, &field("amount"), "must not be negative");
        }
        if cost.unit_cost < Decimal::ZERO {
            push(&mut problems, &field("unitCost"), "must not be negative");
        }
        if !is_percent(cost.escalation_rate) {
            push(
                &mut problems,
                &field("escalationRate"),
                "must be between 0 and 100",
            );
        }
        if cost.start_year < 1 {
            push(&mut problems, &field("startYear"), "must be at least 1");
        }
    }

    for (idx, financing) in model.financings.iter().enumerate() {
        let field = |name: &str| format!("financings[{idx}].{name}");
        if financing.amount < Decimal::ZERO {
            push(&mut problems, &field("amount"), "must not be negative");
        }
        if financing.financing_type == FinancingType::Loan {
            if !is_percent(financing.interest_rate) {
                push(
                    &mut problems,
                    &field("interestRate"),
                    "must be between 0 and 100",
                );
            }
            if financing.term_years < 1 {
                push(&mut problems, &field("termYears"), "must be at least 1");
            }
            if financing.term_years <= financing.grace_period {
                push(
                    &mut problems,
                    &field("gracePeriod"),
                    "must be shorter than the loan term",
                );
            }
            if financing.repayment_start_year < 1 {
                push(
                    &mut problems,
                    &field("repaymentStartYear"),
                    "must be at least 1",
                );
            }
        }
    }

    problems
}

/// Validate and convert any problems into an `InvalidModel` error.
pub fn ensure_valid(model: &ProjectModel) -> ProformaResult<()> {
    let problems = validate_model(model);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ProformaError::InvalidModel(problems))
    }
}

fn is_percent(value: Percent) -> bool {
    value >= Decimal::ZERO && value <= dec!(100)
}

fn push(problems: &mut Vec<ModelProblem>, field: &str, reason: impl Into<String>) {
    problems.push(ModelProblem {
        field: field.to_string(),
        reason: reason.into(),
    });
}
