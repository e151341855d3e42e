use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::YearSeries;
use crate::model::ProjectModel;
use crate::types::{Money, Year};

/// Annual income statement row. The series starts at year 1; construction
/// years carry zeroed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementYear {
    pub year: Year,
    pub revenue: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub operating_expenses: Money,
    pub depreciation: Money,
    pub operating_income: Money,
    pub interest_expense: Money,
    pub taxable_income: Money,
    pub taxes: Money,
    pub net_income: Money,
}

impl IncomeStatementYear {
    fn zeroed(year: Year) -> Self {
        IncomeStatementYear {
            year,
            revenue: Decimal::ZERO,
            cost_of_goods_sold: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            operating_expenses: Decimal::ZERO,
            depreciation: Decimal::ZERO,
            operating_income: Decimal::ZERO,
            interest_expense: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            taxes: Decimal::ZERO,
            net_income: Decimal::ZERO,
        }
    }
}

pub(crate) fn build(model: &ProjectModel, series: &YearSeries) -> Vec<IncomeStatementYear> {
    let params = &model.parameters;
    let total = params.total_years();

    let mut rows = Vec::with_capacity(total as usize);
    for year in 1..=total {
        if params.operating_year(year).is_none() {
            rows.push(IncomeStatementYear::zeroed(year));
            continue;
        }

        let idx = year as usize;
        let revenue = series.revenue[idx];
        let cost_of_goods_sold = series.costs[idx].variable;
        let gross_profit = revenue - cost_of_goods_sold;
        let operating_expenses = series.costs[idx].fixed;
        let depreciation = series.depreciation[idx];
        let operating_income = gross_profit - operating_expenses - depreciation;
        let interest_expense = series.debt_service[idx].interest;
        let taxable_income = operating_income - interest_expense;
        // No loss carry-forward: negative years simply pay no tax.
        let taxes = if taxable_income > Decimal::ZERO {
            taxable_income * params.tax_rate / dec!(100)
        } else {
            Decimal::ZERO
        };

        rows.push(IncomeStatementYear {
            year,
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            depreciation,
            operating_income,
            interest_expense,
            taxable_income,
            taxes,
            net_income: taxable_income - taxes,
        });
    }

    rows
}
