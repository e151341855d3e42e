use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{depreciable_assets, IncomeStatementYear};
use crate::amortization::outstanding_principal;
use crate::depreciation;
use crate::model::{FinancingType, InvestmentCategory, ProjectModel};
use crate::types::{Money, Year};

/// Simplified working-capital proxy: inventory is carried at 60% of the
/// cumulative working-capital investment; receivables are zero.
const INVENTORY_SHARE_OF_WORKING_CAPITAL: Decimal = dec!(0.6);

/// Annual balance sheet. Cash is the accounting plug, clamped at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetYear {
    pub year: Year,
    pub cash: Money,
    pub receivables: Money,
    pub inventory: Money,
    pub fixed_assets: Money,
    pub accumulated_depreciation: Money,
    pub net_fixed_assets: Money,
    pub total_assets: Money,
    pub long_term_debt: Money,
    pub total_liabilities: Money,
    pub share_capital: Money,
    pub retained_earnings: Money,
    pub total_equity: Money,
    pub total_liabilities_and_equity: Money,
}

pub(crate) fn build(
    model: &ProjectModel,
    income_statements: &[IncomeStatementYear],
    warnings: &mut Vec<String>,
) -> Vec<BalanceSheetYear> {
    let total = model.parameters.total_years();
    let assets = depreciable_assets(model);

    let mut rows = Vec::with_capacity((total + 1) as usize);
    let mut retained_earnings = Decimal::ZERO;

    for year in 0..=total {
        // Income statements are indexed from year 1.
        if year >= 1 {
            retained_earnings += income_statements[year as usize - 1].net_income;
        }

        let fixed_assets: Money = model
            .investments
            .iter()
            .filter(|inv| inv.category != InvestmentCategory::WorkingCapital && inv.year <= year)
            .map(|inv| inv.amount)
            .sum();

        let accumulated_depreciation: Money = assets
            .iter()
            .map(|asset| depreciation::accumulated(asset, year))
            .sum();

        let net_fixed_assets = fixed_assets - accumulated_depreciation;

        let working_capital_invested: Money = model
            .investments
            .iter()
            .filter(|inv| inv.category == InvestmentCategory::WorkingCapital && inv.year <= year)
            .map(|inv| inv.amount)
            .sum();
        let inventory = working_capital_invested * INVENTORY_SHARE_OF_WORKING_CAPITAL;
        let receivables = Decimal::ZERO;

        let long_term_debt: Money = model
            .loans()
            .map(|loan| outstanding_principal(loan, year))
            .sum();

        let share_capital: Money = model
            .financings
            .iter()
            .filter(|f| f.financing_type == FinancingType::Equity && f.disbursement_year <= year)
            .map(|f| f.amount)
            .sum();

        let total_liabilities = long_term_debt;
        let total_equity = share_capital + retained_earnings;

        // Cash plugs the accounting identity; a clamp means the model
        // implies negative cash, which is reported but not propagated.
        let plug = total_liabilities + total_equity - receivables - inventory - net_fixed_assets;
        let cash = plug.max(Decimal::ZERO);
        if plug < Decimal::ZERO {
            warnings.push(format!(
                "Year {year}: balance sheet implies negative cash ({plug}); clamped to zero"
            ));
        }

        let total_assets = cash + receivables + inventory + net_fixed_assets;

        rows.push(BalanceSheetYear {
            year,
            cash,
            receivables,
            inventory,
            fixed_assets,
            accumulated_depreciation,
            net_fixed_assets,
            total_assets,
            long_term_debt,
            total_liabilities,
            share_capital,
            retained_earnings,
            total_equity,
            total_liabilities_and_equity: total_liabilities + total_equity,
        });
    }

    rows
}
