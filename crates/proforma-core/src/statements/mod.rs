mod balance;
mod cash_flow;
mod income;

pub use balance::BalanceSheetYear;
pub use cash_flow::CashFlowYear;
pub use income::IncomeStatementYear;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{debt_service_for_year, DebtService};
use crate::depreciation::{self, AssetDepreciation};
use crate::model::{DepreciationMethod, ProjectModel};
use crate::schedule::{
    capex_for_year, financing_inflows_for_year, operating_costs_for_year, revenue_for_year,
    CostSplit,
};
use crate::types::{Money, Year};

/// The three annual statement series for one projection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statements {
    pub cash_flows: Vec<CashFlowYear>,
    pub income_statements: Vec<IncomeStatementYear>,
    pub balance_sheets: Vec<BalanceSheetYear>,
}

/// Per-year inputs shared by all three statements, computed once so the
/// statements stay mutually consistent. Index = absolute year.
pub(crate) struct YearSeries {
    pub revenue: Vec<Money>,
    pub costs: Vec<CostSplit>,
    pub capex: Vec<Money>,
    pub financing_inflows: Vec<Money>,
    pub depreciation: Vec<Money>,
    pub debt_service: Vec<DebtService>,
}

/// Compose the cash flow statement, income statement, and balance sheet
/// from a validated model. Returns the statements plus any recoverable
/// diagnostics (they never alter the numbers).
pub fn compose(model: &ProjectModel) -> (Statements, Vec<String>) {
    let mut warnings = Vec::new();
    let series = build_series(model, &mut warnings);

    let income_statements = income::build(model, &series);
    let cash_flows = cash_flow::build(model, &series);
    let balance_sheets = balance::build(model, &income_statements, &mut warnings);

    (
        Statements {
            cash_flows,
            income_statements,
            balance_sheets,
        },
        warnings,
    )
}

fn build_series(model: &ProjectModel, warnings: &mut Vec<String>) -> YearSeries {
    let params = &model.parameters;
    let total = params.total_years();
    let capacity = (total + 1) as usize;

    let mut series = YearSeries {
        revenue: Vec::with_capacity(capacity),
        costs: Vec::with_capacity(capacity),
        capex: Vec::with_capacity(capacity),
        financing_inflows: Vec::with_capacity(capacity),
        depreciation: Vec::with_capacity(capacity),
        debt_service: Vec::with_capacity(capacity),
    };

    let depreciable = depreciable_assets(model);
    for asset in &depreciable {
        if let Some(year) = depreciation::salvage_floor_year(asset) {
            warnings.push(format!(
                "Declining-balance asset purchased in year {} reaches its salvage floor in year {year}; later charges are zero",
                asset.purchase_year
            ));
        }
    }

    for year in 0..=total {
        series.revenue.push(revenue_for_year(&model.products, params, year));
        series
            .costs
            .push(operating_costs_for_year(&model.operating_costs, params, year));
        series.capex.push(capex_for_year(&model.investments, year));
        series
            .financing_inflows
            .push(financing_inflows_for_year(&model.financings, year));
        series.depreciation.push(
            depreciable
                .iter()
                .map(|asset| depreciation::annual_charge(asset, year))
                .sum(),
        );
        series
            .debt_service
            .push(debt_service_for_year(&model.financings, year));
    }

    series
}

/// Depreciation kernel inputs for every depreciable investment. Land and
/// working capital are filtered here; the kernel never sees categories.
pub(crate) fn depreciable_assets(model: &ProjectModel) -> Vec<AssetDepreciation> {
    model
        .investments
        .iter()
        .filter(|inv| {
            inv.category.is_depreciable() && inv.depreciation_method != DepreciationMethod::None
        })
        .map(AssetDepreciation::from)
        .collect()
}

/// Tax payable for one year: levied on income after depreciation and
/// interest, floored at zero. Losses are not carried forward.
pub(crate) fn tax_for_year(model: &ProjectModel, series: &YearSeries, year: Year) -> Money {
    let idx = year as usize;
    let taxable = series.revenue[idx]
        - series.costs[idx].total()
        - series.depreciation[idx]
        - series.debt_service[idx].interest;
    if taxable > Decimal::ZERO {
        taxable * model.parameters.tax_rate / dec!(100)
    } else {
        Decimal::ZERO
    }
}
