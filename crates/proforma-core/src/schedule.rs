use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{CostType, Financing, Investment, OperatingCost, Product, ProjectParameters};
use crate::types::{Money, Percent, Year};

/// Operating costs for one year, split by behaviour. Variable costs feed
/// cost of goods sold; fixed costs feed operating expenses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSplit {
    pub variable: Money,
    pub fixed: Money,
}

impl CostSplit {
    pub fn total(&self) -> Money {
        self.variable + self.fixed
    }
}

/// Revenue across all products for one absolute year.
///
/// Zero during construction. Each product contributes
/// `quantity × unit_price` for the matching schedule row, escalated
/// annually from operating year 1; a missing row means zero output.
pub fn revenue_for_year(products: &[Product], params: &ProjectParameters, year: Year) -> Money {
    let Some(operating_year) = params.operating_year(year) else {
        return Decimal::ZERO;
    };
    products
        .iter()
        .map(|product| {
            product
                .production_schedule
                .iter()
                .find(|row| row.year == operating_year)
                .map(|row| {
                    row.quantity
                        * product.unit_price
                        * escalation_factor(product.price_escalation, operating_year - 1)
                })
                .unwrap_or(Decimal::ZERO)
        })
        .sum()
}

/// Operating costs for one absolute year, escalated from each cost's own
/// start year and split into variable and fixed components.
pub fn operating_costs_for_year(
    costs: &[OperatingCost],
    params: &ProjectParameters,
    year: Year,
) -> CostSplit {
    let Some(operating_year) = params.operating_year(year) else {
        return CostSplit::default();
    };
    let mut split = CostSplit::default();
    for cost in costs {
        if cost.start_year > operating_year {
            continue;
        }
        let contribution =
            cost.amount * escalation_factor(cost.escalation_rate, operating_year - cost.start_year);
        match cost.cost_type {
            CostType::Variable => split.variable += contribution,
            CostType::Fixed => split.fixed += contribution,
        }
    }
    split
}

/// Capital outflows landing in one absolute year.
pub fn capex_for_year(investments: &[Investment], year: Year) -> Money {
    investments
        .iter()
        .filter(|inv| inv.year == year)
        .map(|inv| inv.amount)
        .sum()
}

/// Financing disbursements (all instrument types) landing in one year.
pub fn financing_inflows_for_year(financings: &[Financing], year: Year) -> Money {
    financings
        .iter()
        .filter(|f| f.disbursement_year == year)
        .map(|f| f.amount)
        .sum()
}

/// `(1 + rate/100)^periods` by iterated multiplication, so the anchor
/// period (exponent zero) reproduces the unescalated input exactly.
pub(crate) fn escalation_factor(rate: Percent, periods: Year) -> Decimal {
    let step = Decimal::ONE + rate / dec!(100);
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor *= step;
    }
    factor
}
