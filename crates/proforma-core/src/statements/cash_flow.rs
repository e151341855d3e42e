use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{tax_for_year, YearSeries};
use crate::model::ProjectModel;
use crate::types::{Money, Year};

/// Annual cash flow statement row. Years run from 0 (construction start)
/// through the end of operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowYear {
    pub year: Year,
    pub operating_inflow: Money,
    pub operating_outflow: Money,
    pub investing_outflow: Money,
    pub financing_inflow: Money,
    pub financing_outflow: Money,
    pub net_cash_flow: Money,
    pub cumulative_cash_flow: Money,
    pub discounted_cash_flow: Money,
}

pub(crate) fn build(model: &ProjectModel, series: &YearSeries) -> Vec<CashFlowYear> {
    let params = &model.parameters;
    let total = params.total_years();
    let discount_step = Decimal::ONE + params.discount_rate / dec!(100);

    let mut rows = Vec::with_capacity((total + 1) as usize);
    let mut cumulative = Decimal::ZERO;
    let mut discount = Decimal::ONE;
    let mut discount_overflowed = false;

    for year in 0..=total {
        let idx = year as usize;
        if year > 0 && !discount_overflowed {
            match discount.checked_mul(discount_step) {
                Some(d) if !d.is_zero() => discount = d,
                _ => discount_overflowed = true,
            }
        }

        let operating_inflow = series.revenue[idx];
        let operating_outflow = series.costs[idx].total() + tax_for_year(model, series, year);
        let investing_outflow = series.capex[idx];
        let financing_inflow = series.financing_inflows[idx];
        let financing_outflow = series.debt_service[idx].total();

        let net_cash_flow = operating_inflow - operating_outflow - investing_outflow
            + financing_inflow
            - financing_outflow;
        cumulative += net_cash_flow;

        let discounted_cash_flow = if discount_overflowed {
            Decimal::ZERO
        } else {
            net_cash_flow.checked_div(discount).unwrap_or(Decimal::ZERO)
        };

        rows.push(CashFlowYear {
            year,
            operating_inflow,
            operating_outflow,
            investing_outflow,
            financing_inflow,
            financing_outflow,
            net_cash_flow,
            cumulative_cash_flow: cumulative,
            discounted_cash_flow,
        });
    }

    rows
}
