use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProformaError;
use crate::time_value;
use crate::types::{Money, Percent};

/// Sentinel for indicators that have no defined value (payback never
/// reached, non-positive contribution margin).
pub const UNDEFINED: Decimal = dec!(-1);

/// Inputs to the break-even calculation, derived explicitly by the façade
/// rather than inferred inside the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenAssumptions {
    /// First-year fixed operating costs
    pub fixed_costs: Money,
    /// Representative selling price per unit
    pub unit_price: Money,
    /// Variable cost per unit across all variable cost lines
    pub variable_cost_per_unit: Money,
}

/// The complete indicator suite over one net-cash-flow series.
///
/// `irr`/`mirr` are absent when root-finding fails to converge; every
/// other field stays valid. Ratio indicators with a zero denominator
/// report zero, never NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialIndicators {
    pub npv: Money,
    /// Internal rate of return in percent
    pub irr: Option<Percent>,
    /// Modified IRR in percent, financing and reinvesting at the
    /// discount rate
    pub mirr: Option<Percent>,
    /// Years to recoup the outlay, interpolated; -1 when never recovered
    pub payback_years: Decimal,
    pub discounted_payback_years: Decimal,
    /// Total net income over total investment, in percent
    pub roi: Percent,
    pub benefit_cost_ratio: Decimal,
    /// (-1, -1) when the contribution margin is non-positive
    pub break_even_units: Decimal,
    pub break_even_revenue: Money,
}

/// Compute the full indicator suite. Non-convergence of IRR or MIRR is
/// reported through `warnings` and leaves the affected field empty.
pub fn compute_indicators(
    cash_flows: &[Money],
    discount_rate: Percent,
    total_net_income: Money,
    total_investment: Money,
    break_even: &BreakEvenAssumptions,
    warnings: &mut Vec<String>,
) -> FinancialIndicators {
    let rate = discount_rate / dec!(100);

    let npv = time_value::npv_value(rate, cash_flows);

    let irr = match time_value::irr(cash_flows) {
        Ok(r) => Some(r * dec!(100)),
        Err(e) => {
            warnings.push(describe_root_failure("IRR", &e));
            None
        }
    };

    let mirr = match time_value::mirr(cash_flows, rate, rate) {
        Ok(r) => Some(r * dec!(100)),
        Err(e) => {
            warnings.push(describe_root_failure("MIRR", &e));
            None
        }
    };

    let (break_even_units, break_even_revenue) = break_even_point(break_even);

    FinancialIndicators {
        npv,
        irr,
        mirr,
        payback_years: simple_payback(cash_flows),
        discounted_payback_years: discounted_payback(cash_flows, discount_rate),
        roi: return_on_investment(total_net_income, total_investment),
        benefit_cost_ratio: benefit_cost_ratio(cash_flows, discount_rate),
        break_even_units,
        break_even_revenue,
    }
}

/// Smallest `p` at which cumulative cash flow reaches zero, interpolated
/// linearly across the crossing year. -1 when the outlay is never
/// recovered.
pub fn simple_payback(cash_flows: &[Money]) -> Decimal {
    payback_of(cash_flows)
}

/// Payback on the discounted series.
pub fn discounted_payback(cash_flows: &[Money], discount_rate: Percent) -> Decimal {
    let rate = discount_rate / dec!(100);
    let step = Decimal::ONE + rate;
    let mut discounted = Vec::with_capacity(cash_flows.len());
    let mut discount = Decimal::ONE;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(step) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
        }
        match cf.checked_div(discount) {
            Some(term) => discounted.push(term),
            None => break,
        }
    }
    payback_of(&discounted)
}

/// Total net income over total investment, in percent; zero when nothing
/// was invested.
pub fn return_on_investment(total_net_income: Money, total_investment: Money) -> Percent {
    if total_investment.is_zero() {
        return Decimal::ZERO;
    }
    total_net_income / total_investment * dec!(100)
}

/// PV of positive flows over the initial outlay plus PV of later negative
/// flows; zero when the cost side is empty.
pub fn benefit_cost_ratio(cash_flows: &[Money], discount_rate: Percent) -> Decimal {
    if cash_flows.is_empty() {
        return Decimal::ZERO;
    }
    let rate = discount_rate / dec!(100);
    let step = Decimal::ONE + rate;

    let mut benefits = Decimal::ZERO;
    let mut costs = cash_flows[0].abs();
    let mut discount = Decimal::ONE;

    for cf in cash_flows.iter().skip(1) {
        discount = match discount.checked_mul(step) {
            Some(d) if !d.is_zero() => d,
            _ => break,
        };
        let term = match cf.abs().checked_div(discount) {
            Some(term) => term,
            None => break,
        };
        if *cf > Decimal::ZERO {
            benefits += term;
        } else {
            costs += term;
        }
    }

    if costs.is_zero() {
        Decimal::ZERO
    } else {
        benefits / costs
    }
}

/// Break-even output and revenue from fixed costs and the contribution
/// margin. A non-positive margin has no break-even: both fields are -1.
pub fn break_even_point(assumptions: &BreakEvenAssumptions) -> (Decimal, Money) {
    let margin = assumptions.unit_price - assumptions.variable_cost_per_unit;
    if margin <= Decimal::ZERO {
        return (UNDEFINED, UNDEFINED);
    }
    let units = assumptions.fixed_costs / margin;
    (units, units * assumptions.unit_price)
}

fn payback_of(cash_flows: &[Money]) -> Decimal {
    let mut cumulative = Decimal::ZERO;
    for (t, cf) in cash_flows.iter().enumerate() {
        let previous = cumulative;
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            if t == 0 || previous >= Decimal::ZERO {
                return Decimal::from(t as u64);
            }
            // previous < 0 <= cumulative, so the year's flow is positive
            let fraction = -previous / *cf;
            return Decimal::from(t as u64 - 1) + fraction;
        }
    }
    UNDEFINED
}

fn describe_root_failure(label: &str, error: &ProformaError) -> String {
    format!("{label} not reported: {error}")
}
