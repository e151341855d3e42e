use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ProformaError;
use crate::types::Money;
use crate::ProformaResult;

/// Rates in this module are decimal fractions (0.10 = 10%); the percent
/// boundary lives in `indicators`.
const IRR_STEP_TOLERANCE: Decimal = dec!(0.0001);
const IRR_DERIVATIVE_GUARD: Decimal = dec!(0.0000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const BISECTION_LOW: Decimal = dec!(-0.999);
const BISECTION_HIGH: Decimal = dec!(10.0);
const BISECTION_WIDTH_TOLERANCE: Decimal = dec!(0.0000001);
const MAX_BISECTION_ITERATIONS: u32 = 100;

/// Net Present Value of a series of cash flows (index 0 is period 0).
pub fn npv(rate: Decimal, cash_flows: &[Money]) -> ProformaResult<Money> {
    if rate <= dec!(-1) {
        return Err(ProformaError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    Ok(npv_value(rate, cash_flows))
}

/// Internal Rate of Return as a decimal fraction.
///
/// Newton-Raphson from a 10% guess with a step tolerance of 1e-4; on a
/// collapsed derivative or an exhausted iteration cap, falls back to
/// bisection over [-0.999, 10.0] when the NPV changes sign across that
/// bracket. A series with no such root reports `ConvergenceFailure`
/// rather than returning garbage.
pub fn irr(cash_flows: &[Money]) -> ProformaResult<Decimal> {
    if cash_flows.len() < 2 {
        return Err(ProformaError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    if cash_flows.iter().all(|cf| cf.is_zero()) {
        // Every rate is a root of the zero series; none is meaningful.
        return Err(ProformaError::InsufficientData(
            "IRR is undefined for an all-zero cash flow series".into(),
        ));
    }

    let mut rate = dec!(0.10);

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows);

        if dnpv.abs() < IRR_DERIVATIVE_GUARD {
            return bisect(cash_flows).ok_or(ProformaError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let step = npv_val / dnpv;
        rate -= step;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }

        if step.abs() < IRR_STEP_TOLERANCE {
            return Ok(rate);
        }
    }

    bisect(cash_flows).ok_or_else(|| ProformaError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_value(rate, cash_flows),
    })
}

/// Modified IRR with separate finance and reinvestment rates (fractions).
///
/// Negative flows are discounted to present at the finance rate, positive
/// flows compounded to the horizon at the reinvestment rate. A series with
/// no negative flows returns 0.
pub fn mirr(
    cash_flows: &[Money],
    finance_rate: Decimal,
    reinvest_rate: Decimal,
) -> ProformaResult<Decimal> {
    if cash_flows.len() < 2 {
        return Err(ProformaError::InsufficientData(
            "MIRR requires at least 2 cash flows".into(),
        ));
    }

    let n = cash_flows.len() - 1;
    let overflow = || ProformaError::ConvergenceFailure {
        function: "MIRR".into(),
        iterations: 0,
        last_delta: Decimal::ZERO,
    };

    let mut pv_negative = Decimal::ZERO;
    let finance_step = Decimal::ONE + finance_rate;
    let mut discount = Decimal::ONE;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(finance_step) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
        }
        if *cf < Decimal::ZERO {
            pv_negative = cf
                .checked_div(discount)
                .and_then(|term| pv_negative.checked_add(term))
                .ok_or_else(overflow)?;
        }
    }

    let mut fv_positive = Decimal::ZERO;
    let reinvest_step = Decimal::ONE + reinvest_rate;
    for (t, cf) in cash_flows.iter().enumerate() {
        if *cf > Decimal::ZERO {
            fv_positive = compound(reinvest_step, (n - t) as u32)
                .and_then(|factor| cf.checked_mul(factor))
                .and_then(|term| fv_positive.checked_add(term))
                .ok_or_else(overflow)?;
        }
    }

    if pv_negative.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if fv_positive.is_zero() {
        // Nothing ever comes back: total loss of the outlay.
        return Ok(dec!(-1));
    }

    let ratio = (-fv_positive).checked_div(pv_negative).ok_or_else(overflow)?;
    let root = ratio.powd(Decimal::ONE / Decimal::from(n as u64));
    Ok(root - Decimal::ONE)
}

/// NPV evaluated with iterative discount factors.
///
/// Factors that overflow terminate the tail (those contributions are
/// effectively zero); quotients that overflow saturate the sum, which
/// preserves the sign the root bracket needs.
pub(crate) fn npv_value(rate: Decimal, cash_flows: &[Money]) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
        }
        let term = match cf.checked_div(discount) {
            Some(term) => term,
            None => {
                return if cf.is_sign_positive() {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                };
            }
        };
        result = match result.checked_add(term) {
            Some(sum) => sum,
            None => return result,
        };
    }

    result
}

fn npv_and_derivative(rate: Decimal, cash_flows: &[Money]) -> (Money, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
        }
        let term = match cf.checked_div(discount) {
            Some(term) => term,
            None => break,
        };
        npv_val = match npv_val.checked_add(term) {
            Some(sum) => sum,
            None => break,
        };
        if t > 0 {
            let slope = Decimal::from(t as u64)
                .checked_mul(term)
                .and_then(|v| v.checked_div(one_plus_r))
                .and_then(|v| dnpv.checked_sub(v));
            dnpv = match slope {
                Some(d) => d,
                None => break,
            };
        }
    }

    (npv_val, dnpv)
}

fn bisect(cash_flows: &[Money]) -> Option<Decimal> {
    let mut low = BISECTION_LOW;
    let mut high = BISECTION_HIGH;
    let mut f_low = npv_value(low, cash_flows);
    let f_high = npv_value(high, cash_flows);

    if f_low.is_zero() {
        return Some(low);
    }
    if f_high.is_zero() {
        return Some(high);
    }
    if f_low.is_sign_positive() == f_high.is_sign_positive() {
        return None;
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (low + high) / dec!(2);
        let f_mid = npv_value(mid, cash_flows);
        if f_mid.is_zero() || high - low < BISECTION_WIDTH_TOLERANCE {
            return Some(mid);
        }
        if f_mid.is_sign_positive() == f_low.is_sign_positive() {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }

    Some((low + high) / dec!(2))
}

fn compound(step: Decimal, periods: u32) -> Option<Decimal> {
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(step)?;
    }
    Some(factor)
}
