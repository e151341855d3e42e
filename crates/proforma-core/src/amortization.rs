use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProformaError;
use crate::model::{Financing, FinancingType};
use crate::types::{Money, Percent, Year};
use crate::ProformaResult;

/// Terms of a single loan, as accepted by the amortisation kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub name: String,
    pub principal: Money,
    /// Annual interest rate in percent
    pub interest_rate: Percent,
    pub term_years: Year,
    pub grace_period: Year,
}

impl From<&Financing> for LoanTerms {
    fn from(f: &Financing) -> Self {
        LoanTerms {
            name: f.name.clone(),
            principal: f.amount,
            interest_rate: f.interest_rate,
            term_years: f.term_years,
            grace_period: f.grace_period,
        }
    }
}

/// A single period in an equal-principal amortisation schedule.
/// `year` is the 1-based row index within the repayment window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub year: Year,
    pub beginning_balance: Money,
    pub principal: Money,
    pub interest: Money,
    pub payment: Money,
    pub ending_balance: Money,
}

/// Complete schedule for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSchedule {
    pub name: String,
    pub rows: Vec<AmortizationRow>,
    pub total_principal: Money,
    pub total_interest: Money,
    /// Set when the grace period swallows the whole term; such a loan
    /// never repays principal and is flagged rather than rejected here.
    pub fully_in_grace: bool,
}

/// Aggregate debt service owed in one absolute project year.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtService {
    pub principal: Money,
    pub interest: Money,
}

impl DebtService {
    pub fn total(&self) -> Money {
        self.principal + self.interest
    }
}

/// Build an equal-principal schedule with an optional grace period.
///
/// Interest accrues on the outstanding balance in every row; principal is
/// repaid in equal instalments once the grace period ends, so payments
/// decline over time. A zero term yields an empty schedule. A grace period
/// covering the whole term degrades to an all-grace schedule with the
/// `fully_in_grace` flag set; model-level validation rejects such loans
/// before they reach a projection.
pub fn build_loan_schedule(terms: &LoanTerms) -> ProformaResult<LoanSchedule> {
    if terms.principal < Decimal::ZERO {
        return Err(ProformaError::InvalidInput {
            field: "principal".into(),
            reason: "Loan principal must not be negative".into(),
        });
    }

    let rate = terms.interest_rate / dec!(100);
    let fully_in_grace = terms.term_years > 0 && terms.grace_period >= terms.term_years;
    let repayment_years = terms.term_years.saturating_sub(terms.grace_period);
    let per_year = if repayment_years > 0 {
        terms.principal / Decimal::from(repayment_years)
    } else {
        Decimal::ZERO
    };

    let mut rows = Vec::with_capacity(terms.term_years as usize);
    let mut balance = terms.principal;
    let mut total_principal = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    for year in 1..=terms.term_years {
        let beginning_balance = balance;
        let interest = beginning_balance * rate;
        let principal = if year <= terms.grace_period {
            Decimal::ZERO
        } else if year == terms.term_years {
            // Final row clears the balance exactly, absorbing any
            // residual from the equal-instalment division.
            beginning_balance
        } else {
            per_year.min(beginning_balance)
        };

        balance = (beginning_balance - principal).max(Decimal::ZERO);
        total_principal += principal;
        total_interest += interest;

        rows.push(AmortizationRow {
            year,
            beginning_balance,
            principal,
            interest,
            payment: principal + interest,
            ending_balance: balance,
        });
    }

    Ok(LoanSchedule {
        name: terms.name.clone(),
        rows,
        total_principal,
        total_interest,
        fully_in_grace,
    })
}

/// Sum principal and interest falling due in `year` across all loan
/// instruments. Equity and grants contribute nothing.
pub fn debt_service_for_year(financings: &[Financing], year: Year) -> DebtService {
    let mut service = DebtService::default();
    for financing in financings {
        if financing.financing_type != FinancingType::Loan {
            continue;
        }
        if let Some(row) = schedule_row(financing, year) {
            service.principal += row.principal;
            service.interest += row.interest;
        }
    }
    service
}

/// Remaining principal on one instrument at the end of `year`, as carried
/// on the balance sheet. Zero before disbursement and after the final
/// instalment.
pub fn outstanding_principal(financing: &Financing, year: Year) -> Money {
    if financing.financing_type != FinancingType::Loan || year < financing.disbursement_year {
        return Decimal::ZERO;
    }
    let rows_elapsed = if year < financing.repayment_start_year {
        0
    } else {
        (year - financing.repayment_start_year + 1).min(financing.term_years)
    };
    let repayment_years = financing.term_years.saturating_sub(financing.grace_period);
    let paid_rows = rows_elapsed.saturating_sub(financing.grace_period);
    if repayment_years > 0 && paid_rows >= repayment_years {
        return Decimal::ZERO;
    }
    let per_year = if repayment_years > 0 {
        financing.amount / Decimal::from(repayment_years)
    } else {
        Decimal::ZERO
    };
    (financing.amount - per_year * Decimal::from(paid_rows)).max(Decimal::ZERO)
}

/// The schedule row of a loan falling in absolute `year`, if the year lies
/// inside the repayment window.
fn schedule_row(financing: &Financing, year: Year) -> Option<AmortizationRow> {
    if year < financing.repayment_start_year {
        return None;
    }
    let row_index = year - financing.repayment_start_year + 1;
    if row_index > financing.term_years {
        return None;
    }
    let schedule = build_loan_schedule(&LoanTerms::from(financing)).ok()?;
    schedule.rows.into_iter().nth(row_index as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_terms() -> LoanTerms {
        LoanTerms {
            name: "Senior loan".into(),
            principal: dec!(100000),
            interest_rate: dec!(10),
            term_years: 5,
            grace_period: 0,
        }
    }

    #[test]
    fn test_equal_principal_schedule() {
        let schedule = build_loan_schedule(&standard_terms()).unwrap();
        assert_eq!(schedule.rows.len(), 5);

        // Year 1: interest on the full principal
        assert_eq!(schedule.rows[0].interest, dec!(10000));
        assert_eq!(schedule.rows[0].principal, dec!(20000));
        assert_eq!(schedule.rows[0].ending_balance, dec!(80000));

        // Interest declines as the balance amortises
        assert_eq!(schedule.rows[1].interest, dec!(8000));
        assert_eq!(schedule.rows[4].interest, dec!(2000));

        assert_eq!(schedule.total_principal, dec!(100000));
        assert_eq!(schedule.rows[4].ending_balance, Decimal::ZERO);
        assert!(!schedule.fully_in_grace);
    }

    #[test]
    fn test_grace_period_defers_principal() {
        let mut terms = standard_terms();
        terms.grace_period = 2;
        let schedule = build_loan_schedule(&terms).unwrap();

        assert_eq!(schedule.rows[0].principal, Decimal::ZERO);
        assert_eq!(schedule.rows[1].principal, Decimal::ZERO);
        // Interest-only rows still accrue on the full balance
        assert_eq!(schedule.rows[1].interest, dec!(10000));

        let instalment = dec!(100000) / dec!(3);
        assert_eq!(schedule.rows[2].principal, instalment);
        assert_eq!(schedule.rows[3].principal, instalment);
        assert_eq!(schedule.total_principal, dec!(100000));
        assert_eq!(schedule.rows[4].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_single_repayment_year() {
        let mut terms = standard_terms();
        terms.grace_period = 4;
        let schedule = build_loan_schedule(&terms).unwrap();
        // Exactly one principal payment, equal to the full principal.
        assert_eq!(schedule.rows[3].principal, Decimal::ZERO);
        assert_eq!(schedule.rows[4].principal, dec!(100000));
        assert_eq!(schedule.rows[4].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_yields_empty_schedule() {
        let mut terms = standard_terms();
        terms.term_years = 0;
        let schedule = build_loan_schedule(&terms).unwrap();
        assert!(schedule.rows.is_empty());
        assert_eq!(schedule.total_principal, Decimal::ZERO);
    }

    #[test]
    fn test_grace_swallowing_term_flags_schedule() {
        let mut terms = standard_terms();
        terms.grace_period = 5;
        let schedule = build_loan_schedule(&terms).unwrap();
        assert!(schedule.fully_in_grace);
        assert_eq!(schedule.total_principal, Decimal::ZERO);
        for row in &schedule.rows {
            assert_eq!(row.principal, Decimal::ZERO);
            assert_eq!(row.interest, dec!(10000));
        }
    }

    #[test]
    fn test_negative_principal_rejected() {
        let mut terms = standard_terms();
        terms.principal = dec!(-1);
        assert!(build_loan_schedule(&terms).is_err());
    }

    fn loan_financing() -> Financing {
        Financing {
            financing_type: FinancingType::Loan,
            name: "Senior loan".into(),
            amount: dec!(100000),
            interest_rate: dec!(10),
            term_years: 5,
            grace_period: 0,
            disbursement_year: 0,
            repayment_start_year: 2,
        }
    }

    #[test]
    fn test_debt_service_aggregation_window() {
        let financings = vec![loan_financing()];
        // Before repayment starts
        assert_eq!(debt_service_for_year(&financings, 1).total(), Decimal::ZERO);
        // First row: full-balance interest plus one instalment
        let first = debt_service_for_year(&financings, 2);
        assert_eq!(first.interest, dec!(10000));
        assert_eq!(first.principal, dec!(20000));
        // Past the end of the term
        assert_eq!(debt_service_for_year(&financings, 7).total(), Decimal::ZERO);
    }

    #[test]
    fn test_debt_service_ignores_equity_and_grants() {
        let mut equity = loan_financing();
        equity.financing_type = FinancingType::Equity;
        let mut grant = loan_financing();
        grant.financing_type = FinancingType::Grant;
        let service = debt_service_for_year(&[equity, grant], 2);
        assert_eq!(service.total(), Decimal::ZERO);
    }

    #[test]
    fn test_outstanding_principal_declines_to_zero() {
        let loan = loan_financing();
        // Disbursed but not yet amortising
        assert_eq!(outstanding_principal(&loan, 0), dec!(100000));
        assert_eq!(outstanding_principal(&loan, 1), dec!(100000));
        // One instalment paid by end of year 2
        assert_eq!(outstanding_principal(&loan, 2), dec!(80000));
        assert_eq!(outstanding_principal(&loan, 5), dec!(20000));
        assert_eq!(outstanding_principal(&loan, 6), Decimal::ZERO);
        assert_eq!(outstanding_principal(&loan, 20), Decimal::ZERO);
    }

    #[test]
    fn test_outstanding_respects_grace() {
        let mut loan = loan_financing();
        loan.grace_period = 2;
        // Rows 1-2 (years 2-3) are grace: balance untouched
        assert_eq!(outstanding_principal(&loan, 3), dec!(100000));
        let instalment = dec!(100000) / dec!(3);
        assert_eq!(outstanding_principal(&loan, 4), dec!(100000) - instalment);
        assert_eq!(outstanding_principal(&loan, 6), Decimal::ZERO);
    }
}
