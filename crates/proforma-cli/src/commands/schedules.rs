use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proforma_core::amortization::{build_loan_schedule, LoanTerms};
use proforma_core::depreciation::{full_schedule, AssetDepreciation};
use proforma_core::model::DepreciationMethod;

/// Arguments for a standalone loan schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Loan label used in the output
    #[arg(long, default_value = "loan")]
    pub name: String,
    #[arg(long)]
    pub principal: Decimal,
    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,
    /// Term in years
    #[arg(long)]
    pub term: u32,
    /// Grace years before principal repayment starts
    #[arg(long, default_value_t = 0)]
    pub grace: u32,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule = build_loan_schedule(&LoanTerms {
        name: args.name,
        principal: args.principal,
        interest_rate: args.rate,
        term_years: args.term,
        grace_period: args.grace,
    })?;
    Ok(serde_json::to_value(schedule)?)
}

/// Arguments for a standalone depreciation schedule
#[derive(Args)]
pub struct DepreciationArgs {
    #[arg(long)]
    pub cost: Decimal,
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub salvage: Decimal,
    /// Useful life in years
    #[arg(long)]
    pub life: u32,
    /// Declining-balance rate in percent
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub rate: Decimal,
    /// straight_line, declining_balance, or none
    #[arg(long, default_value = "straight_line")]
    pub method: String,
    /// Absolute purchase year
    #[arg(long, default_value_t = 0)]
    pub purchase_year: u32,
}

pub fn run_depreciation(args: DepreciationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let method = match args.method.as_str() {
        "straight_line" => DepreciationMethod::StraightLine,
        "declining_balance" => DepreciationMethod::DecliningBalance,
        "none" => DepreciationMethod::None,
        other => return Err(format!("unknown depreciation method '{other}'").into()),
    };
    let rows = full_schedule(&AssetDepreciation {
        cost: args.cost,
        salvage_value: args.salvage,
        useful_life: args.life,
        rate: args.rate,
        method,
        purchase_year: args.purchase_year,
    });
    Ok(serde_json::json!({ "rows": rows }))
}
