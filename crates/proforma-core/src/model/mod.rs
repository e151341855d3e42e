mod validate;

pub use validate::{ensure_valid, validate_model};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Year};

/// Run-level parameters, immutable for the duration of a projection.
///
/// The construction phase spans absolute years `[0, construction_years)`;
/// operating years are 1-based and map to absolute years
/// `construction_years + 1 ..= construction_years + operation_years`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    pub construction_years: Year,
    pub operation_years: Year,
    /// Discount rate in percent, applied to all present-value calculations
    pub discount_rate: Percent,
    /// Carried on the contract for callers; escalation is modelled per
    /// product/cost, so this field does not enter the computation.
    pub inflation_rate: Percent,
    pub tax_rate: Percent,
    /// Calendar anchor for labelling output years. Inert otherwise.
    pub start_date: NaiveDate,
}

impl ProjectParameters {
    /// Last absolute year of the projection horizon.
    pub fn total_years(&self) -> Year {
        self.construction_years + self.operation_years
    }

    /// Operating-year index (1-based) for an absolute year, if the year
    /// falls in the operating phase.
    pub fn operating_year(&self, year: Year) -> Option<Year> {
        if year > self.construction_years && year <= self.total_years() {
            Some(year - self.construction_years)
        } else {
            None
        }
    }
}

/// Capital expenditure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentCategory {
    Land,
    Buildings,
    Machinery,
    Equipment,
    Vehicles,
    Furniture,
    Preproduction,
    WorkingCapital,
    Other,
}

impl InvestmentCategory {
    /// Land and working capital never depreciate, regardless of the
    /// method stated on the investment.
    pub fn is_depreciable(self) -> bool {
        !matches!(self, Self::Land | Self::WorkingCapital)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    StraightLine,
    DecliningBalance,
    None,
}

/// A single capital expenditure item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub category: InvestmentCategory,
    pub amount: Money,
    /// Absolute year the outflow lands (0 = construction start)
    pub year: Year,
    pub useful_life: Year,
    pub salvage_value: Money,
    pub depreciation_method: DepreciationMethod,
    /// Declining-balance rate in percent; ignored by other methods
    pub depreciation_rate: Percent,
}

/// One row of a product's production plan. Missing operating years imply
/// zero output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    /// Operating year, 1-based
    pub year: Year,
    pub capacity_utilization: Percent,
    /// Authoritative output quantity for the year
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    /// Annual price escalation in percent, anchored at operating year 1
    pub price_escalation: Percent,
    pub installed_capacity: Decimal,
    pub capacity_unit: String,
    pub production_schedule: Vec<ProductionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Fixed,
    Variable,
}

/// An annual operating cost line. `amount` is the first-year figure;
/// `unit_cost` feeds the break-even calculation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCost {
    pub category: String,
    pub description: String,
    pub cost_type: CostType,
    pub amount: Money,
    pub unit_cost: Money,
    pub escalation_rate: Percent,
    /// First operating year (1-based) the cost applies
    pub start_year: Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingType {
    Equity,
    Loan,
    Grant,
}

/// A financing instrument. Equity and grants ignore the loan fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    #[serde(rename = "type")]
    pub financing_type: FinancingType,
    pub name: String,
    pub amount: Money,
    pub interest_rate: Percent,
    pub term_years: Year,
    pub grace_period: Year,
    /// Absolute year the funds arrive
    pub disbursement_year: Year,
    /// Absolute year the first amortisation row falls in
    pub repayment_start_year: Year,
}

/// Frozen snapshot of an investment project. Assembled by the caller,
/// never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    pub name: String,
    pub parameters: ProjectParameters,
    pub investments: Vec<Investment>,
    pub products: Vec<Product>,
    pub operating_costs: Vec<OperatingCost>,
    pub financings: Vec<Financing>,
}

impl ProjectModel {
    /// Sum of all capital expenditure amounts, every category included.
    pub fn total_investment(&self) -> Money {
        self.investments.iter().map(|i| i.amount).sum()
    }

    pub fn loans(&self) -> impl Iterator<Item = &Financing> {
        self.financings
            .iter()
            .filter(|f| f.financing_type == FinancingType::Loan)
    }
}
