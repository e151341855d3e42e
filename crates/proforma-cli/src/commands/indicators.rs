use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proforma_core::indicators::{break_even_point, BreakEvenAssumptions};

/// Arguments for a standalone break-even calculation
#[derive(Args)]
pub struct BreakevenArgs {
    /// Annual fixed costs
    #[arg(long)]
    pub fixed_costs: Decimal,
    /// Selling price per unit
    #[arg(long)]
    pub unit_price: Decimal,
    /// Variable cost per unit
    #[arg(long)]
    pub variable_cost: Decimal,
}

pub fn run_breakeven(args: BreakevenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = BreakEvenAssumptions {
        fixed_costs: args.fixed_costs,
        unit_price: args.unit_price,
        variable_cost_per_unit: args.variable_cost,
    };
    let (units, revenue) = break_even_point(&assumptions);
    Ok(serde_json::json!({
        "assumptions": assumptions,
        "units": units,
        "revenue": revenue,
    }))
}
