use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use proforma_core::adjustment::{self, AdjustmentVariable};
use proforma_core::analysis::scenario::{evaluate_scenarios, ScenarioDefinition};
use proforma_core::analysis::sensitivity::{self, default_variations, SensitivityInput};

use super::projection::read_model;
use crate::input;

/// Arguments for a one-way sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a ProjectModel JSON file (stdin if omitted)
    #[arg(long)]
    pub input: Option<String>,
    /// Comma-separated variable names (default: all recognised variables)
    #[arg(long)]
    pub variables: Option<String>,
    /// Comma-separated percentage variations (default: -20..20 in 5s)
    #[arg(long)]
    pub variations: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model = read_model(&args.input)?;

    let variables = match &args.variables {
        Some(list) => {
            let mut parsed = Vec::new();
            for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match AdjustmentVariable::parse(name) {
                    Some(variable) => parsed.push(variable),
                    None => eprintln!("warning: unknown sensitivity variable '{name}' ignored"),
                }
            }
            if parsed.is_empty() {
                return Err("no recognised sensitivity variables".into());
            }
            parsed
        }
        None => AdjustmentVariable::ALL.to_vec(),
    };

    let variations = match &args.variations {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Decimal>)
            .collect::<Result<Vec<_>, _>>()?,
        None => default_variations(),
    };

    let result = sensitivity::run_sensitivity(
        &model,
        &SensitivityInput {
            variables,
            variations,
        },
    )?;
    Ok(serde_json::to_value(result)?)
}

/// External scenario file shape: named percentage deltas per scenario.
#[derive(Deserialize)]
struct NamedScenario {
    name: String,
    deltas: BTreeMap<String, Decimal>,
}

/// Arguments for named scenario evaluation
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to a ProjectModel JSON file (stdin if omitted)
    #[arg(long)]
    pub input: Option<String>,
    /// Path to a JSON list of {name, deltas} scenarios
    #[arg(long)]
    pub scenarios: String,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model = read_model(&args.input)?;
    let named: Vec<NamedScenario> = input::file::read_json(&args.scenarios)?;

    let mut definitions = Vec::with_capacity(named.len());
    for scenario in named {
        let (adjustments, ignored) = adjustment::from_named_deltas(&scenario.deltas);
        for name in ignored {
            eprintln!(
                "warning: scenario '{}' ignores unknown variable '{name}'",
                scenario.name
            );
        }
        definitions.push(ScenarioDefinition {
            name: scenario.name,
            adjustments,
        });
    }

    let result = evaluate_scenarios(&model, &definitions)?;
    Ok(serde_json::to_value(result)?)
}
