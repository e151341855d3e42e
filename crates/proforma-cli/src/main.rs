mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::{ScenarioArgs, SensitivityArgs};
use commands::indicators::BreakevenArgs;
use commands::projection::ProjectArgs;
use commands::schedules::{AmortizationArgs, DepreciationArgs};

/// Deterministic project-finance projections
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Deterministic project-finance projections with decimal precision",
    long_about = "A CLI for appraising investment projects: pro-forma cash flow, \
                  income and balance-sheet statements, loan amortisation and \
                  depreciation schedules, profitability indicators, and one-way \
                  sensitivity and scenario analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full projection bundle for a project model
    Project(ProjectArgs),
    /// One-way sensitivity sweep with tornado ranking
    Sensitivity(SensitivityArgs),
    /// Evaluate named scenarios against the base model
    Scenario(ScenarioArgs),
    /// Equal-principal loan amortisation schedule
    Amortization(AmortizationArgs),
    /// Per-asset depreciation schedule
    Depreciation(DepreciationArgs),
    /// Break-even point from explicit assumptions
    Breakeven(BreakevenArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Sensitivity(args) => commands::analysis::run_sensitivity(args),
        Commands::Scenario(args) => commands::analysis::run_scenario(args),
        Commands::Amortization(args) => commands::schedules::run_amortization(args),
        Commands::Depreciation(args) => commands::schedules::run_depreciation(args),
        Commands::Breakeven(args) => commands::indicators::run_breakeven(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            process::exit(1);
        }
    }
}
