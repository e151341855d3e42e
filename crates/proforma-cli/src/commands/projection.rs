use clap::Args;
use serde_json::Value;

use proforma_core::model::ProjectModel;
use proforma_core::projection;

use crate::input;

/// Arguments for the full projection run
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a ProjectModel JSON file (stdin if omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model = read_model(&args.input)?;
    let result = projection::run_projection(&model)?;
    Ok(serde_json::to_value(result)?)
}

/// Load a project model from `--input` or piped stdin.
pub(crate) fn read_model(
    path: &Option<String>,
) -> Result<ProjectModel, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <model.json> or piped stdin required".into())
    }
}
