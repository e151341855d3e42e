use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn run_projection(model_json: String) -> NapiResult<String> {
    let model: proforma_core::model::ProjectModel =
        serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let output = proforma_core::projection::run_projection(&model).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_model(model_json: String) -> NapiResult<String> {
    let model: proforma_core::model::ProjectModel =
        serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let problems = proforma_core::model::validate_model(&model);
    serde_json::to_string(&problems).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity & scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(model_json: String, input_json: String) -> NapiResult<String> {
    let model: proforma_core::model::ProjectModel =
        serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let input: proforma_core::analysis::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::analysis::sensitivity::run_sensitivity(&model, &input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_scenarios(model_json: String, scenarios_json: String) -> NapiResult<String> {
    let model: proforma_core::model::ProjectModel =
        serde_json::from_str(&model_json).map_err(to_napi_error)?;
    let scenarios: Vec<proforma_core::analysis::scenario::ScenarioDefinition> =
        serde_json::from_str(&scenarios_json).map_err(to_napi_error)?;
    let output = proforma_core::analysis::scenario::evaluate_scenarios(&model, &scenarios)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Standalone schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn build_loan_schedule(terms_json: String) -> NapiResult<String> {
    let terms: proforma_core::amortization::LoanTerms =
        serde_json::from_str(&terms_json).map_err(to_napi_error)?;
    let output = proforma_core::amortization::build_loan_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn depreciation_schedule(asset_json: String) -> NapiResult<String> {
    let asset: proforma_core::depreciation::AssetDepreciation =
        serde_json::from_str(&asset_json).map_err(to_napi_error)?;
    let rows = proforma_core::depreciation::full_schedule(&asset);
    serde_json::to_string(&rows).map_err(to_napi_error)
}
