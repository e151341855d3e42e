use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single structural violation found by model validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProblem {
    pub field: String,
    pub reason: String,
}

impl std::fmt::Display for ModelProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ProformaError {
    #[error("Invalid model: {}", format_problems(.0))]
    InvalidModel(Vec<ModelProblem>),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn format_problems(problems: &[ModelProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for ProformaError {
    fn from(e: serde_json::Error) -> Self {
        ProformaError::SerializationError(e.to_string())
    }
}
