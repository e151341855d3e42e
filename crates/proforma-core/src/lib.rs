pub mod adjustment;
pub mod amortization;
pub mod analysis;
pub mod depreciation;
pub mod error;
pub mod indicators;
pub mod model;
pub mod projection;
pub mod schedule;
pub mod statements;
pub mod time_value;
pub mod types;

pub use error::ProformaError;
pub use types::*;

/// Standard result type for all engine operations
pub type ProformaResult<T> = Result<T, ProformaError>;
