pub mod amortization;
pub mod calculator;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod types;
pub mod validation;

pub use calculator::{calculate, LoanCalculationOutput};
pub use error::AmortizationError;
pub use resolver::{FinancingQuantities, LoanInput};
pub use types::*;

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
