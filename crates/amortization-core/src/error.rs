use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Underspecified loan: {supplied} of 4 fields supplied, fill in at least 3 to compute the fourth")]
    Underspecified { supplied: usize },

    #[error("Overspecified loan: all 4 fields supplied, leave one empty to be computed")]
    Overspecified,

    #[error("Insufficient payment: installment {payment} does not exceed the interest-only amount {interest_only}")]
    InsufficientPayment {
        payment: Decimal,
        interest_only: Decimal,
    },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::SerializationError(e.to_string())
    }
}
