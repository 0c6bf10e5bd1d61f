use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.015 = 1.5% per period).
pub type Rate = Decimal;

/// Rates in percentage units (1.5 = 1.5% per period). Only used at the input boundary.
pub type Percent = Decimal;

/// Installment counts. Fractional only when the term itself was solved.
pub type Periods = Decimal;

/// The four related quantities of a fixed-installment loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Principal,
    Rate,
    Term,
    Payment,
}

impl QuantityKind {
    /// Fixed field order used for reporting and fail-fast validation.
    pub const ALL: [QuantityKind; 4] = [
        QuantityKind::Principal,
        QuantityKind::Rate,
        QuantityKind::Term,
        QuantityKind::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityKind::Principal => "principal",
            QuantityKind::Rate => "rate",
            QuantityKind::Term => "term",
            QuantityKind::Payment => "payment",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope returned by `calculate` and `calculate_metrics`: the loan result
/// plus the formula used, the request echoed back, and any warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Crate version, timing and numeric precision attached to each loan result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap a loan result with its methodology, echoed inputs and warnings.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
