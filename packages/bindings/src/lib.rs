use napi::Result as NapiResult;
use napi_derive::napi;

use amortization_core::{metrics, resolver, validation, QuantityKind};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_kind(field: &str) -> NapiResult<QuantityKind> {
    serde_json::from_value(serde_json::Value::String(field.to_string())).map_err(|_| {
        to_napi_error(format!(
            "Unknown field '{field}', expected principal, rate, term or payment"
        ))
    })
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let input: resolver::LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::calculate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_metrics(input_json: String) -> NapiResult<String> {
    let input: metrics::MetricsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = metrics::calculate_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_loan_fields(input_json: String) -> NapiResult<String> {
    let input: resolver::LoanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let outcomes = resolver::validate_fields(&input);
    serde_json::to_string(&outcomes).map_err(to_napi_error)
}

/// Validate a raw JavaScript number, NaN and Infinity included.
#[napi]
pub fn validate_number(field: String, value: f64) -> NapiResult<String> {
    let outcome = validation::validate_f64(parse_kind(&field)?, value);
    serde_json::to_string(&outcome).map_err(to_napi_error)
}
