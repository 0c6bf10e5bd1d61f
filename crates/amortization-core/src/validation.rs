//! Per-field input validation.
//!
//! Each quantity kind has a fixed acceptance rule (sign, range, precision).
//! Validators never look at the other fields, so they can run before the
//! resolver knows which quantity is being solved. Rates are validated in
//! percentage units, the way users type them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::AmortizationError;
use crate::types::QuantityKind;
use crate::AmortizationResult;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Upper bound for principal and payment amounts.
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000);

/// Upper bound for the periodic rate, in percent.
pub const MAX_RATE_PERCENT: Decimal = dec!(100);

/// Upper bound for the number of installments (50 years of monthly payments).
pub const MAX_TERM: Decimal = dec!(600);

const AMOUNT_DECIMALS: u32 = 2;
const RATE_DECIMALS: u32 = 4;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotANumber,
    NotPositive,
    Negative,
    AboveMaximum,
    BelowMinimum,
    NotAnInteger,
    TooManyDecimals,
}

/// Result of validating one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub field: QuantityKind,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Human-readable explanation; empty when accepted.
    pub message: String,
}

impl ValidationOutcome {
    fn accept(field: QuantityKind) -> Self {
        ValidationOutcome {
            field,
            accepted: true,
            reason: None,
            message: String::new(),
        }
    }

    fn reject(field: QuantityKind, reason: RejectionReason) -> Self {
        ValidationOutcome {
            field,
            accepted: false,
            reason: Some(reason),
            message: rejection_message(field, reason),
        }
    }

    /// Convert into the crate error, for fail-fast callers.
    pub fn into_result(self) -> AmortizationResult<()> {
        if self.accepted {
            Ok(())
        } else {
            Err(AmortizationError::InvalidInput {
                field: self.field.to_string(),
                reason: self.message,
            })
        }
    }
}

struct FieldRule {
    allow_zero: bool,
    maximum: Decimal,
    minimum: Option<Decimal>,
    max_decimals: u32,
    integer: bool,
}

fn rule_for(kind: QuantityKind) -> FieldRule {
    match kind {
        QuantityKind::Principal | QuantityKind::Payment => FieldRule {
            allow_zero: false,
            maximum: MAX_AMOUNT,
            minimum: None,
            max_decimals: AMOUNT_DECIMALS,
            integer: false,
        },
        QuantityKind::Rate => FieldRule {
            allow_zero: true,
            maximum: MAX_RATE_PERCENT,
            minimum: None,
            max_decimals: RATE_DECIMALS,
            integer: false,
        },
        QuantityKind::Term => FieldRule {
            allow_zero: false,
            maximum: MAX_TERM,
            minimum: Some(Decimal::ONE),
            max_decimals: 0,
            integer: true,
        },
    }
}

fn field_label(kind: QuantityKind) -> &'static str {
    match kind {
        QuantityKind::Principal => "Principal",
        QuantityKind::Rate => "Interest rate",
        QuantityKind::Term => "Term",
        QuantityKind::Payment => "Payment",
    }
}

fn rejection_message(kind: QuantityKind, reason: RejectionReason) -> String {
    let label = field_label(kind);
    let rule = rule_for(kind);
    match reason {
        RejectionReason::NotANumber => format!("{label} must be a valid number"),
        RejectionReason::NotPositive => format!("{label} must be greater than zero"),
        RejectionReason::Negative => format!("{label} cannot be negative"),
        RejectionReason::AboveMaximum => match kind {
            QuantityKind::Rate => format!("{label} is too high (maximum {}%)", rule.maximum),
            QuantityKind::Term => {
                format!("{label} is too high (maximum {} installments)", rule.maximum)
            }
            _ => format!("{label} is too high (maximum {})", rule.maximum),
        },
        RejectionReason::BelowMinimum => format!(
            "{label} must be at least {}",
            rule.minimum.unwrap_or(Decimal::ZERO)
        ),
        RejectionReason::NotAnInteger => format!("{label} must be a whole number"),
        RejectionReason::TooManyDecimals => format!(
            "{label} must have at most {} decimal places",
            rule.max_decimals
        ),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a decimal value for the given quantity kind.
///
/// Rates are expected in percentage units (`1.5` for 1.5%).
pub fn validate(kind: QuantityKind, value: Decimal) -> ValidationOutcome {
    check(
        kind,
        value,
        value.cmp(&Decimal::ZERO),
        fractional_digits(value),
    )
}

pub fn validate_principal(value: Decimal) -> ValidationOutcome {
    validate(QuantityKind::Principal, value)
}

pub fn validate_rate_percent(value: Decimal) -> ValidationOutcome {
    validate(QuantityKind::Rate, value)
}

pub fn validate_term(value: Decimal) -> ValidationOutcome {
    validate(QuantityKind::Term, value)
}

pub fn validate_payment(value: Decimal) -> ValidationOutcome {
    validate(QuantityKind::Payment, value)
}

/// Validate a raw binary float, as handed over by a JavaScript or JSON caller.
///
/// NaN and infinities are rejected as `NotANumber`. Precision is counted on the
/// float's shortest scientific rendering, so tiny values are not misreported.
pub fn validate_f64(kind: QuantityKind, value: f64) -> ValidationOutcome {
    let sign = match value.partial_cmp(&0.0) {
        Some(ordering) if value.is_finite() => ordering,
        _ => return ValidationOutcome::reject(kind, RejectionReason::NotANumber),
    };

    // Magnitudes beyond the decimal range are clamped; they fail the range check anyway.
    let decimal = value.to_string().parse::<Decimal>().unwrap_or(match sign {
        Ordering::Less => Decimal::MIN,
        _ => Decimal::MAX,
    });

    check(kind, decimal, sign, fractional_digits_f64(value))
}

/// Number of significant fractional digits. Trailing zeros do not count.
pub fn fractional_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Number of fractional digits of a float, derived from its scientific form.
///
/// `1.2345e-7` has 4 mantissa digits shifted 7 places right: 11 digits.
/// Non-finite values have no digits.
pub fn fractional_digits_f64(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }

    let rendered = format!("{value:e}");
    let (mantissa, exponent) = match rendered.split_once('e') {
        Some(parts) => parts,
        None => return 0,
    };
    let exponent: i64 = exponent.parse().unwrap_or(0);
    let mantissa_digits = mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction.len() as i64)
        .unwrap_or(0);

    (mantissa_digits - exponent).max(0) as u32
}

/// Parse a text field into a number.
///
/// Blank text means the field was left empty and yields `Ok(None)`. A comma is
/// accepted as decimal separator and scientific notation is understood.
pub fn parse_field(text: &str) -> Result<Option<Decimal>, RejectionReason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalised = trimmed.replacen(',', ".", 1);
    let parsed = if normalised.contains(|c| c == 'e' || c == 'E') {
        Decimal::from_scientific(&normalised)
    } else {
        Decimal::from_str(&normalised)
    };

    parsed.map(Some).map_err(|_| RejectionReason::NotANumber)
}

// ---------------------------------------------------------------------------
// Rule evaluation
// ---------------------------------------------------------------------------

fn check(kind: QuantityKind, value: Decimal, sign: Ordering, digits: u32) -> ValidationOutcome {
    let rule = rule_for(kind);

    if rule.allow_zero {
        if sign == Ordering::Less {
            return ValidationOutcome::reject(kind, RejectionReason::Negative);
        }
    } else if sign != Ordering::Greater {
        return ValidationOutcome::reject(kind, RejectionReason::NotPositive);
    }

    if value > rule.maximum {
        return ValidationOutcome::reject(kind, RejectionReason::AboveMaximum);
    }

    if let Some(minimum) = rule.minimum {
        if value < minimum {
            return ValidationOutcome::reject(kind, RejectionReason::BelowMinimum);
        }
    }

    if rule.integer {
        if digits > 0 {
            return ValidationOutcome::reject(kind, RejectionReason::NotAnInteger);
        }
    } else if digits > rule.max_decimals {
        return ValidationOutcome::reject(kind, RejectionReason::TooManyDecimals);
    }

    ValidationOutcome::accept(kind)
}
