//! Summary figures for a fully known loan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::SolveResult;
use crate::error::AmortizationError;
use crate::resolver::FinancingQuantities;
use crate::types::{with_metadata, ComputationOutput, Money, Periods, QuantityKind, Rate};
use crate::validation;
use crate::AmortizationResult;

/// All four quantities of a loan, after solving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompleteQuantities {
    pub principal: Money,
    /// Decimal rate per period.
    pub rate: Rate,
    /// Fractional when the term was the solved quantity.
    pub term: Periods,
    pub payment: Money,
}

impl CompleteQuantities {
    /// Fill the unknown slot of `quantities` with the solved value.
    pub fn from_solution(quantities: &FinancingQuantities, solution: &SolveResult) -> Self {
        let value = solution.value;
        match *quantities {
            FinancingQuantities::Principal {
                rate,
                term,
                payment,
            } => CompleteQuantities {
                principal: value,
                rate,
                term: Decimal::from(term),
                payment,
            },
            FinancingQuantities::Rate {
                principal,
                term,
                payment,
            } => CompleteQuantities {
                principal,
                rate: value,
                term: Decimal::from(term),
                payment,
            },
            FinancingQuantities::Term {
                principal,
                rate,
                payment,
            } => CompleteQuantities {
                principal,
                rate,
                term: value,
                payment,
            },
            FinancingQuantities::Payment {
                principal,
                rate,
                term,
            } => CompleteQuantities {
                principal,
                rate,
                term: Decimal::from(term),
                payment: value,
            },
        }
    }
}

/// Totals over the life of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Inputs for computing totals without solving anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInput {
    pub principal: Money,
    pub term: Periods,
    pub payment: Money,
}

/// Sum of all installments.
pub fn total_paid(payment: Money, term: Periods) -> AmortizationResult<Money> {
    payment
        .checked_mul(term)
        .ok_or_else(|| out_of_range("total_paid", "Installments times term overflows"))
}

/// Installments paid beyond the amount financed.
pub fn total_interest(principal: Money, payment: Money, term: Periods) -> AmortizationResult<Money> {
    total_paid(payment, term)?
        .checked_sub(principal)
        .ok_or_else(|| out_of_range("total_interest", "Total paid minus principal overflows"))
}

pub fn derive_metrics(quantities: &CompleteQuantities) -> AmortizationResult<DerivedMetrics> {
    Ok(DerivedMetrics {
        total_paid: total_paid(quantities.payment, quantities.term)?,
        total_interest: total_interest(quantities.principal, quantities.payment, quantities.term)?,
    })
}

fn out_of_range(field: &str, reason: &str) -> AmortizationError {
    AmortizationError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Principal and payment follow the loan field rules. The term only needs to
/// be positive since a solved term may be fractional.
fn validate_metrics_input(input: &MetricsInput) -> AmortizationResult<()> {
    validation::validate(QuantityKind::Principal, input.principal).into_result()?;
    if input.term <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "term".into(),
            reason: "Number of installments must be > 0".into(),
        });
    }
    validation::validate(QuantityKind::Payment, input.payment).into_result()
}

/// Totals for a loan whose principal, term and payment are all known.
pub fn calculate_metrics(
    input: &MetricsInput,
) -> AmortizationResult<ComputationOutput<DerivedMetrics>> {
    let start = Instant::now();
    validate_metrics_input(input)?;

    let mut warnings = Vec::new();
    let metrics = DerivedMetrics {
        total_paid: total_paid(input.payment, input.term)?,
        total_interest: total_interest(input.principal, input.payment, input.term)?,
    };
    if metrics.total_interest.is_sign_negative() {
        warnings.push(format!(
            "Installments total {} which is less than the principal {}",
            metrics.total_paid, input.principal
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan totals: total paid = P * n, total interest = P * n - V",
        input,
        warnings,
        elapsed,
        metrics,
    ))
}
