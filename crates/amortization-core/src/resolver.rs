//! Deciding which of the four loan quantities is unknown.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{percent_to_rate, RateSolverConfig};
use crate::error::AmortizationError;
use crate::types::{Money, Percent, QuantityKind, Rate};
use crate::validation::{self, ValidationOutcome};
use crate::AmortizationResult;

/// Raw calculation request: up to four known quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount financed.
    pub principal: Option<Money>,
    /// Periodic interest rate in percent (1.5 = 1.5% per period).
    pub rate_percent: Option<Percent>,
    /// Number of installments.
    pub term: Option<Decimal>,
    /// Installment amount.
    pub payment: Option<Money>,
    /// Rate solver tuning; defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<RateSolverConfig>,
}

impl LoanInput {
    /// Raw value of a field, in input units.
    pub fn get(&self, kind: QuantityKind) -> Option<Decimal> {
        match kind {
            QuantityKind::Principal => self.principal,
            QuantityKind::Rate => self.rate_percent,
            QuantityKind::Term => self.term,
            QuantityKind::Payment => self.payment,
        }
    }

    /// Number of fields that carry a value.
    pub fn supplied(&self) -> usize {
        QuantityKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }
}

/// A validated loan with exactly one unknown quantity.
///
/// The variant names the unknown; its fields are the three known quantities.
/// Rates are decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unknown", rename_all = "snake_case")]
pub enum FinancingQuantities {
    Principal { rate: Rate, term: u32, payment: Money },
    Rate { principal: Money, term: u32, payment: Money },
    Term { principal: Money, rate: Rate, payment: Money },
    Payment { principal: Money, rate: Rate, term: u32 },
}

impl FinancingQuantities {
    /// Resolve the unknown, validate every supplied field and convert units.
    pub fn from_input(input: &LoanInput) -> AmortizationResult<Self> {
        let unknown = resolve_unknown(input)?;

        for kind in QuantityKind::ALL {
            if let Some(value) = input.get(kind) {
                validation::validate(kind, value).into_result()?;
            }
        }

        let principal = || required(input.principal, QuantityKind::Principal);
        let rate = || required(input.rate_percent, QuantityKind::Rate).map(percent_to_rate);
        let term = || required(input.term, QuantityKind::Term).and_then(installments);
        let payment = || required(input.payment, QuantityKind::Payment);

        Ok(match unknown {
            QuantityKind::Principal => FinancingQuantities::Principal {
                rate: rate()?,
                term: term()?,
                payment: payment()?,
            },
            QuantityKind::Rate => FinancingQuantities::Rate {
                principal: principal()?,
                term: term()?,
                payment: payment()?,
            },
            QuantityKind::Term => FinancingQuantities::Term {
                principal: principal()?,
                rate: rate()?,
                payment: payment()?,
            },
            QuantityKind::Payment => FinancingQuantities::Payment {
                principal: principal()?,
                rate: rate()?,
                term: term()?,
            },
        })
    }

    /// The quantity this loan is missing.
    pub fn unknown(&self) -> QuantityKind {
        match self {
            FinancingQuantities::Principal { .. } => QuantityKind::Principal,
            FinancingQuantities::Rate { .. } => QuantityKind::Rate,
            FinancingQuantities::Term { .. } => QuantityKind::Term,
            FinancingQuantities::Payment { .. } => QuantityKind::Payment,
        }
    }
}

/// Identify the single absent field of a request.
///
/// Fewer than three supplied fields is underspecified; four leaves nothing
/// to compute.
pub fn resolve_unknown(input: &LoanInput) -> AmortizationResult<QuantityKind> {
    let missing: Vec<QuantityKind> = QuantityKind::ALL
        .into_iter()
        .filter(|kind| input.get(*kind).is_none())
        .collect();

    match missing.as_slice() {
        [] => Err(AmortizationError::Overspecified),
        [unknown] => Ok(*unknown),
        _ => Err(AmortizationError::Underspecified {
            supplied: QuantityKind::ALL.len() - missing.len(),
        }),
    }
}

/// Validate every supplied field and report each outcome, without failing fast.
pub fn validate_fields(input: &LoanInput) -> Vec<ValidationOutcome> {
    QuantityKind::ALL
        .into_iter()
        .filter_map(|kind| input.get(kind).map(|value| validation::validate(kind, value)))
        .collect()
}

fn required(value: Option<Decimal>, kind: QuantityKind) -> AmortizationResult<Decimal> {
    value.ok_or_else(|| AmortizationError::InvalidInput {
        field: kind.to_string(),
        reason: "Value is required".into(),
    })
}

fn installments(term: Decimal) -> AmortizationResult<u32> {
    term.to_u32().ok_or_else(|| AmortizationError::InvalidInput {
        field: QuantityKind::Term.to_string(),
        reason: "Term must be a whole number of installments".into(),
    })
}
