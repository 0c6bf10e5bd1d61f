//! End-to-end loan calculation: resolve, validate, solve, summarise.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{self, rate_to_percent, SolveResult};
use crate::metrics::{derive_metrics, CompleteQuantities};
use crate::resolver::{FinancingQuantities, LoanInput};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Periods, QuantityKind, Rate};
use crate::validation::{MAX_AMOUNT, MAX_RATE_PERCENT, MAX_TERM};
use crate::AmortizationResult;

/// Solved loan with summary totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCalculationOutput {
    pub solved_for: QuantityKind,
    /// The computed value; a decimal fraction when the rate was solved.
    pub solved_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    pub principal: Money,
    pub rate: Rate,
    pub rate_percent: Percent,
    pub term: Periods,
    pub payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Compute the missing quantity of a loan from the other three.
pub fn calculate(
    input: &LoanInput,
) -> AmortizationResult<ComputationOutput<LoanCalculationOutput>> {
    let start = Instant::now();

    let quantities = FinancingQuantities::from_input(input)?;
    let config = input.solver.clone().unwrap_or_default();
    config.validate()?;
    let solution = amortization::solve(&quantities, &config)?;

    let complete = CompleteQuantities::from_solution(&quantities, &solution);
    let metrics = derive_metrics(&complete)?;
    let warnings = collect_warnings(&solution, &complete);
    let methodology = methodology(&quantities);

    let output = LoanCalculationOutput {
        solved_for: solution.solved_for,
        solved_value: solution.value,
        iterations: solution.iterations,
        principal: complete.principal,
        rate: complete.rate,
        rate_percent: rate_to_percent(complete.rate),
        term: complete.term,
        payment: complete.payment,
        total_paid: metrics.total_paid,
        total_interest: metrics.total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

fn methodology(quantities: &FinancingQuantities) -> &'static str {
    let zero_rate = match *quantities {
        FinancingQuantities::Principal { rate, .. }
        | FinancingQuantities::Term { rate, .. }
        | FinancingQuantities::Payment { rate, .. } => rate.is_zero(),
        FinancingQuantities::Rate { .. } => false,
    };

    match (quantities.unknown(), zero_rate) {
        (QuantityKind::Payment, true) => "Interest-free installment: P = V / n",
        (QuantityKind::Payment, false) => {
            "Price amortization installment: P = V * i * (1+i)^n / ((1+i)^n - 1)"
        }
        (QuantityKind::Principal, true) => "Interest-free principal: V = P * n",
        (QuantityKind::Principal, false) => {
            "Price amortization principal: V = P * ((1+i)^n - 1) / (i * (1+i)^n)"
        }
        (QuantityKind::Term, true) => "Interest-free term: n = V / P",
        (QuantityKind::Term, false) => {
            "Price amortization term: n = ln(P / (P - V * i)) / ln(1 + i)"
        }
        (QuantityKind::Rate, _) => "Price amortization rate via Newton-Raphson",
    }
}

fn collect_warnings(solution: &SolveResult, complete: &CompleteQuantities) -> Vec<String> {
    let mut warnings = Vec::new();

    match solution.solved_for {
        QuantityKind::Term => {
            if !complete.term.fract().is_zero() {
                warnings.push(format!(
                    "Solved term of {} installments is fractional; the final installment is smaller than the others",
                    complete.term.round_dp(4)
                ));
            }
            if complete.term > MAX_TERM {
                warnings.push(format!(
                    "Solved term exceeds the {MAX_TERM} installment input limit"
                ));
            }
        }
        QuantityKind::Rate => {
            if solution.iterations == Some(0) {
                warnings.push(
                    "Installments repay exactly the principal; rate taken as zero".to_string(),
                );
            } else if complete.rate.is_sign_negative() {
                warnings.push(
                    "Installments total less than the principal; implied rate is negative"
                        .to_string(),
                );
            }
            if rate_to_percent(complete.rate) > MAX_RATE_PERCENT {
                warnings.push(format!(
                    "Solved rate exceeds the {MAX_RATE_PERCENT}% input limit"
                ));
            }
        }
        QuantityKind::Principal | QuantityKind::Payment => {
            if solution.value > MAX_AMOUNT {
                warnings.push(format!(
                    "Solved {} exceeds the {MAX_AMOUNT} input limit",
                    solution.solved_for
                ));
            }
        }
    }

    warnings
}
