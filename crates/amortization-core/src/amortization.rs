//! Fixed-installment (Price) amortization formulas.
//!
//! Relates principal `V`, periodic rate `i`, term `n` and installment `P`:
//!
//! `P = V * i * (1+i)^n / ((1+i)^n - 1)`
//!
//! Principal, payment and term have closed-form inverses. The rate does not and
//! is found with Newton-Raphson. Every formula is evaluated through the
//! discount factor `v^n = (1+i)^-n`, which stays inside the decimal range
//! where `(1+i)^n` would overflow.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AmortizationError;
use crate::resolver::FinancingQuantities;
use crate::types::{Money, Percent, Periods, QuantityKind, Rate};
use crate::AmortizationResult;

const DEFAULT_INITIAL_GUESS: Rate = dec!(0.01);
const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);
const DEFAULT_MAX_ITERATIONS: u32 = 100;
const DEFAULT_ZERO_RATE_TOLERANCE: Money = dec!(0.01);

/// Upper bound on `max_iterations` accepted from callers.
pub const MAX_SOLVER_ITERATIONS: u32 = 1_000;

/// Tuning for the Newton-Raphson rate solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSolverConfig {
    /// Starting rate (decimal per period).
    pub initial_guess: Rate,
    /// Stop once successive iterates differ by less than this.
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// If `|P*n - V|` is below this amount the loan is taken as interest-free.
    pub zero_rate_tolerance: Money,
}

impl Default for RateSolverConfig {
    fn default() -> Self {
        RateSolverConfig {
            initial_guess: DEFAULT_INITIAL_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            zero_rate_tolerance: DEFAULT_ZERO_RATE_TOLERANCE,
        }
    }
}

impl RateSolverConfig {
    /// Reject settings that would make the solver fail for the wrong reason
    /// or run without a useful iteration bound.
    pub fn validate(&self) -> AmortizationResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(invalid_config("tolerance", "Tolerance must be > 0".into()));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_SOLVER_ITERATIONS {
            return Err(invalid_config(
                "max_iterations",
                format!("Iteration bound must be between 1 and {MAX_SOLVER_ITERATIONS}"),
            ));
        }
        if self.initial_guess <= dec!(-1) {
            return Err(invalid_config(
                "initial_guess",
                "Initial guess must be greater than -100%".into(),
            ));
        }
        if self.zero_rate_tolerance.is_sign_negative() {
            return Err(invalid_config(
                "zero_rate_tolerance",
                "Zero-rate tolerance cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

fn invalid_config(setting: &str, reason: String) -> AmortizationError {
    AmortizationError::InvalidInput {
        field: format!("solver.{setting}"),
        reason,
    }
}

/// Rate found by the iterative solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    pub rate: Rate,
    /// Newton steps taken; 0 when the zero-rate short circuit applied.
    pub iterations: u32,
}

/// The value computed for the one unknown quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub solved_for: QuantityKind,
    /// Rates are decimal fractions; terms may be fractional.
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

// ---------------------------------------------------------------------------
// Rate units
// ---------------------------------------------------------------------------

/// Convert a percentage (1.5) to a decimal rate (0.015).
pub fn percent_to_rate(percent: Percent) -> Rate {
    percent / dec!(100)
}

/// Convert a decimal rate (0.015) to a percentage (1.5).
pub fn rate_to_percent(rate: Rate) -> Percent {
    rate * dec!(100)
}

// ---------------------------------------------------------------------------
// Closed-form solvers
// ---------------------------------------------------------------------------

/// Installment amount (PMT) for a loan of `principal` over `term` periods.
pub fn solve_payment(principal: Money, rate: Rate, term: u32) -> AmortizationResult<Money> {
    check_term(term)?;

    if rate.is_zero() {
        return Ok(principal / Decimal::from(term));
    }

    let annuity = Decimal::ONE - discount_factor(rate, term)?;
    if annuity.is_zero() {
        return Err(AmortizationError::DivisionByZero {
            context: "payment annuity factor".into(),
        });
    }

    Ok(principal * rate / annuity)
}

/// Amount that can be financed with a given installment.
pub fn solve_principal(payment: Money, rate: Rate, term: u32) -> AmortizationResult<Money> {
    check_term(term)?;

    if rate.is_zero() {
        return Ok(payment * Decimal::from(term));
    }

    let annuity = Decimal::ONE - discount_factor(rate, term)?;
    Ok(payment * annuity / rate)
}

/// Number of installments needed to repay `principal`.
///
/// The result is left fractional; a non-integer term means the last
/// installment is smaller than the others.
pub fn solve_term(principal: Money, rate: Rate, payment: Money) -> AmortizationResult<Periods> {
    if rate.is_zero() {
        if payment.is_zero() {
            return Err(AmortizationError::DivisionByZero {
                context: "term with zero rate and zero payment".into(),
            });
        }
        return Ok(principal / payment);
    }

    check_rate(rate)?;

    let interest_only = principal * rate;
    if payment <= interest_only {
        return Err(AmortizationError::InsufficientPayment {
            payment,
            interest_only,
        });
    }

    let numerator = (payment / (payment - interest_only))
        .checked_ln()
        .ok_or_else(|| AmortizationError::InvalidInput {
            field: "payment".into(),
            reason: "Payment ratio has no logarithm".into(),
        })?;
    let denominator = (Decimal::ONE + rate)
        .checked_ln()
        .ok_or_else(|| AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        })?;

    if denominator.is_zero() {
        return Err(AmortizationError::DivisionByZero {
            context: "term logarithm of (1 + rate)".into(),
        });
    }

    Ok(numerator / denominator)
}

// ---------------------------------------------------------------------------
// Iterative rate solver
// ---------------------------------------------------------------------------

/// Periodic rate implied by a loan, using Newton-Raphson on
/// `f(i) = P - V * i / (1 - (1+i)^-n)`.
pub fn solve_rate(
    principal: Money,
    term: u32,
    payment: Money,
    config: &RateSolverConfig,
) -> AmortizationResult<RateSolution> {
    check_term(term)?;
    config.validate()?;

    let n = Decimal::from(term);
    if (payment * n - principal).abs() < config.zero_rate_tolerance {
        debug!(%principal, %payment, term, "installments repay principal exactly, rate is zero");
        return Ok(RateSolution {
            rate: Decimal::ZERO,
            iterations: 0,
        });
    }

    let mut rate = config.initial_guess;
    let mut last_delta = Decimal::ZERO;

    for iteration in 0..config.max_iterations {
        let (f, df) = match newton_terms(principal, payment, rate, term) {
            Some(terms) => terms,
            None => {
                return Err(convergence_failure(iteration, last_delta));
            }
        };

        if df.is_zero() {
            return Err(convergence_failure(iteration, f));
        }

        let next = rate - f / df;
        last_delta = next - rate;
        debug!(iteration, %rate, %next, residual = %f, "newton step");

        if next <= dec!(-1) {
            return Err(convergence_failure(iteration + 1, last_delta));
        }

        if last_delta.abs() < config.tolerance {
            return Ok(RateSolution {
                rate: next,
                iterations: iteration + 1,
            });
        }

        rate = next;
    }

    warn!(
        %principal,
        %payment,
        term,
        max_iterations = config.max_iterations,
        "rate solver exhausted its iteration bound"
    );
    Err(convergence_failure(config.max_iterations, last_delta))
}

/// `f(i)` and `f'(i)`, or `None` when `i` is outside the usable domain.
fn newton_terms(
    principal: Money,
    payment: Money,
    rate: Rate,
    term: u32,
) -> Option<(Decimal, Decimal)> {
    if rate <= dec!(-1) {
        return None;
    }

    let v = Decimal::ONE.checked_div(Decimal::ONE + rate)?;
    let v_n = v.checked_powu(u64::from(term))?;
    let v_n1 = v_n.checked_mul(v)?;
    let annuity = Decimal::ONE - v_n;
    if annuity.is_zero() {
        return None;
    }

    // A(i) = i / (1 - v^n),  A'(i) = (1 - v^n - i*n*v^(n+1)) / (1 - v^n)^2
    let a = rate.checked_div(annuity)?;
    let n = Decimal::from(term);
    let da = (annuity - rate.checked_mul(n)?.checked_mul(v_n1)?)
        .checked_div(annuity.checked_mul(annuity)?)?;

    let f = payment - principal.checked_mul(a)?;
    let df = -principal.checked_mul(da)?;
    Some((f, df))
}

fn convergence_failure(iterations: u32, last_delta: Decimal) -> AmortizationError {
    AmortizationError::ConvergenceFailure {
        function: "rate (Newton-Raphson)".into(),
        iterations,
        last_delta,
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Compute the unknown quantity of a validated loan.
pub fn solve(
    quantities: &FinancingQuantities,
    config: &RateSolverConfig,
) -> AmortizationResult<SolveResult> {
    let solved_for = quantities.unknown();
    debug!(%solved_for, "solving loan");

    let (value, iterations) = match *quantities {
        FinancingQuantities::Principal {
            rate,
            term,
            payment,
        } => (solve_principal(payment, rate, term)?, None),
        FinancingQuantities::Rate {
            principal,
            term,
            payment,
        } => {
            let solution = solve_rate(principal, term, payment, config)?;
            (solution.rate, Some(solution.iterations))
        }
        FinancingQuantities::Term {
            principal,
            rate,
            payment,
        } => (solve_term(principal, rate, payment)?, None),
        FinancingQuantities::Payment {
            principal,
            rate,
            term,
        } => (solve_payment(principal, rate, term)?, None),
    };

    Ok(SolveResult {
        solved_for,
        value,
        iterations,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_term(term: u32) -> AmortizationResult<()> {
    if term == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "term".into(),
            reason: "Number of installments must be > 0".into(),
        });
    }
    Ok(())
}

fn check_rate(rate: Rate) -> AmortizationResult<()> {
    if rate <= dec!(-1) {
        return Err(AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

/// `(1 + rate)^-term`
fn discount_factor(rate: Rate, term: u32) -> AmortizationResult<Decimal> {
    check_rate(rate)?;

    let v = Decimal::ONE / (Decimal::ONE + rate);
    v.checked_powu(u64::from(term))
        .ok_or_else(|| AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: format!("Discount factor overflows over {term} periods"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_basic() {
        let result = solve_payment(dec!(10000), dec!(0.01), 12).unwrap();
        // 10000 * 0.01 / (1 - 1.01^-12) ≈ 888.4879
        assert!((result - dec!(888.49)).abs() < dec!(0.01));
    }

    #[test]
    fn test_payment_zero_rate_is_linear() {
        let result = solve_payment(dec!(12000), dec!(0), 12).unwrap();
        assert_eq!(result, dec!(1000));
    }

    #[test]
    fn test_payment_rejects_zero_term() {
        assert!(matches!(
            solve_payment(dec!(1000), dec!(0.01), 0),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_principal_basic() {
        let result = solve_principal(dec!(888.49), dec!(0.01), 12).unwrap();
        assert!((result - dec!(10000)).abs() < dec!(0.5));
    }

    #[test]
    fn test_term_basic() {
        let result = solve_term(dec!(10000), dec!(0.01), dec!(888.49)).unwrap();
        assert!((result - dec!(12)).abs() < dec!(0.01));
    }

    #[test]
    fn test_term_payment_equal_to_interest_is_insufficient() {
        let err = solve_term(dec!(10000), dec!(0.01), dec!(100)).unwrap_err();
        match err {
            AmortizationError::InsufficientPayment {
                payment,
                interest_only,
            } => {
                assert_eq!(payment, dec!(100));
                assert_eq!(interest_only, dec!(100));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rate_basic() {
        let config = RateSolverConfig::default();
        let result = solve_rate(dec!(10000), 12, dec!(888.49), &config).unwrap();
        assert!((result.rate - dec!(0.01)).abs() < dec!(0.0001));
        assert!(result.iterations > 0);
    }

    #[test]
    fn test_rate_zero_short_circuit() {
        let config = RateSolverConfig::default();
        let result = solve_rate(dec!(12000), 12, dec!(1000), &config).unwrap();
        assert_eq!(result.rate, Decimal::ZERO);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_rate_iteration_bound() {
        let config = RateSolverConfig {
            max_iterations: 1,
            ..RateSolverConfig::default()
        };
        // True rate is ~3%, one step from 1% cannot meet the tolerance
        let payment = solve_payment(dec!(10000), dec!(0.03), 24).unwrap().round_dp(2);
        let err = solve_rate(dec!(10000), 24, payment, &config).unwrap_err();
        assert!(matches!(
            err,
            AmortizationError::ConvergenceFailure { iterations: 1, .. }
        ));
    }

    #[test]
    fn test_percent_conversions() {
        assert_eq!(percent_to_rate(dec!(1.5)), dec!(0.015));
        assert_eq!(percent_to_rate(dec!(10)), dec!(0.1));
        assert_eq!(percent_to_rate(dec!(0.5)), dec!(0.005));
        assert_eq!(rate_to_percent(dec!(0.015)), dec!(1.5));
        assert_eq!(rate_to_percent(dec!(0.1)), dec!(10));
        assert_eq!(rate_to_percent(dec!(0.005)), dec!(0.5));
    }

    #[test]
    fn test_long_term_high_rate_stays_in_range() {
        // (1.5)^600 is far outside the decimal range; v^n is not
        let result = solve_payment(dec!(1000), dec!(0.5), 600).unwrap();
        assert!((result - dec!(500)).abs() < dec!(0.01));
    }

    #[test]
    fn test_solver_config_rejects_bad_settings() {
        let cases = [
            (
                RateSolverConfig {
                    tolerance: dec!(-1),
                    ..RateSolverConfig::default()
                },
                "solver.tolerance",
            ),
            (
                RateSolverConfig {
                    tolerance: Decimal::ZERO,
                    ..RateSolverConfig::default()
                },
                "solver.tolerance",
            ),
            (
                RateSolverConfig {
                    max_iterations: 0,
                    ..RateSolverConfig::default()
                },
                "solver.max_iterations",
            ),
            (
                RateSolverConfig {
                    max_iterations: MAX_SOLVER_ITERATIONS + 1,
                    ..RateSolverConfig::default()
                },
                "solver.max_iterations",
            ),
            (
                RateSolverConfig {
                    initial_guess: dec!(-1),
                    ..RateSolverConfig::default()
                },
                "solver.initial_guess",
            ),
            (
                RateSolverConfig {
                    zero_rate_tolerance: dec!(-0.01),
                    ..RateSolverConfig::default()
                },
                "solver.zero_rate_tolerance",
            ),
        ];
        for (config, expected) in cases {
            match solve_rate(dec!(10000), 12, dec!(888.49), &config).unwrap_err() {
                AmortizationError::InvalidInput { field, .. } => assert_eq!(field, expected),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_solver_config_default_and_bounds_are_valid() {
        assert!(RateSolverConfig::default().validate().is_ok());
        let config = RateSolverConfig {
            max_iterations: MAX_SOLVER_ITERATIONS,
            zero_rate_tolerance: Decimal::ZERO,
            ..RateSolverConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
