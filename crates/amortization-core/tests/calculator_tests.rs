use amortization_core::amortization::RateSolverConfig;
use amortization_core::metrics::{calculate_metrics, MetricsInput};
use amortization_core::resolver::validate_fields;
use amortization_core::validation::RejectionReason;
use amortization_core::{calculate, AmortizationError, FinancingQuantities, LoanInput, QuantityKind};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(
    principal: Option<Decimal>,
    rate_percent: Option<Decimal>,
    term: Option<Decimal>,
    payment: Option<Decimal>,
) -> LoanInput {
    LoanInput {
        principal,
        rate_percent,
        term,
        payment,
        solver: None,
    }
}

// ===========================================================================
// Field resolution
// ===========================================================================

#[test]
fn test_all_fields_present_is_overspecified() {
    let input = loan(
        Some(dec!(10000)),
        Some(dec!(1)),
        Some(dec!(12)),
        Some(dec!(888.49)),
    );
    assert!(matches!(
        calculate(&input),
        Err(AmortizationError::Overspecified)
    ));
}

#[test]
fn test_two_fields_present_is_underspecified() {
    let input = loan(Some(dec!(10000)), None, Some(dec!(12)), None);
    match calculate(&input).unwrap_err() {
        AmortizationError::Underspecified { supplied } => assert_eq!(supplied, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validation_runs_before_solver() {
    // Payment below interest would fail the solver, but its precision is rejected first
    let input = loan(Some(dec!(10000)), Some(dec!(1)), None, Some(dec!(50.001)));
    match calculate(&input).unwrap_err() {
        AmortizationError::InvalidInput { field, reason } => {
            assert_eq!(field, "payment");
            assert!(reason.contains("2 decimal places"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_from_input_builds_tagged_quantities() {
    let input = loan(Some(dec!(10000)), None, Some(dec!(12)), Some(dec!(888.49)));
    assert_eq!(
        FinancingQuantities::from_input(&input).unwrap(),
        FinancingQuantities::Rate {
            principal: dec!(10000),
            term: 12,
            payment: dec!(888.49),
        }
    );
}

// ===========================================================================
// Solving each quantity
// ===========================================================================

#[test]
fn test_solve_payment() {
    let input = loan(Some(dec!(50000)), Some(dec!(1.5)), Some(dec!(24)), None);
    let output = calculate(&input).unwrap();
    let r = &output.result;
    assert_eq!(r.solved_for, QuantityKind::Payment);
    assert!((r.solved_value - dec!(2496.21)).abs() < dec!(0.01));
    assert_eq!(r.iterations, None);
}

#[test]
fn test_solve_rate_reports_percent_and_iterations() {
    let input = loan(Some(dec!(10000)), None, Some(dec!(12)), Some(dec!(888.49)));
    let output = calculate(&input).unwrap();
    let r = &output.result;
    assert_eq!(r.solved_for, QuantityKind::Rate);
    assert!((r.rate - dec!(0.01)).abs() < dec!(0.0001));
    assert!((r.rate_percent - dec!(1)).abs() < dec!(0.01));
    assert!(r.iterations.unwrap_or(0) > 0);
    assert_eq!(r.total_paid, dec!(10661.88));
    assert_eq!(r.total_interest, dec!(661.88));
}

#[test]
fn test_solve_rate_interest_free_warns() {
    let input = loan(Some(dec!(12000)), None, Some(dec!(12)), Some(dec!(1000)));
    let output = calculate(&input).unwrap();
    assert_eq!(output.result.rate, Decimal::ZERO);
    assert_eq!(output.result.iterations, Some(0));
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_solve_rate_negative_warns() {
    let input = loan(Some(dec!(12000)), None, Some(dec!(12)), Some(dec!(900)));
    let output = calculate(&input).unwrap();
    assert!(output.result.rate.is_sign_negative());
    assert!(output.warnings.iter().any(|w| w.contains("negative")));
}

#[test]
fn test_solve_term() {
    let input = loan(Some(dec!(12000)), Some(dec!(0)), None, Some(dec!(1000)));
    let output = calculate(&input).unwrap();
    assert_eq!(output.result.term, dec!(12));
    assert!(output.warnings.is_empty());
}

#[test]
fn test_solve_term_insufficient_payment() {
    let input = loan(Some(dec!(10000)), Some(dec!(1)), None, Some(dec!(50)));
    match calculate(&input).unwrap_err() {
        AmortizationError::InsufficientPayment {
            payment,
            interest_only,
        } => {
            assert_eq!(payment, dec!(50));
            assert_eq!(interest_only, dec!(100));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_solve_principal() {
    let input = loan(None, Some(dec!(1)), Some(dec!(12)), Some(dec!(888.49)));
    let output = calculate(&input).unwrap();
    assert!((output.result.principal - dec!(10000)).abs() < dec!(0.05));
    assert_eq!(output.result.total_paid, dec!(10661.88));
}

#[test]
fn test_solver_config_from_input() {
    let mut input = loan(Some(dec!(10000)), None, Some(dec!(60)), Some(dec!(202.76)));
    input.solver = Some(RateSolverConfig {
        max_iterations: 1,
        tolerance: dec!(0.0000000001),
        ..RateSolverConfig::default()
    });
    assert!(matches!(
        calculate(&input),
        Err(AmortizationError::ConvergenceFailure { .. })
    ));
}

#[test]
fn test_input_from_json_with_partial_solver_block() {
    let json = r#"{
        "principal": "10000",
        "rate_percent": 1,
        "term": 12,
        "solver": { "max_iterations": 50 }
    }"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    let solver = input.solver.clone().unwrap();
    assert_eq!(solver.max_iterations, 50);
    assert_eq!(solver.initial_guess, dec!(0.01));
    assert_eq!(input.payment, None);

    let output = calculate(&input).unwrap();
    assert_eq!(output.result.solved_for, QuantityKind::Payment);
}

#[test]
fn test_solver_block_from_json_is_checked() {
    let json = r#"{
        "principal": 10000,
        "term": 12,
        "payment": 888.49,
        "solver": { "tolerance": "-1" }
    }"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    match calculate(&input).unwrap_err() {
        AmortizationError::InvalidInput { field, .. } => assert_eq!(field, "solver.tolerance"),
        other => panic!("unexpected error: {other:?}"),
    }

    let json = r#"{
        "principal": 10000,
        "rate_percent": 1,
        "term": 12,
        "solver": { "max_iterations": 0 }
    }"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    match calculate(&input).unwrap_err() {
        AmortizationError::InvalidInput { field, .. } => {
            assert_eq!(field, "solver.max_iterations")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_metrics_rejects_oversized_payment() {
    let input = MetricsInput {
        principal: dec!(1),
        term: dec!(600),
        payment: Decimal::MAX,
    };
    assert!(matches!(
        calculate_metrics(&input),
        Err(AmortizationError::InvalidInput { .. })
    ));
}

// ===========================================================================
// Validation report and totals
// ===========================================================================

#[test]
fn test_validate_fields_collects_reasons() {
    let input = loan(Some(dec!(0)), Some(dec!(-1)), Some(dec!(601)), None);
    let reasons: Vec<Option<RejectionReason>> =
        validate_fields(&input).into_iter().map(|o| o.reason).collect();
    assert_eq!(
        reasons,
        vec![
            Some(RejectionReason::NotPositive),
            Some(RejectionReason::Negative),
            Some(RejectionReason::AboveMaximum),
        ]
    );
}

#[test]
fn test_metrics_from_known_loan() {
    let input = MetricsInput {
        principal: dec!(10000),
        term: dec!(12),
        payment: dec!(888.49),
    };
    let output = calculate_metrics(&input).unwrap();
    assert_eq!(output.result.total_paid, dec!(10661.88));
    assert_eq!(output.result.total_interest, dec!(661.88));
    assert!(output.warnings.is_empty());
}
