use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use amortization_core::metrics::{self, MetricsInput};
use amortization_core::resolver::{self, LoanInput};
use amortization_core::validation;
use amortization_core::{calculator, QuantityKind};

use crate::input;

/// Loan quantities shared by `solve` and `validate`. Leave exactly one out.
#[derive(Args)]
pub struct LoanFieldArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed (e.g. 10000 or 10000,50)
    #[arg(long, alias = "pv", allow_hyphen_values = true)]
    pub principal: Option<String>,

    /// Periodic interest rate in percent (e.g. 1.5 for 1.5% per period)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<String>,

    /// Number of installments
    #[arg(long, alias = "nper", allow_hyphen_values = true)]
    pub term: Option<String>,

    /// Installment amount
    #[arg(long, alias = "pmt", allow_hyphen_values = true)]
    pub payment: Option<String>,
}

/// Arguments for solving the missing loan quantity
#[derive(Args)]
pub struct SolveArgs {
    #[command(flatten)]
    pub fields: LoanFieldArgs,

    /// Maximum Newton-Raphson iterations when solving the rate
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Convergence tolerance on successive rate iterates
    #[arg(long)]
    pub tolerance: Option<Decimal>,
}

/// Arguments for validating loan fields
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub fields: LoanFieldArgs,
}

/// Arguments for loan totals
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed
    #[arg(long, alias = "pv", allow_hyphen_values = true)]
    pub principal: Option<String>,

    /// Number of installments (may be fractional)
    #[arg(long, alias = "nper", allow_hyphen_values = true)]
    pub term: Option<String>,

    /// Installment amount
    #[arg(long, alias = "pmt", allow_hyphen_values = true)]
    pub payment: Option<String>,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan_input = read_loan_input(&args.fields)?;

    if args.max_iterations.is_some() || args.tolerance.is_some() {
        let mut config = loan_input.solver.take().unwrap_or_default();
        if let Some(max_iterations) = args.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(tolerance) = args.tolerance {
            config.tolerance = tolerance;
        }
        loan_input.solver = Some(config);
    }

    let result = calculator::calculate(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = read_loan_input(&args.fields)?;
    let outcomes = resolver::validate_fields(&loan_input);
    Ok(serde_json::to_value(outcomes)?)
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics_input: MetricsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(metrics_input) = input::stdin::read_json()? {
        metrics_input
    } else {
        metrics_from_flags(&args)?
    };

    let result = metrics::calculate_metrics(&metrics_input)?;
    Ok(serde_json::to_value(result)?)
}

fn metrics_from_flags(args: &MetricsArgs) -> Result<MetricsInput, Box<dyn std::error::Error>> {
    Ok(MetricsInput {
        principal: parse_flag(QuantityKind::Principal, "--principal", &args.principal)?
            .ok_or("--principal is required (or provide --input)")?,
        term: parse_flag(QuantityKind::Term, "--term", &args.term)?
            .ok_or("--term is required (or provide --input)")?,
        payment: parse_flag(QuantityKind::Payment, "--payment", &args.payment)?
            .ok_or("--payment is required (or provide --input)")?,
    })
}

fn read_loan_input(args: &LoanFieldArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(loan_input) = input::stdin::read_json()? {
        return Ok(loan_input);
    }

    Ok(LoanInput {
        principal: parse_flag(QuantityKind::Principal, "--principal", &args.principal)?,
        rate_percent: parse_flag(QuantityKind::Rate, "--rate", &args.rate)?,
        term: parse_flag(QuantityKind::Term, "--term", &args.term)?,
        payment: parse_flag(QuantityKind::Payment, "--payment", &args.payment)?,
        solver: None,
    })
}

/// Blank flags count as absent, so `--rate ""` asks for the rate to be solved.
fn parse_flag(
    kind: QuantityKind,
    flag: &str,
    text: &Option<String>,
) -> Result<Option<Decimal>, Box<dyn std::error::Error>> {
    match text {
        None => Ok(None),
        Some(text) => validation::parse_field(text)
            .map_err(|_| format!("{flag}: {kind} must be a valid number, got '{text}'").into()),
    }
}
