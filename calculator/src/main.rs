//! Submit one loan calculation and print the outcome.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use loan_calculator::config::LoanCalculatorSettings;
use loan_calculator::domain::{
    LoanField, RawLoanInput, SubmissionController, SubmissionOutcome, SubmissionSnapshot,
};
use loan_calculator::outbound::HttpLoanCalculatorEndpoint;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `loan-calculator` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "loan-calculator",
    about = "Validate a loan and ask the remote calculator for its monthly payment",
    version,
    allow_negative_numbers = true
)]
struct CliArgs {
    /// Principal to borrow.
    #[arg(value_name = "LOAN_AMOUNT", allow_hyphen_values = true)]
    loan_amount: String,
    /// Annual interest rate as a percentage.
    #[arg(value_name = "INTEREST_RATE", allow_hyphen_values = true)]
    interest_rate: String,
    /// Term in whole months.
    #[arg(value_name = "LOAN_TERM", allow_hyphen_values = true)]
    loan_term: String,
    /// Calculator URL. Falls back to `LOAN_CALCULATOR_ENDPOINT` when omitted.
    #[arg(long = "endpoint", value_name = "url")]
    endpoint: Option<String>,
}

fn main() -> io::Result<ExitCode> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> io::Result<ExitCode> {
    let settings = LoanCalculatorSettings::load_from_environment()
        .map_err(|error| io::Error::other(error.to_string()))?;
    let endpoint = resolve_endpoint(args.endpoint, &settings)?;
    let adapter = HttpLoanCalculatorEndpoint::new(endpoint)
        .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
    let controller = SubmissionController::new(Arc::new(adapter), settings.payment_contract());

    let raw = RawLoanInput::new(args.loan_amount, args.interest_rate, args.loan_term);
    controller
        .submit(&raw)
        .await
        .map_err(|error| io::Error::other(format!("submit loan: {error}")))?;
    let snapshot = controller
        .snapshot()
        .map_err(|error| io::Error::other(format!("read outcome: {error}")))?;

    write_report(&mut io::stdout().lock(), &snapshot, settings.currency_symbol())?;
    let succeeded = snapshot
        .outcome
        .as_ref()
        .is_some_and(SubmissionOutcome::is_success);
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn resolve_endpoint(
    explicit: Option<String>,
    settings: &LoanCalculatorSettings,
) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--endpoint must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    settings
        .endpoint()
        .map(str::to_owned)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))
}

fn write_report(
    out: &mut impl Write,
    snapshot: &SubmissionSnapshot,
    currency_symbol: &str,
) -> io::Result<()> {
    if let Some(errors) = &snapshot.field_errors {
        for field in LoanField::ALL {
            for violation in errors.for_field(field) {
                writeln!(out, "{field}: {violation}")?;
            }
        }
        return Ok(());
    }
    if let Some(outcome) = &snapshot.outcome {
        writeln!(out, "{}", outcome.render(currency_symbol))?;
    }
    Ok(())
}
