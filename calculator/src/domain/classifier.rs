//! Response classifier: maps one endpoint result to a submission outcome.
//!
//! Precedence is fixed. Transport failures and non-2xx statuses are
//! unavailability; a 2xx body that breaks the payment contract is an
//! unrecognized response; only a conforming 2xx body is a success.

use serde_json::Value;

use super::outcome::SubmissionOutcome;
use super::ports::{EndpointResult, LoanCalculatorEndpointError};

/// Wire name of the payment field returned by the calculator.
pub const DEFAULT_PAYMENT_FIELD: &str = "payment";

/// Shape a successful calculator body must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentContract {
    field: String,
}

impl PaymentContract {
    /// Expect the payment under `field`.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Name of the numeric payment field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }
}

impl Default for PaymentContract {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_FIELD)
    }
}

/// Result of decoding a 2xx body against a [`PaymentContract`].
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentParse {
    /// The body carried a finite numeric payment.
    Parsed(f64),
    /// The body broke the contract; the reason is for diagnostics only.
    Failed(String),
}

/// Decode a response body into a payment.
///
/// The payment may be a JSON number or a string holding one, since the
/// calculator serialises decimals as strings.
#[must_use]
pub fn parse_payment(body: &[u8], contract: &PaymentContract) -> PaymentParse {
    let document: Value = match serde_json::from_slice(body) {
        Ok(document) => document,
        Err(error) => return PaymentParse::Failed(format!("body is not JSON: {error}")),
    };
    let Some(object) = document.as_object() else {
        return PaymentParse::Failed("body is not a JSON object".to_owned());
    };
    let field = contract.field();
    let Some(value) = object.get(field) else {
        return PaymentParse::Failed(format!("body has no `{field}` field"));
    };
    numeric(value).map_or_else(
        || PaymentParse::Failed(format!("`{field}` is not a finite number: {value}")),
        PaymentParse::Parsed,
    )
}

fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|amount| amount.is_finite())
}

/// Classify one endpoint result.
///
/// # Examples
///
/// ```
/// use loan_calculator::domain::ports::EndpointResponse;
/// use loan_calculator::domain::{PaymentContract, SubmissionOutcome, classify};
///
/// let contract = PaymentContract::default();
/// let ok = Ok(EndpointResponse::new(200, r#"{"payment": 100}"#));
/// assert_eq!(classify(&ok, &contract), SubmissionOutcome::Success { amount: 100.0 });
///
/// let renamed = Ok(EndpointResponse::new(200, r#"{"amount": 100}"#));
/// assert_eq!(classify(&renamed, &contract), SubmissionOutcome::UnrecognizedResponse);
/// ```
#[must_use]
pub fn classify(result: &EndpointResult, contract: &PaymentContract) -> SubmissionOutcome {
    match result {
        Err(error) => classify_transport_failure(error),
        Ok(response) if !response.is_success() => SubmissionOutcome::ServiceUnavailable {
            status_code: Some(response.status),
        },
        Ok(response) => match parse_payment(&response.body, contract) {
            PaymentParse::Parsed(amount) => SubmissionOutcome::Success { amount },
            PaymentParse::Failed(_) => SubmissionOutcome::UnrecognizedResponse,
        },
    }
}

fn classify_transport_failure(error: &LoanCalculatorEndpointError) -> SubmissionOutcome {
    let status_code = match error {
        LoanCalculatorEndpointError::Transport { .. } => None,
        LoanCalculatorEndpointError::Body { status, .. } => {
            Some(*status).filter(|code| !(200..=299).contains(code))
        }
    };
    SubmissionOutcome::ServiceUnavailable { status_code }
}
