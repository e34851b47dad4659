//! Terminal outcome of one submission attempt and its rendered message.

use std::fmt;

/// Currency symbol appended to rendered payments unless configured otherwise.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Message shown when the calculator could not be reached or refused the call.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Service is unavailable. Try again later.";

/// Message shown when the calculator answered with an unexpected payload.
pub const UNKNOWN_RESPONSE_MESSAGE: &str = "Unknown server response";

/// Classification of one submission attempt.
///
/// Every variant is terminal for its attempt; none triggers a retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The calculator returned a payment.
    Success {
        /// Monthly payment reported by the calculator.
        amount: f64,
    },
    /// The input broke validation rules; nothing was sent.
    ValidationFailure {
        /// Field messages in form order.
        messages: Vec<String>,
    },
    /// No response was obtained, or the calculator answered with a non-2xx
    /// status.
    ServiceUnavailable {
        /// Status returned, or `None` when no response arrived.
        status_code: Option<u16>,
    },
    /// The calculator answered 2xx with a body that breaks the payment
    /// contract.
    UnrecognizedResponse,
}

impl SubmissionOutcome {
    /// Return whether the attempt produced a payment.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Render the user-facing message, suffixing payments with `currency_symbol`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loan_calculator::domain::SubmissionOutcome;
    ///
    /// let outcome = SubmissionOutcome::Success { amount: 85.61 };
    /// assert_eq!(outcome.render("$"), "Your monthly payment will be 85.61$");
    /// ```
    #[must_use]
    pub fn render(&self, currency_symbol: &str) -> String {
        match self {
            Self::Success { amount } => {
                format!("Your monthly payment will be {amount}{currency_symbol}")
            }
            Self::ValidationFailure { messages } => messages.join("; "),
            Self::ServiceUnavailable { .. } => SERVICE_UNAVAILABLE_MESSAGE.to_owned(),
            Self::UnrecognizedResponse => UNKNOWN_RESPONSE_MESSAGE.to_owned(),
        }
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_CURRENCY_SYMBOL))
    }
}
