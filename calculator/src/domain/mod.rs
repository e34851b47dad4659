//! Domain core of the loan calculator client.
//!
//! Purpose: validate raw form input, drive one guarded submission at a time,
//! and classify the calculator's answer into a terminal outcome. Nothing here
//! performs I/O directly; the calculator is reached through the
//! [`ports::LoanCalculatorEndpoint`] port.
//!
//! Public surface:
//! - `validate` with `RawLoanInput`, `LoanRequest` and `FieldErrors`.
//! - `classify` with `PaymentContract` and `SubmissionOutcome`.
//! - `SubmissionController` with its snapshot and disposition types.

pub mod classifier;
pub mod loan_request;
pub mod outcome;
pub mod ports;
pub mod submission;

pub use self::classifier::{
    DEFAULT_PAYMENT_FIELD, PaymentContract, PaymentParse, classify, parse_payment,
};
pub use self::loan_request::{
    FieldErrors, FieldViolation, LoanField, LoanRequest, RawLoanInput, validate,
};
pub use self::outcome::{
    DEFAULT_CURRENCY_SYMBOL, SERVICE_UNAVAILABLE_MESSAGE, SubmissionOutcome,
    UNKNOWN_RESPONSE_MESSAGE,
};
pub use self::submission::{
    SubmissionController, SubmissionError, SubmissionPhase, SubmissionSnapshot,
    SubmitDisposition,
};
