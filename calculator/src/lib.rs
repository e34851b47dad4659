//! Loan calculator client core.
//!
//! Validates loan form input, submits it to a remote calculator through a
//! port, and classifies the answer into one of four terminal outcomes.
//!
//! ```
//! use std::sync::Arc;
//!
//! use loan_calculator::domain::ports::FixtureLoanCalculatorEndpoint;
//! use loan_calculator::domain::{
//!     PaymentContract, RawLoanInput, SubmissionController, SubmissionOutcome,
//!     SubmitDisposition,
//! };
//!
//! let endpoint = FixtureLoanCalculatorEndpoint::new(200, r#"{"payment": 85.61}"#);
//! let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime");
//!
//! let disposition = runtime
//!     .block_on(controller.submit(&RawLoanInput::new("1000", "5", "12")))
//!     .expect("submit");
//! assert_eq!(
//!     disposition,
//!     SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 85.61 })
//! );
//! ```

pub mod config;
pub mod domain;
pub mod outbound;
