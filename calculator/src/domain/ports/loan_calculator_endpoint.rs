//! Driven port for submitting loan requests to the remote calculator.
//!
//! Adapters report what the collaborator sent back (status and raw body) or
//! that nothing usable arrived. Deciding what a response means is left to the
//! response classifier in the domain.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::LoanRequest;

/// Raw response obtained from the calculator endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    /// HTTP status code returned by the collaborator.
    pub status: u16,
    /// Undecoded response body.
    pub body: Vec<u8>,
}

impl EndpointResponse {
    /// Build a response from a status code and body bytes.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Return whether the status lies in the `2xx` range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

define_port_error! {
    /// Errors raised when no usable response could be obtained.
    pub enum LoanCalculatorEndpointError {
        /// The request could not be sent or no response arrived.
        Transport {
            /// Transport failure description.
            message: String,
        } => "loan calculator transport failed: {message}",
        /// A status line arrived but the body could not be read.
        Body {
            /// Status code received before the body failed.
            status: u16,
            /// Body read failure description.
            message: String,
        } => "loan calculator body read failed after status {status}: {message}",
    }
}

/// Result of one call to the calculator endpoint.
pub type EndpointResult = Result<EndpointResponse, LoanCalculatorEndpointError>;

/// Port for sending one loan request to the remote calculator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanCalculatorEndpoint: Send + Sync {
    /// Send the request as the entire JSON body and return the raw response.
    ///
    /// Implementations must issue exactly one outbound call and must not
    /// retry.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use loan_calculator::domain::ports::{
    ///     FixtureLoanCalculatorEndpoint, LoanCalculatorEndpoint,
    /// };
    ///
    /// let endpoint = FixtureLoanCalculatorEndpoint::new(200, r#"{"payment": 100}"#);
    /// let response = endpoint.submit(&request).await?;
    /// assert!(response.is_success());
    /// # Ok::<(), loan_calculator::domain::ports::LoanCalculatorEndpointError>(())
    /// ```
    async fn submit(&self, request: &LoanRequest) -> EndpointResult;
}

/// Fixture implementation answering every request with one canned response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLoanCalculatorEndpoint {
    response: EndpointResponse,
}

impl FixtureLoanCalculatorEndpoint {
    /// Build a fixture returning `status` and `body` for every call.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            response: EndpointResponse::new(status, body),
        }
    }
}

#[async_trait]
impl LoanCalculatorEndpoint for FixtureLoanCalculatorEndpoint {
    async fn submit(&self, _request: &LoanRequest) -> EndpointResult {
        Ok(self.response.clone())
    }
}
