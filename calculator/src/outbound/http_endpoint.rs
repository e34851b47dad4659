//! Reqwest-backed loan calculator adapter.
//!
//! This adapter owns transport details only: JSON request serialisation and
//! mapping of connection and body failures. Statuses and bodies are returned
//! untouched for the domain classifier.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::domain::LoanRequest;
use crate::domain::ports::{
    EndpointResponse, EndpointResult, LoanCalculatorEndpoint, LoanCalculatorEndpointError,
};

const DEFAULT_USER_AGENT: &str = concat!("loan-calculator/", env!("CARGO_PKG_VERSION"));

/// Calculator adapter that performs one HTTP POST per submission.
#[derive(Debug, Clone)]
pub struct HttpLoanCalculatorEndpoint {
    client: Client,
    endpoint: String,
}

impl HttpLoanCalculatorEndpoint {
    /// Build an adapter posting to `endpoint`.
    ///
    /// No request timeout is configured; a hung calculator keeps the
    /// submission in flight.
    ///
    /// ```rust,ignore
    /// let endpoint = HttpLoanCalculatorEndpoint::new("http://localhost:8080/loan")?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(DEFAULT_USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Target URL of the calculator.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl LoanCalculatorEndpoint for HttpLoanCalculatorEndpoint {
    async fn submit(&self, request: &LoanRequest) -> EndpointResult {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|error| LoanCalculatorEndpointError::transport(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| LoanCalculatorEndpointError::body(status, error.to_string()))?;

        let reply = EndpointResponse::new(status, body.to_vec());
        if !reply.is_success() {
            debug!(
                status,
                body = %body_preview(&reply.body),
                "loan calculator answered with an error status"
            );
        }
        Ok(reply)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
