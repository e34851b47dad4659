//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http_endpoint**: reqwest-backed client for the remote loan calculator.
//!
//! Adapters translate between domain types and the wire. They contain no
//! classification logic.

pub mod http_endpoint;

pub use http_endpoint::HttpLoanCalculatorEndpoint;
