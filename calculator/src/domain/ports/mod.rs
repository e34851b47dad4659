//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod loan_calculator_endpoint;

#[cfg(test)]
pub use loan_calculator_endpoint::MockLoanCalculatorEndpoint;
pub use loan_calculator_endpoint::{
    EndpointResponse, EndpointResult, FixtureLoanCalculatorEndpoint, LoanCalculatorEndpoint,
    LoanCalculatorEndpointError,
};
