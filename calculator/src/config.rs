//! Calculator client configuration loaded via OrthoConfig.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DEFAULT_CURRENCY_SYMBOL, DEFAULT_PAYMENT_FIELD, PaymentContract};

/// Errors raised while resolving calculator settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No endpoint was configured, or it was blank.
    #[error("calculator endpoint missing: set LOAN_CALCULATOR_ENDPOINT or --endpoint")]
    MissingEndpoint,
    /// Configuration sources could not be merged.
    #[error("failed to load calculator settings: {message}")]
    Load {
        /// Loader failure description.
        message: String,
    },
}

/// Settings for reaching and interpreting the remote calculator.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOAN_CALCULATOR")]
pub struct LoanCalculatorSettings {
    /// URL the loan request is posted to.
    pub endpoint: Option<String>,
    /// Response field holding the monthly payment.
    pub payment_field: Option<String>,
    /// Symbol appended to rendered payments.
    pub currency_symbol: Option<String>,
}

impl LoanCalculatorSettings {
    /// Load settings from configuration files and the environment only.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn load_from_environment() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from(env!("CARGO_PKG_NAME"))]).map_err(|error| {
            SettingsError::Load {
                message: error.to_string(),
            }
        })
    }

    /// Return the configured endpoint exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingEndpoint`] when it is unset or blank.
    pub fn endpoint(&self) -> Result<&str, SettingsError> {
        self.endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
            .ok_or(SettingsError::MissingEndpoint)
    }

    /// Payment contract for the configured field, defaulting to `payment`.
    #[must_use]
    pub fn payment_contract(&self) -> PaymentContract {
        let field = self
            .payment_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_FIELD);
        PaymentContract::new(field)
    }

    /// Return the configured currency symbol, falling back to the default.
    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        self.currency_symbol
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
    }
}
