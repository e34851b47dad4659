//! Loan request model and the schema validator that builds it.
//!
//! Raw form text is coerced to numbers and checked field by field. Checks
//! never cross fields, so every field reports its own violations.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Form fields accepted by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanField {
    /// Principal borrowed.
    LoanAmount,
    /// Annual interest rate as a percentage.
    InterestRate,
    /// Term in whole months.
    LoanTerm,
}

impl LoanField {
    /// Every field in form order.
    pub const ALL: [Self; 3] = [Self::LoanAmount, Self::InterestRate, Self::LoanTerm];

    /// Stable wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoanAmount => "loan_amount",
            Self::InterestRate => "interest_rate",
            Self::LoanTerm => "loan_term",
        }
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated text entered for each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLoanInput {
    /// Text entered for the loan amount.
    pub loan_amount: String,
    /// Text entered for the interest rate.
    pub interest_rate: String,
    /// Text entered for the loan term.
    pub loan_term: String,
}

impl RawLoanInput {
    /// Capture raw text for all three fields.
    #[must_use]
    pub fn new(
        loan_amount: impl Into<String>,
        interest_rate: impl Into<String>,
        loan_term: impl Into<String>,
    ) -> Self {
        Self {
            loan_amount: loan_amount.into(),
            interest_rate: interest_rate.into(),
            loan_term: loan_term.into(),
        }
    }

    /// Return the raw text held for `field`.
    #[must_use]
    pub fn value(&self, field: LoanField) -> &str {
        match field {
            LoanField::LoanAmount => self.loan_amount.as_str(),
            LoanField::InterestRate => self.interest_rate.as_str(),
            LoanField::LoanTerm => self.loan_term.as_str(),
        }
    }
}

/// Validated calculation request sent to the remote calculator.
///
/// Only [`validate`] constructs this type. Serialises to exactly
/// `loan_amount`, `interest_rate` and `loan_term`; collaborators depend on
/// those names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanRequest {
    loan_amount: f64,
    interest_rate: f64,
    loan_term: u32,
}

impl LoanRequest {
    /// Principal borrowed; always finite and positive.
    #[must_use]
    pub const fn loan_amount(&self) -> f64 {
        self.loan_amount
    }

    /// Annual interest rate; always finite and positive.
    #[must_use]
    pub const fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    /// Term in months; always positive.
    #[must_use]
    pub const fn loan_term(&self) -> u32 {
        self.loan_term
    }
}

/// A single rule broken by one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldViolation {
    /// The amount or rate is missing, non-numeric, zero or negative.
    #[error("Must be a positive number")]
    NotPositiveNumber,
    /// The term is missing, non-numeric, zero or negative.
    #[error("Must be a positive integer")]
    NotPositiveInteger,
    /// The term has a fractional part or does not fit a month count.
    #[error("Must be an integer")]
    NotInteger,
}

/// Violations grouped by field, in rule order within each field.
///
/// Rules are checked positivity first, then integrality for the term. The
/// term can break both, in which case both violations are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    violations: BTreeMap<LoanField, Vec<FieldViolation>>,
}

impl FieldErrors {
    fn record(&mut self, field: LoanField, violation: FieldViolation) {
        self.violations.entry(field).or_default().push(violation);
    }

    /// Return whether no field failed validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations recorded for `field`, empty when the field is valid.
    #[must_use]
    pub fn for_field(&self, field: LoanField) -> &[FieldViolation] {
        self.violations
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The violation a form shows next to `field`: the first rule it broke.
    #[must_use]
    pub fn first(&self, field: LoanField) -> Option<FieldViolation> {
        self.for_field(field).first().copied()
    }

    /// Fields that failed, in form order.
    pub fn fields(&self) -> impl Iterator<Item = LoanField> + '_ {
        self.violations.keys().copied()
    }

    /// Every message in form order, then rule order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations
            .values()
            .flatten()
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for (field, violations) in &self.violations {
            for violation in violations {
                write!(f, "{separator}{field}: {violation}")?;
                separator = "; ";
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Validate raw form text into a [`LoanRequest`].
///
/// Text is trimmed before coercion; blank text counts as zero and text that is
/// not a finite number breaks the positivity rule of its field. The term can
/// break both of its rules at once (for example `-2.5`), in which case both
/// violations are reported.
///
/// # Errors
///
/// Returns [`FieldErrors`] naming every field that broke a rule.
///
/// # Examples
///
/// ```
/// use loan_calculator::domain::{FieldViolation, LoanField, RawLoanInput, validate};
///
/// let request = validate(&RawLoanInput::new("1000", "5", "12")).expect("valid input");
/// assert_eq!(request.loan_term(), 12);
///
/// let errors = validate(&RawLoanInput::new("1000", "5", "12.5")).expect_err("fractional term");
/// assert_eq!(errors.for_field(LoanField::LoanTerm), [FieldViolation::NotInteger]);
/// ```
pub fn validate(raw: &RawLoanInput) -> Result<LoanRequest, FieldErrors> {
    let mut errors = FieldErrors::default();

    let amount = positive_number(raw.value(LoanField::LoanAmount));
    if amount.is_none() {
        errors.record(LoanField::LoanAmount, FieldViolation::NotPositiveNumber);
    }
    let rate = positive_number(raw.value(LoanField::InterestRate));
    if rate.is_none() {
        errors.record(LoanField::InterestRate, FieldViolation::NotPositiveNumber);
    }
    let term = whole_months(raw.value(LoanField::LoanTerm), &mut errors);

    match (amount, rate, term) {
        (Some(loan_amount), Some(interest_rate), Some(loan_term)) => Ok(LoanRequest {
            loan_amount,
            interest_rate,
            loan_term,
        }),
        _ => Err(errors),
    }
}

fn coerce(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn positive_number(raw: &str) -> Option<f64> {
    coerce(raw).filter(|value| *value > 0.0)
}

fn whole_months(raw: &str, errors: &mut FieldErrors) -> Option<u32> {
    let value = coerce(raw);
    let positive = value.is_some_and(|months| months > 0.0);
    if !positive {
        errors.record(LoanField::LoanTerm, FieldViolation::NotPositiveInteger);
    }
    let whole = value.is_some_and(fits_month_count);
    if value.is_some() && !whole {
        errors.record(LoanField::LoanTerm, FieldViolation::NotInteger);
    }
    value
        .filter(|_| positive && whole)
        .map(to_month_count)
}

fn fits_month_count(months: f64) -> bool {
    months.fract() == 0.0 && months <= f64::from(u32::MAX)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers pass positive whole values no larger than u32::MAX"
)]
fn to_month_count(months: f64) -> u32 {
    months as u32
}
