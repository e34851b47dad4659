//! Submission controller: the validated submission state machine.
//!
//! The controller owns one session. A submission validates synchronously,
//! then suspends once on the outbound call. At most one accepted submission
//! is current at a time; results from calls that a reset or newer submission
//! has superseded are discarded rather than applied.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

use super::classifier::{PaymentContract, classify};
use super::loan_request::{FieldErrors, LoanRequest, RawLoanInput, validate};
use super::outcome::SubmissionOutcome;
use super::ports::LoanCalculatorEndpoint;

/// Whether a call to the calculator is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// One call is awaiting its result.
    Submitting,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionSnapshot {
    /// Current phase.
    pub phase: SubmissionPhase,
    /// Outcome of the last completed attempt, if any.
    pub outcome: Option<SubmissionOutcome>,
    /// Field errors from the last rejected attempt, if any.
    pub field_errors: Option<FieldErrors>,
}

impl SubmissionSnapshot {
    /// Return whether a call is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitting)
    }
}

/// What happened to one `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDisposition {
    /// Another submission was in flight; nothing was sent.
    Ignored,
    /// Validation failed; nothing was sent.
    Rejected(FieldErrors),
    /// The call resolved and its outcome is now current.
    Completed(SubmissionOutcome),
    /// The call resolved after a reset or newer submission; its outcome was
    /// discarded.
    Superseded(SubmissionOutcome),
}

/// Failures of the controller itself, never of the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The session state could not be locked.
    #[error("submission state unavailable: {message}")]
    StateUnavailable {
        /// Why the state was unavailable.
        message: String,
    },
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SubmissionPhase,
    outcome: Option<SubmissionOutcome>,
    field_errors: Option<FieldErrors>,
    sequence: u64,
}

impl SessionState {
    fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            phase: self.phase,
            outcome: self.outcome.clone(),
            field_errors: self.field_errors.clone(),
        }
    }

    const fn advance(&mut self) -> u64 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }
}

enum Admission {
    Accepted {
        request: LoanRequest,
        ticket: u64,
    },
    Ignored,
    Rejected(FieldErrors),
}

/// Releases the session if an accepted submission is dropped before it
/// settles, for example when the caller times out or aborts the task.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    ticket: u64,
    armed: bool,
}

impl InFlight<'_> {
    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.sequence == self.ticket && state.phase == SubmissionPhase::Submitting {
            state.phase = SubmissionPhase::Idle;
            debug!(ticket = self.ticket, "abandoned submission released the session");
        }
    }
}

/// Drives validation, the single outbound call, and classification.
pub struct SubmissionController {
    endpoint: Arc<dyn LoanCalculatorEndpoint>,
    contract: PaymentContract,
    state: Mutex<SessionState>,
}

impl SubmissionController {
    /// Build an idle controller calling `endpoint` and expecting `contract`.
    ///
    /// ```rust,ignore
    /// let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());
    /// assert!(!controller.is_submitting()?);
    /// ```
    #[must_use]
    pub fn new(endpoint: Arc<dyn LoanCalculatorEndpoint>, contract: PaymentContract) -> Self {
        Self {
            endpoint,
            contract,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Validate `raw` and, when valid, submit it once and record the outcome.
    ///
    /// Calls made while another submission is in flight return
    /// [`SubmitDisposition::Ignored`] without touching the endpoint. Dropping
    /// the returned future before it resolves returns the session to idle
    /// without recording an outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::StateUnavailable`] when the session lock is
    /// poisoned.
    pub async fn submit(&self, raw: &RawLoanInput) -> Result<SubmitDisposition, SubmissionError> {
        let (request, ticket) = match self.admit(raw)? {
            Admission::Accepted { request, ticket } => (request, ticket),
            Admission::Ignored => return Ok(SubmitDisposition::Ignored),
            Admission::Rejected(errors) => return Ok(SubmitDisposition::Rejected(errors)),
        };

        let mut in_flight = InFlight {
            state: &self.state,
            ticket,
            armed: true,
        };
        let result = self.endpoint.submit(&request).await;
        if let Err(error) = &result {
            warn!(%error, ticket, "loan calculator call failed");
        }
        let outcome = classify(&result, &self.contract);
        if matches!(outcome, SubmissionOutcome::UnrecognizedResponse) {
            warn!(
                ticket,
                field = self.contract.field(),
                "loan calculator response broke the payment contract"
            );
        }
        let disposition = self.settle(ticket, outcome);
        in_flight.disarm();
        disposition
    }

    /// Clear the outcome and field errors and return to idle.
    ///
    /// An outstanding call is not cancelled; its result is discarded when it
    /// arrives.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::StateUnavailable`] when the session lock is
    /// poisoned.
    pub fn reset(&self) -> Result<(), SubmissionError> {
        let mut state = self.lock_state()?;
        let sequence = state.advance();
        state.phase = SubmissionPhase::Idle;
        state.outcome = None;
        state.field_errors = None;
        debug!(sequence, "submission session reset");
        Ok(())
    }

    /// Copy of the current session state.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::StateUnavailable`] when the session lock is
    /// poisoned.
    pub fn snapshot(&self) -> Result<SubmissionSnapshot, SubmissionError> {
        Ok(self.lock_state()?.snapshot())
    }

    /// Return whether a call is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::StateUnavailable`] when the session lock is
    /// poisoned.
    pub fn is_submitting(&self) -> Result<bool, SubmissionError> {
        Ok(self.lock_state()?.phase == SubmissionPhase::Submitting)
    }

    fn admit(&self, raw: &RawLoanInput) -> Result<Admission, SubmissionError> {
        let mut state = self.lock_state()?;
        if state.phase == SubmissionPhase::Submitting {
            debug!(
                sequence = state.sequence,
                "submission ignored while another is in flight"
            );
            return Ok(Admission::Ignored);
        }

        match validate(raw) {
            Ok(request) => {
                let ticket = state.advance();
                state.phase = SubmissionPhase::Submitting;
                state.outcome = None;
                state.field_errors = None;
                debug!(ticket, "submitting loan calculation");
                Ok(Admission::Accepted { request, ticket })
            }
            Err(errors) => {
                debug!(%errors, "loan input rejected");
                state.outcome = Some(SubmissionOutcome::ValidationFailure {
                    messages: errors.messages(),
                });
                state.field_errors = Some(errors.clone());
                Ok(Admission::Rejected(errors))
            }
        }
    }

    fn settle(
        &self,
        ticket: u64,
        outcome: SubmissionOutcome,
    ) -> Result<SubmitDisposition, SubmissionError> {
        let mut state = self.lock_state()?;
        if state.sequence != ticket {
            debug!(
                ticket,
                sequence = state.sequence,
                "discarding superseded loan calculator result"
            );
            return Ok(SubmitDisposition::Superseded(outcome));
        }

        state.phase = SubmissionPhase::Idle;
        state.outcome = Some(outcome.clone());
        debug!(ticket, outcome = ?outcome, "loan calculation settled");
        Ok(SubmitDisposition::Completed(outcome))
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>, SubmissionError> {
        self.state.lock().map_err(|_| SubmissionError::StateUnavailable {
            message: "submission state lock poisoned".to_owned(),
        })
    }
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
