//! Tests for the submission controller.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::*;
use crate::domain::LoanRequest;
use crate::domain::ports::{
    EndpointResponse, EndpointResult, LoanCalculatorEndpointError, MockLoanCalculatorEndpoint,
};

fn valid_input() -> RawLoanInput {
    RawLoanInput::new("1000", "5", "12")
}

fn payment_body(amount: u32) -> EndpointResult {
    Ok(EndpointResponse::new(
        200,
        format!(r#"{{"payment": {amount}}}"#),
    ))
}

fn controller_answering(result: EndpointResult) -> SubmissionController {
    let mut endpoint = MockLoanCalculatorEndpoint::new();
    endpoint
        .expect_submit()
        .times(1)
        .return_once(move |_| result);
    SubmissionController::new(Arc::new(endpoint), PaymentContract::default())
}

/// Endpoint whose calls can be held open until a test releases them.
struct GatedEndpoint {
    script: Mutex<VecDeque<(Option<Arc<Notify>>, EndpointResult)>>,
    calls: AtomicUsize,
    entered: mpsc::UnboundedSender<usize>,
}

impl GatedEndpoint {
    fn new(
        script: Vec<(Option<Arc<Notify>>, EndpointResult)>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
        let (entered, entered_rx) = mpsc::unbounded_channel();
        let endpoint = Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            entered,
        });
        (endpoint, entered_rx)
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoanCalculatorEndpoint for GatedEndpoint {
    async fn submit(&self, _request: &LoanRequest) -> EndpointResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let (gate, result) = self
            .script
            .lock()
            .expect("script mutex")
            .pop_front()
            .expect("endpoint script exhausted");
        self.entered.send(call).expect("record entry");
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

async fn submit_in_background(
    controller: Arc<SubmissionController>,
) -> Result<SubmitDisposition, SubmissionError> {
    controller.submit(&valid_input()).await
}

#[tokio::test]
async fn invalid_input_never_reaches_the_endpoint() {
    let mut endpoint = MockLoanCalculatorEndpoint::new();
    endpoint.expect_submit().times(0);
    let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());

    let disposition = controller
        .submit(&RawLoanInput::new("-100", "-5", "-2"))
        .await
        .expect("submit runs");

    let SubmitDisposition::Rejected(errors) = disposition else {
        panic!("expected rejection, got {disposition:?}");
    };
    assert_eq!(errors.messages().len(), 3);

    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.phase, SubmissionPhase::Idle);
    assert_eq!(snapshot.field_errors, Some(errors));
    assert_eq!(
        snapshot.outcome,
        Some(SubmissionOutcome::ValidationFailure {
            messages: vec![
                "Must be a positive number".to_owned(),
                "Must be a positive number".to_owned(),
                "Must be a positive integer".to_owned(),
            ],
        })
    );
}

#[tokio::test]
async fn sends_the_validated_request_once() {
    let mut endpoint = MockLoanCalculatorEndpoint::new();
    endpoint
        .expect_submit()
        .withf(|request: &LoanRequest| {
            request.loan_amount() == 1000.0
                && request.interest_rate() == 5.0
                && request.loan_term() == 12
        })
        .times(1)
        .return_once(|_| payment_body(100));
    let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());

    let disposition = controller.submit(&valid_input()).await.expect("submit runs");

    assert_eq!(
        disposition,
        SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 100.0 })
    );
}

#[tokio::test]
async fn success_is_stored_and_rendered_with_currency() {
    let controller = controller_answering(payment_body(100));

    controller.submit(&valid_input()).await.expect("submit runs");

    let snapshot = controller.snapshot().expect("snapshot");
    assert!(!snapshot.is_submitting());
    assert!(snapshot.field_errors.is_none());
    let outcome = snapshot.outcome.expect("outcome stored");
    assert_eq!(outcome, SubmissionOutcome::Success { amount: 100.0 });
    assert!(outcome.to_string().contains("100€"));
}

#[tokio::test]
async fn server_errors_are_unavailable() {
    let controller = controller_answering(Ok(EndpointResponse::new(500, Vec::<u8>::new())));

    controller.submit(&valid_input()).await.expect("submit runs");

    let outcome = controller
        .snapshot()
        .expect("snapshot")
        .outcome
        .expect("outcome stored");
    assert_eq!(
        outcome,
        SubmissionOutcome::ServiceUnavailable {
            status_code: Some(500)
        }
    );
    assert_eq!(outcome.to_string(), "Service is unavailable. Try again later.");
}

#[tokio::test]
async fn renamed_payment_field_is_unrecognized_not_unavailable() {
    let controller =
        controller_answering(Ok(EndpointResponse::new(200, r#"{"amount": 100}"#)));

    let disposition = controller.submit(&valid_input()).await.expect("submit runs");

    assert_eq!(
        disposition,
        SubmitDisposition::Completed(SubmissionOutcome::UnrecognizedResponse)
    );
}

#[tokio::test]
async fn transport_failures_are_unavailable_without_status() {
    let controller = controller_answering(Err(LoanCalculatorEndpointError::transport(
        "connection refused",
    )));

    controller.submit(&valid_input()).await.expect("submit runs");

    assert_eq!(
        controller.snapshot().expect("snapshot").outcome,
        Some(SubmissionOutcome::ServiceUnavailable { status_code: None })
    );
}

#[tokio::test]
async fn reset_restores_the_initial_snapshot() {
    let controller = controller_answering(payment_body(100));
    controller.submit(&valid_input()).await.expect("submit runs");

    controller.reset().expect("reset");

    assert_eq!(
        controller.snapshot().expect("snapshot"),
        SubmissionSnapshot::default()
    );
}

#[tokio::test]
async fn reset_clears_field_errors() {
    let mut endpoint = MockLoanCalculatorEndpoint::new();
    endpoint.expect_submit().times(0);
    let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());
    controller
        .submit(&RawLoanInput::new("", "5", "12"))
        .await
        .expect("submit runs");

    controller.reset().expect("reset");
    controller.reset().expect("reset twice");

    assert_eq!(
        controller.snapshot().expect("snapshot"),
        SubmissionSnapshot::default()
    );
}

#[tokio::test]
async fn a_new_outcome_replaces_the_previous_one() {
    let mut endpoint = MockLoanCalculatorEndpoint::new();
    let mut answers = VecDeque::from([
        payment_body(100),
        Ok(EndpointResponse::new(503, Vec::<u8>::new())),
    ]);
    endpoint
        .expect_submit()
        .times(2)
        .returning(move |_| answers.pop_front().expect("scripted answer"));
    let controller = SubmissionController::new(Arc::new(endpoint), PaymentContract::default());

    controller.submit(&valid_input()).await.expect("first submit");
    controller.submit(&valid_input()).await.expect("second submit");

    assert_eq!(
        controller.snapshot().expect("snapshot").outcome,
        Some(SubmissionOutcome::ServiceUnavailable {
            status_code: Some(503)
        })
    );
}

#[tokio::test]
async fn resubmitting_while_in_flight_sends_nothing() {
    let release = Arc::new(Notify::new());
    let (endpoint, mut entered) =
        GatedEndpoint::new(vec![(Some(release.clone()), payment_body(100))]);
    let controller = Arc::new(SubmissionController::new(
        endpoint.clone(),
        PaymentContract::default(),
    ));

    let first = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("first call entered");

    let snapshot = controller.snapshot().expect("snapshot");
    assert!(snapshot.is_submitting());
    assert!(snapshot.outcome.is_none());

    let second = controller.submit(&valid_input()).await.expect("second submit");
    assert_eq!(second, SubmitDisposition::Ignored);
    assert_eq!(endpoint.call_count(), 1);

    release.notify_one();
    let settled = first.await.expect("join first").expect("first submit");
    assert_eq!(
        settled,
        SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 100.0 })
    );
    assert_eq!(endpoint.call_count(), 1);
    assert!(!controller.is_submitting().expect("phase"));
}

#[tokio::test]
async fn stale_results_do_not_overwrite_newer_submissions() {
    let release = Arc::new(Notify::new());
    let (endpoint, mut entered) = GatedEndpoint::new(vec![
        (Some(release.clone()), payment_body(1)),
        (None, payment_body(2)),
    ]);
    let controller = Arc::new(SubmissionController::new(
        endpoint.clone(),
        PaymentContract::default(),
    ));

    let first = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("first call entered");

    controller.reset().expect("reset");
    assert!(!controller.is_submitting().expect("phase"));
    let second = controller.submit(&valid_input()).await.expect("second submit");
    assert_eq!(
        second,
        SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 2.0 })
    );

    release.notify_one();
    let stale = first.await.expect("join first").expect("first submit");
    assert_eq!(
        stale,
        SubmitDisposition::Superseded(SubmissionOutcome::Success { amount: 1.0 })
    );
    assert_eq!(
        controller.snapshot().expect("snapshot").outcome,
        Some(SubmissionOutcome::Success { amount: 2.0 })
    );
}

#[tokio::test]
async fn reset_mid_flight_discards_the_late_result() {
    let release = Arc::new(Notify::new());
    let (endpoint, mut entered) =
        GatedEndpoint::new(vec![(Some(release.clone()), payment_body(100))]);
    let controller = Arc::new(SubmissionController::new(
        endpoint,
        PaymentContract::default(),
    ));

    let first = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("first call entered");
    controller.reset().expect("reset");

    release.notify_one();
    let late = first.await.expect("join first").expect("first submit");

    assert!(matches!(late, SubmitDisposition::Superseded(_)));
    assert_eq!(
        controller.snapshot().expect("snapshot"),
        SubmissionSnapshot::default()
    );
}

#[tokio::test]
async fn dropping_an_accepted_submission_releases_the_session() {
    let never = Arc::new(Notify::new());
    let (endpoint, mut entered) = GatedEndpoint::new(vec![
        (Some(never), payment_body(1)),
        (None, payment_body(2)),
    ]);
    let controller = Arc::new(SubmissionController::new(
        endpoint.clone(),
        PaymentContract::default(),
    ));

    let abandoned = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("first call entered");
    assert!(controller.is_submitting().expect("phase"));
    abandoned.abort();
    assert!(abandoned.await.expect_err("task aborted").is_cancelled());

    let snapshot = controller.snapshot().expect("snapshot");
    assert!(!snapshot.is_submitting());
    assert!(snapshot.outcome.is_none());

    let next = controller.submit(&valid_input()).await.expect("next submit");
    assert_eq!(
        next,
        SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 2.0 })
    );
    assert_eq!(endpoint.call_count(), 2);
}

#[tokio::test]
async fn dropping_a_superseded_submission_leaves_the_newer_one_alone() {
    let first_gate = Arc::new(Notify::new());
    let second_gate = Arc::new(Notify::new());
    let (endpoint, mut entered) = GatedEndpoint::new(vec![
        (Some(first_gate), payment_body(1)),
        (Some(second_gate.clone()), payment_body(2)),
    ]);
    let controller = Arc::new(SubmissionController::new(
        endpoint,
        PaymentContract::default(),
    ));

    let stale = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("first call entered");
    controller.reset().expect("reset");
    let current = tokio::spawn(submit_in_background(controller.clone()));
    entered.recv().await.expect("second call entered");

    stale.abort();
    assert!(stale.await.expect_err("task aborted").is_cancelled());
    assert!(controller.is_submitting().expect("phase"));

    second_gate.notify_one();
    let settled = current.await.expect("join current").expect("current submit");
    assert_eq!(
        settled,
        SubmitDisposition::Completed(SubmissionOutcome::Success { amount: 2.0 })
    );
}
