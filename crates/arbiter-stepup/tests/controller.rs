//! End-to-end behaviour of the sensitive action controller.

use std::sync::Arc;

use arbiter_core::SensitiveToken;
use arbiter_stepup::{
    ChallengePhase, ChallengeState, ConfirmOutcome, SensitiveActionController, TransportError,
};
use arbiter_test::{
    MockChallengeTransport, VALID_CODE, WRONG_CODE, init_test_logging, malformed_codes,
    spawn_request, test_token, wait_for_state,
};

fn controller_with(transport: &MockChallengeTransport) -> Arc<SensitiveActionController> {
    init_test_logging();
    Arc::new(SensitiveActionController::new(Arc::new(transport.clone())))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_code_resolves_token_and_closes_dialog() {
    let transport = MockChallengeTransport::new().accept_with("tok_abc");
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    let state = controller.state();
    assert!(state.visible);
    assert_eq!(state.phase, ChallengePhase::AwaitingCode);
    assert_eq!(transport.issue_calls(), 1);

    controller.set_code("123456");
    assert_eq!(controller.confirm().await, ConfirmOutcome::Accepted);

    let token = pending.await.unwrap();
    assert_eq!(token, Some(SensitiveToken::new("tok_abc")));
    assert_eq!(controller.state(), ChallengeState::default());
    assert_eq!(transport.submitted_codes(), vec!["123456".to_string()]);
}

#[tokio::test]
async fn rejected_code_keeps_dialog_open_with_backend_message() {
    let transport = MockChallengeTransport::new()
        .with_validate_result(Err(TransportError::rejected("验证码错误")));
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code(WRONG_CODE);
    let outcome = controller.confirm().await;
    assert_eq!(
        outcome,
        ConfirmOutcome::Rejected(TransportError::rejected("验证码错误"))
    );

    let state = controller.state();
    assert!(state.visible);
    assert_eq!(state.phase, ChallengePhase::AwaitingCode);
    assert_eq!(state.error_message.as_deref(), Some("验证码错误"));
    assert!(!state.loading);
    assert!(!pending.is_finished());

    // The operator retries without a new request_token call.
    controller.set_code(VALID_CODE);
    assert!(controller.state().error_message.is_none());
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
    assert_eq!(transport.validate_calls(), 2);
    assert_eq!(transport.issue_calls(), 1);
}

#[tokio::test]
async fn short_code_is_rejected_without_network_call() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code("12");
    let outcome = controller.confirm().await;
    assert!(matches!(outcome, ConfirmOutcome::Malformed(_)));
    assert_eq!(transport.validate_calls(), 0);

    let state = controller.state();
    assert!(state.visible);
    assert!(
        state
            .error_message
            .as_deref()
            .is_some_and(|m| m.starts_with("invalid format"))
    );
    assert!(!pending.is_finished());

    controller.cancel();
    assert_eq!(pending.await.unwrap(), None);
}

#[tokio::test]
async fn cancel_resolves_none_and_next_request_starts_fresh() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code("1234");
    controller.cancel();

    assert_eq!(pending.await.unwrap(), None);
    assert_eq!(controller.state(), ChallengeState::default());
    assert_eq!(transport.validate_calls(), 0);

    let pending = spawn_request(&controller).await;
    let state = controller.state();
    assert!(state.visible);
    assert!(state.entered_code.is_empty());
    assert!(state.error_message.is_none());
    assert_eq!(transport.issue_calls(), 2);

    controller.set_code(VALID_CODE);
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_codes_never_reach_transport() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);
    let pending = spawn_request(&controller).await;

    for code in malformed_codes() {
        controller.set_code(code);
        let outcome = controller.confirm().await;
        assert!(
            matches!(outcome, ConfirmOutcome::Malformed(_)),
            "{code:?} should be malformed, got {outcome:?}"
        );
        assert!(controller.state().error_message.is_some());
    }

    assert_eq!(transport.validate_calls(), 0);
    controller.cancel();
    assert_eq!(pending.await.unwrap(), None);
}

#[tokio::test]
async fn cancel_when_idle_is_noop() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);

    controller.cancel();
    assert_eq!(controller.state(), ChallengeState::default());
    assert_eq!(transport.issue_calls(), 0);

    // Also after a completed flow.
    let pending = spawn_request(&controller).await;
    controller.set_code(VALID_CODE);
    controller.confirm().await;
    pending.await.unwrap();
    controller.cancel();
    assert_eq!(controller.state(), ChallengeState::default());
}

#[tokio::test]
async fn concurrent_requests_share_one_challenge() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);

    let first = spawn_request(&controller).await;
    let second = {
        let caller = Arc::clone(&controller);
        tokio::spawn(async move { caller.request_token().await })
    };
    tokio::task::yield_now().await;

    controller.set_code(VALID_CODE);
    assert!(controller.confirm().await.is_accepted());

    assert_eq!(first.await.unwrap(), Some(test_token()));
    assert_eq!(second.await.unwrap(), Some(test_token()));
    assert_eq!(transport.issue_calls(), 1);
    assert_eq!(transport.validate_calls(), 1);
}

#[tokio::test]
async fn concurrent_requests_are_cancelled_together() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);

    let first = spawn_request(&controller).await;
    let joined = Arc::clone(&controller);
    let second = tokio::spawn(async move { joined.request_token().await });
    tokio::task::yield_now().await;

    controller.cancel();
    assert_eq!(first.await.unwrap(), None);
    assert_eq!(second.await.unwrap(), None);
    assert_eq!(transport.issue_calls(), 1);
}

#[tokio::test]
async fn cancel_during_validation_discards_late_result() {
    let transport = MockChallengeTransport::new().holding_validation();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code(VALID_CODE);

    let confirming = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.confirm().await })
    };
    let state = wait_for_state(&controller, |s| s.phase == ChallengePhase::Validating).await;
    assert!(state.loading);

    controller.cancel();
    assert_eq!(pending.await.unwrap(), None);

    transport.release_validation();
    assert_eq!(confirming.await.unwrap(), ConfirmOutcome::Superseded);
    assert_eq!(controller.state(), ChallengeState::default());
    assert_eq!(transport.validate_calls(), 1);
}

#[tokio::test]
async fn confirm_while_validating_is_ignored() {
    let transport = MockChallengeTransport::new().holding_validation();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code(VALID_CODE);
    let confirming = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.confirm().await })
    };
    wait_for_state(&controller, |s| s.phase == ChallengePhase::Validating).await;

    assert_eq!(controller.confirm().await, ConfirmOutcome::Ignored);
    assert_eq!(transport.validate_calls(), 1);

    transport.release_validation();
    assert!(confirming.await.unwrap().is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
}

#[tokio::test]
async fn observers_see_every_resolution_return_to_idle() {
    let transport = MockChallengeTransport::new();
    let controller = controller_with(&transport);
    let mut rx = controller.subscribe();

    let pending = spawn_request(&controller).await;
    assert!(rx.borrow_and_update().visible);

    controller.set_code(VALID_CODE);
    controller.confirm().await;
    pending.await.unwrap();

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(state.is_idle());
    assert!(!state.visible);
}

#[tokio::test]
async fn dropping_controller_releases_forgotten_waiters() {
    let transport = MockChallengeTransport::new();
    let controller = SensitiveActionController::new(Arc::new(transport.clone()));

    // Leak the caller's future so its waiter can only be resolved by the
    // controller's own teardown.
    let mut request = Box::pin(controller.request_token());
    assert!(futures::poll!(request.as_mut()).is_pending());
    assert!(controller.is_pending());
    std::mem::forget(request);

    let mut rx = controller.subscribe();
    drop(controller);
    assert!(rx.borrow_and_update().is_idle());
}

// ---------------------------------------------------------------------------
// Abandoned transport calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dropped_issuer_hands_challenge_to_joined_caller() {
    let transport = MockChallengeTransport::new().holding_issue();
    let controller = controller_with(&transport);

    let opener = {
        let caller = Arc::clone(&controller);
        tokio::spawn(async move { caller.request_token().await })
    };
    wait_for_state(&controller, |s| s.visible && s.loading).await;
    let joined = {
        let caller = Arc::clone(&controller);
        tokio::spawn(async move { caller.request_token().await })
    };
    tokio::task::yield_now().await;

    opener.abort();
    assert!(opener.await.unwrap_err().is_cancelled());

    let state = wait_for_state(&controller, |s| !s.loading).await;
    assert_eq!(state.phase, ChallengePhase::AwaitingCode);
    assert!(state.visible);

    transport.release_issue();
    assert!(controller.resend().await);
    assert_eq!(transport.issue_calls(), 2);

    controller.set_code(VALID_CODE);
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(joined.await.unwrap(), Some(test_token()));
}

#[tokio::test]
async fn dropped_issuer_alone_closes_challenge() {
    let transport = MockChallengeTransport::new().holding_issue();
    let controller = controller_with(&transport);

    let opener = {
        let caller = Arc::clone(&controller);
        tokio::spawn(async move { caller.request_token().await })
    };
    wait_for_state(&controller, |s| s.visible && s.loading).await;

    opener.abort();
    let _ = opener.await;

    assert_eq!(controller.state(), ChallengeState::default());
}

#[tokio::test]
async fn abandoned_validation_lets_operator_retry() {
    let transport = MockChallengeTransport::new().holding_validation();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    controller.set_code(VALID_CODE);
    let confirming = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.confirm().await })
    };
    wait_for_state(&controller, |s| s.phase == ChallengePhase::Validating).await;

    confirming.abort();
    assert!(confirming.await.unwrap_err().is_cancelled());

    let state = wait_for_state(&controller, |s| !s.loading).await;
    assert_eq!(state.phase, ChallengePhase::AwaitingCode);
    assert_eq!(state.entered_code, VALID_CODE);
    assert!(!pending.is_finished());

    transport.release_validation();
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
    assert_eq!(transport.validate_calls(), 2);
}

#[tokio::test]
async fn abandoned_resend_leaves_challenge_usable() {
    let transport = MockChallengeTransport::new().holding_issue();
    transport.release_issue();
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    let resending = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.resend().await })
    };
    wait_for_state(&controller, |s| s.loading).await;

    resending.abort();
    let _ = resending.await;
    wait_for_state(&controller, |s| !s.loading).await;

    controller.set_code(VALID_CODE);
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
}

#[tokio::test]
async fn failed_resend_keeps_challenge_open() {
    let transport = MockChallengeTransport::new()
        .with_issue_result(Ok(()))
        .with_issue_result(Err(TransportError::Network("sms gateway down".to_string())));
    let controller = controller_with(&transport);

    let pending = spawn_request(&controller).await;
    assert!(controller.resend().await);

    let state = controller.state();
    assert_eq!(state.phase, ChallengePhase::AwaitingCode);
    assert!(!state.loading);
    assert_eq!(
        state.error_message.as_deref(),
        Some("network error: sms gateway down")
    );

    controller.set_code(VALID_CODE);
    assert!(controller.confirm().await.is_accepted());
    assert_eq!(pending.await.unwrap(), Some(test_token()));
    assert_eq!(transport.issue_calls(), 2);
}
