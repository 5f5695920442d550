//! Sensitive action controller: orchestrates the step-up flow.
//!
//! The [`SensitiveActionController`] coordinates between:
//! - Calling code, which awaits [`SensitiveActionController::request_token`]
//! - The challenge UI, which drives [`set_code`], [`confirm`] and [`cancel`]
//! - The [`ChallengeTransport`], which issues and validates one-time codes
//!
//! # Flow
//!
//! 1. A caller requests a token; if no challenge is open one is opened and
//!    the transport is asked to issue a code
//! 2. The operator enters a code and confirms
//! 3. Malformed codes are rejected locally, without a round trip
//! 4. Well-formed codes are validated by the transport; failures are shown
//!    inline and the operator may retry
//! 5. On success every waiting caller receives the token; on cancel `None`
//! 6. The controller returns to `Idle` and is immediately reusable
//!
//! [`set_code`]: SensitiveActionController::set_code
//! [`confirm`]: SensitiveActionController::confirm
//! [`cancel`]: SensitiveActionController::cancel

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arbiter_core::{CodeFormatError, OneTimeCode, SensitiveToken};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::state::{ChallengePhase, ChallengeState};
use crate::transport::{ChallengeTransport, TransportError};

/// What a call to [`SensitiveActionController::confirm`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The code was accepted and all waiting callers received the token.
    Accepted,
    /// The transport refused the code. The challenge stays open.
    Rejected(TransportError),
    /// The entered code is malformed; nothing was sent.
    Malformed(CodeFormatError),
    /// Nothing to confirm: no challenge open, or a call already in flight.
    Ignored,
    /// The challenge was cancelled while the code was being validated, and
    /// the late result was discarded.
    Superseded,
}

impl ConfirmOutcome {
    /// Whether the code was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

type Waiter = oneshot::Sender<Option<SensitiveToken>>;

/// Mutable controller state, guarded by a mutex that is never held across
/// an `.await`.
#[derive(Default)]
struct Inner {
    state: ChallengeState,
    waiters: Vec<Waiter>,
    /// Generation of the current challenge. Bumped whenever a challenge
    /// opens or closes so late transport results can be recognised.
    epoch: u64,
}

impl Inner {
    /// Close the current challenge, handing back everyone who was waiting.
    fn close(&mut self) -> Vec<Waiter> {
        self.state = ChallengeState::default();
        self.epoch = self.epoch.wrapping_add(1);
        std::mem::take(&mut self.waiters)
    }
}

/// Reusable gate that obtains a single-use [`SensitiveToken`].
///
/// Each screen owns its own controller. At most one challenge is open per
/// controller; callers that ask for a token while one is open join it and
/// resolve together with the first caller.
///
/// Errors never escape the controller: client-side format errors and
/// transport failures land in [`ChallengeState::error_message`], and
/// cancellation resolves callers with `None`.
pub struct SensitiveActionController {
    transport: Arc<dyn ChallengeTransport>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ChallengeState>,
}

impl SensitiveActionController {
    /// Create a controller backed by the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn ChallengeTransport>) -> Self {
        let (state_tx, _) = watch::channel(ChallengeState::default());
        Self {
            transport,
            inner: Mutex::new(Inner::default()),
            state_tx,
        }
    }

    /// Obtain a sensitive token, suspending until the operator confirms a
    /// valid code (`Some`) or cancels (`None`).
    ///
    /// If no challenge is open, one is opened and the transport is asked to
    /// issue a code. If one is already open, this call joins it without
    /// contacting the transport again.
    ///
    /// Dropping the returned future withdraws the caller; when the last
    /// waiting caller withdraws, the challenge is cancelled.
    pub async fn request_token(&self) -> Option<SensitiveToken> {
        let (tx, rx) = oneshot::channel();
        let opened = {
            let mut inner = self.lock();
            inner.waiters.push(tx);
            if inner.state.phase.is_pending() {
                debug!(
                    waiters = inner.waiters.len(),
                    "joining pending sensitive-action challenge"
                );
                None
            } else {
                inner.epoch = inner.epoch.wrapping_add(1);
                inner.state = ChallengeState::opened();
                self.publish(&inner);
                debug!(challenge = inner.epoch, "opened sensitive-action challenge");
                Some(inner.epoch)
            }
        };

        let mut waiter = WaiterGuard {
            controller: self,
            rx: Some(rx),
        };

        if let Some(epoch) = opened {
            self.issue(epoch).await;
        }

        waiter.wait().await
    }

    /// Record operator input.
    ///
    /// Clears any previous error message. Ignored when no challenge is
    /// waiting for a code.
    pub fn set_code(&self, code: impl Into<String>) {
        let mut inner = self.lock();
        if inner.state.phase != ChallengePhase::AwaitingCode {
            return;
        }
        inner.state.entered_code = code.into();
        inner.state.error_message = None;
        self.publish(&inner);
    }

    /// Submit the entered code.
    ///
    /// Malformed codes are rejected without contacting the transport. A
    /// transport failure leaves the challenge open with the failure shown in
    /// `error_message`; it is never retried automatically.
    pub async fn confirm(&self) -> ConfirmOutcome {
        let (code, epoch) = {
            let mut inner = self.lock();
            if inner.state.phase != ChallengePhase::AwaitingCode || inner.state.loading {
                return ConfirmOutcome::Ignored;
            }
            match OneTimeCode::parse(&inner.state.entered_code) {
                Ok(code) => {
                    inner.state.phase = ChallengePhase::Validating;
                    inner.state.loading = true;
                    inner.state.error_message = None;
                    self.publish(&inner);
                    (code, inner.epoch)
                },
                Err(e) => {
                    debug!(challenge = inner.epoch, "rejected malformed code locally");
                    inner.state.error_message = Some(e.to_string());
                    self.publish(&inner);
                    return ConfirmOutcome::Malformed(e);
                },
            }
        };

        let call = InFlight::new(self, epoch);
        let result = match self.transport.validate(&code).await {
            Ok(token) if token.is_empty() => Err(TransportError::Unexpected(
                "backend returned an empty token".to_string(),
            )),
            other => other,
        };
        call.finish();

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!(challenge = epoch, "discarding validation result of closed challenge");
            return ConfirmOutcome::Superseded;
        }

        match result {
            Ok(token) => {
                let waiters = inner.close();
                self.publish(&inner);
                drop(inner);
                info!(
                    challenge = epoch,
                    waiters = waiters.len(),
                    "sensitive action confirmed"
                );
                for tx in waiters {
                    let _ = tx.send(Some(SensitiveToken::new(token.expose())));
                }
                ConfirmOutcome::Accepted
            },
            Err(e) => {
                warn!(challenge = epoch, error = %e, "verification code rejected");
                inner.state.phase = ChallengePhase::AwaitingCode;
                inner.state.loading = false;
                inner.state.error_message = Some(e.to_string());
                self.publish(&inner);
                ConfirmOutcome::Rejected(e)
            },
        }
    }

    /// Abort the open challenge, resolving every waiting caller with `None`.
    ///
    /// Does nothing when no challenge is open. Safe to call from teardown
    /// paths, including `Drop`.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if !inner.state.phase.is_pending() {
            return;
        }
        let epoch = inner.epoch;
        let waiters = inner.close();
        self.publish(&inner);
        drop(inner);
        info!(
            challenge = epoch,
            waiters = waiters.len(),
            "sensitive action cancelled"
        );
        for tx in waiters {
            let _ = tx.send(None);
        }
    }

    /// Ask the transport to deliver a new code for the open challenge.
    ///
    /// Returns `false` without doing anything when no challenge is waiting
    /// for a code or another call is in flight.
    pub async fn resend(&self) -> bool {
        let epoch = {
            let mut inner = self.lock();
            if inner.state.phase != ChallengePhase::AwaitingCode || inner.state.loading {
                return false;
            }
            inner.state.loading = true;
            inner.state.error_message = None;
            self.publish(&inner);
            inner.epoch
        };
        self.issue(epoch).await;
        true
    }

    /// Current snapshot of the challenge.
    #[must_use]
    pub fn state(&self) -> ChallengeState {
        self.lock().state.clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver always holds the latest snapshot; intermediate states
    /// may be skipped by slow observers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChallengeState> {
        self.state_tx.subscribe()
    }

    /// Whether a challenge is currently open.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().state.phase.is_pending()
    }

    /// Run the transport's issue step for challenge `epoch`.
    async fn issue(&self, epoch: u64) {
        let call = InFlight::new(self, epoch);
        let result = self.transport.issue().await;
        call.finish();

        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        inner.state.loading = false;
        if let Err(e) = result {
            warn!(challenge = epoch, error = %e, "failed to issue verification code");
            inner.state.error_message = Some(e.to_string());
        }
        self.publish(&inner);
    }

    /// Reopen challenge `epoch` for input after its transport call was
    /// dropped before answering.
    fn abandon_call(&self, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch || !inner.state.loading {
            return;
        }
        debug!(
            challenge = epoch,
            phase = %inner.state.phase,
            "transport call abandoned, awaiting code again"
        );
        inner.state.phase = ChallengePhase::AwaitingCode;
        inner.state.loading = false;
        self.publish(&inner);
    }

    /// Remove waiters whose callers have gone away; cancel the challenge if
    /// none are left.
    fn prune_waiters(&self) {
        let mut inner = self.lock();
        inner.waiters.retain(|tx| !tx.is_closed());
        if inner.waiters.is_empty() && inner.state.phase.is_pending() {
            debug!(challenge = inner.epoch, "all callers withdrew, closing challenge");
            inner.close();
            self.publish(&inner);
        }
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SensitiveActionController {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SensitiveActionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SensitiveActionController")
            .field("phase", &inner.state.phase)
            .field("waiters", &inner.waiters.len())
            .finish_non_exhaustive()
    }
}

/// A caller's place in the queue of a pending challenge.
///
/// If the caller's future is dropped before resolution, the receiver is
/// released first and the controller then prunes the closed sender.
struct WaiterGuard<'a> {
    controller: &'a SensitiveActionController,
    rx: Option<oneshot::Receiver<Option<SensitiveToken>>>,
}

impl WaiterGuard<'_> {
    async fn wait(&mut self) -> Option<SensitiveToken> {
        let rx = self.rx.as_mut()?;
        // A dropped sender means the controller went away: treat as cancel.
        let outcome = rx.await.unwrap_or(None);
        self.rx = None;
        outcome
    }
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            drop(rx);
            self.controller.prune_waiters();
        }
    }
}

/// A transport call in flight for one challenge.
///
/// Dropped without [`InFlight::finish`] means the future driving the call was
/// abandoned; the challenge then goes back to waiting for a code so the
/// callers still queued on it can be served.
struct InFlight<'a> {
    controller: &'a SensitiveActionController,
    epoch: u64,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(controller: &'a SensitiveActionController, epoch: u64) -> Self {
        Self {
            controller,
            epoch,
            armed: true,
        }
    }

    /// The call answered; its result is applied by the caller.
    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abandon_call(self.epoch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::transport::TransportResult;

    /// Accepts every well-formed code.
    #[derive(Default)]
    struct AcceptingTransport {
        issued: AtomicUsize,
        validated: AtomicUsize,
    }

    #[async_trait]
    impl ChallengeTransport for AcceptingTransport {
        async fn issue(&self) -> TransportResult<()> {
            self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn validate(&self, _code: &OneTimeCode) -> TransportResult<SensitiveToken> {
            self.validated.fetch_add(1, Ordering::SeqCst);
            Ok(SensitiveToken::new("tok_abc"))
        }
    }

    /// Fails to deliver codes.
    struct BrokenIssueTransport;

    #[async_trait]
    impl ChallengeTransport for BrokenIssueTransport {
        async fn issue(&self) -> TransportResult<()> {
            Err(TransportError::Network("sms gateway down".to_string()))
        }

        async fn validate(&self, _code: &OneTimeCode) -> TransportResult<SensitiveToken> {
            Ok(SensitiveToken::new("tok_abc"))
        }
    }

    /// Hands back a blank token.
    struct EmptyTokenTransport;

    #[async_trait]
    impl ChallengeTransport for EmptyTokenTransport {
        async fn validate(&self, _code: &OneTimeCode) -> TransportResult<SensitiveToken> {
            Ok(SensitiveToken::new(""))
        }
    }

    async fn wait_for_phase(controller: &SensitiveActionController, phase: ChallengePhase) {
        let mut rx = controller.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == phase && !s.loading))
            .await
            .expect("phase reached in time")
            .expect("controller alive");
    }

    #[tokio::test]
    async fn test_confirm_without_challenge_is_ignored() {
        let transport = Arc::new(AcceptingTransport::default());
        let controller = SensitiveActionController::new(transport.clone());

        controller.set_code("123456");
        assert_eq!(controller.confirm().await, ConfirmOutcome::Ignored);
        assert_eq!(transport.validated.load(Ordering::SeqCst), 0);
        assert!(controller.state().is_idle());
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let controller = SensitiveActionController::new(Arc::new(AcceptingTransport::default()));
        controller.cancel();
        controller.cancel();
        assert_eq!(controller.state(), ChallengeState::default());
    }

    #[tokio::test]
    async fn test_issue_failure_keeps_challenge_open() {
        let controller = Arc::new(SensitiveActionController::new(Arc::new(BrokenIssueTransport)));

        let caller = Arc::clone(&controller);
        let task = tokio::spawn(async move { caller.request_token().await });

        wait_for_phase(&controller, ChallengePhase::AwaitingCode).await;
        let state = controller.state();
        assert!(state.visible);
        assert_eq!(
            state.error_message.as_deref(),
            Some("network error: sms gateway down")
        );

        controller.set_code("123456");
        assert!(controller.state().error_message.is_none());
        assert!(controller.confirm().await.is_accepted());
        assert_eq!(task.await.unwrap(), Some(SensitiveToken::new("tok_abc")));
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let controller = Arc::new(SensitiveActionController::new(Arc::new(EmptyTokenTransport)));

        let caller = Arc::clone(&controller);
        let task = tokio::spawn(async move { caller.request_token().await });
        wait_for_phase(&controller, ChallengePhase::AwaitingCode).await;

        controller.set_code("123456");
        let outcome = controller.confirm().await;
        assert!(matches!(
            outcome,
            ConfirmOutcome::Rejected(TransportError::Unexpected(_))
        ));
        assert!(controller.state().visible);

        controller.cancel();
        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resend_reissues_code() {
        let transport = Arc::new(AcceptingTransport::default());
        let controller = Arc::new(SensitiveActionController::new(transport.clone()));

        let caller = Arc::clone(&controller);
        let task = tokio::spawn(async move { caller.request_token().await });
        wait_for_phase(&controller, ChallengePhase::AwaitingCode).await;

        assert!(controller.resend().await);
        assert_eq!(transport.issued.load(Ordering::SeqCst), 2);

        controller.cancel();
        assert_eq!(task.await.unwrap(), None);
        assert!(!controller.resend().await);
        assert_eq!(transport.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_caller_closes_challenge() {
        let controller = Arc::new(SensitiveActionController::new(Arc::new(
            AcceptingTransport::default(),
        )));

        let caller = Arc::clone(&controller);
        let task = tokio::spawn(async move { caller.request_token().await });
        wait_for_phase(&controller, ChallengePhase::AwaitingCode).await;

        task.abort();
        let _ = task.await;

        assert!(!controller.is_pending());
        assert!(!controller.state().visible);
    }

    #[tokio::test]
    async fn test_set_code_ignored_when_idle() {
        let controller = SensitiveActionController::new(Arc::new(AcceptingTransport::default()));
        controller.set_code("123456");
        assert!(controller.state().entered_code.is_empty());
    }

    #[tokio::test]
    async fn test_debug() {
        let controller = SensitiveActionController::new(Arc::new(AcceptingTransport::default()));
        let debug = format!("{controller:?}");
        assert!(debug.contains("SensitiveActionController"));
        assert!(debug.contains("Idle"));
    }
}
