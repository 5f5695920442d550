//! Mock implementations for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arbiter_core::{OneTimeCode, SensitiveToken};
use arbiter_stepup::{ChallengeTransport, TransportError, TransportResult};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::fixtures::TEST_TOKEN;

/// Mock implementation of [`ChallengeTransport`].
///
/// Validation results are taken from a queue; when the queue is empty the
/// default result is used (accept with [`TEST_TOKEN`]). Every call is
/// counted and every submitted code recorded.
///
/// Uses `std::sync::Mutex` internally so builder methods work without a
/// tokio runtime.
#[derive(Debug, Clone)]
pub struct MockChallengeTransport {
    /// Queued validation results.
    validate_results: Arc<Mutex<VecDeque<TransportResult<SensitiveToken>>>>,
    /// Queued issue results.
    issue_results: Arc<Mutex<VecDeque<TransportResult<()>>>>,
    /// Result used when the validation queue is empty; the token is minted
    /// fresh for every call.
    default_result: TransportResult<String>,
    /// Codes passed to `validate`, in order.
    codes: Arc<Mutex<Vec<String>>>,
    issue_calls: Arc<AtomicUsize>,
    validate_calls: Arc<AtomicUsize>,
    /// When set, `issue` waits for a permit before answering.
    issue_hold: Option<Arc<Semaphore>>,
    /// When set, `validate` waits for a permit before answering.
    validate_hold: Option<Arc<Semaphore>>,
}

impl MockChallengeTransport {
    /// Create a mock that accepts every code with [`TEST_TOKEN`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            validate_results: Arc::new(Mutex::new(VecDeque::new())),
            issue_results: Arc::new(Mutex::new(VecDeque::new())),
            default_result: Ok(TEST_TOKEN.to_string()),
            codes: Arc::new(Mutex::new(Vec::new())),
            issue_calls: Arc::new(AtomicUsize::new(0)),
            validate_calls: Arc::new(AtomicUsize::new(0)),
            issue_hold: None,
            validate_hold: None,
        }
    }

    /// Accept every code with the given token value by default.
    #[must_use]
    pub fn accept_with(mut self, token: impl Into<String>) -> Self {
        self.default_result = Ok(token.into());
        self
    }

    /// Reject every code with the given backend message by default.
    #[must_use]
    pub fn reject_with(mut self, message: impl Into<String>) -> Self {
        self.default_result = Err(TransportError::rejected(message));
        self
    }

    /// Queue a validation result.
    #[must_use]
    pub fn with_validate_result(self, result: TransportResult<SensitiveToken>) -> Self {
        self.queue_validate_result(result);
        self
    }

    /// Queue an issue result.
    #[must_use]
    pub fn with_issue_result(self, result: TransportResult<()>) -> Self {
        if let Ok(mut guard) = self.issue_results.lock() {
            guard.push_back(result);
        }
        self
    }

    /// Make `issue` block until [`MockChallengeTransport::release_issue`].
    #[must_use]
    pub fn holding_issue(mut self) -> Self {
        self.issue_hold = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held `issue` call answer.
    pub fn release_issue(&self) {
        if let Some(hold) = &self.issue_hold {
            hold.add_permits(1);
        }
    }

    /// Make `validate` block until [`MockChallengeTransport::release_validation`].
    #[must_use]
    pub fn holding_validation(mut self) -> Self {
        self.validate_hold = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held `validate` call answer.
    pub fn release_validation(&self) {
        if let Some(hold) = &self.validate_hold {
            hold.add_permits(1);
        }
    }

    /// Queue a validation result.
    pub fn queue_validate_result(&self, result: TransportResult<SensitiveToken>) {
        if let Ok(mut guard) = self.validate_results.lock() {
            guard.push_back(result);
        }
    }

    /// Number of `issue` calls made.
    #[must_use]
    pub fn issue_calls(&self) -> usize {
        self.issue_calls.load(Ordering::SeqCst)
    }

    /// Number of `validate` calls made.
    #[must_use]
    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    /// Codes submitted for validation, in order.
    #[must_use]
    pub fn submitted_codes(&self) -> Vec<String> {
        self.codes.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Default for MockChallengeTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChallengeTransport for MockChallengeTransport {
    async fn issue(&self) -> TransportResult<()> {
        self.issue_calls.fetch_add(1, Ordering::SeqCst);
        wait_for_permit(self.issue_hold.as_ref()).await?;
        self.issue_results
            .lock()
            .ok()
            .and_then(|mut g| g.pop_front())
            .unwrap_or(Ok(()))
    }

    async fn validate(&self, code: &OneTimeCode) -> TransportResult<SensitiveToken> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.codes.lock() {
            guard.push(code.as_str().to_string());
        }

        wait_for_permit(self.validate_hold.as_ref()).await?;

        self.validate_results
            .lock()
            .ok()
            .and_then(|mut g| g.pop_front())
            .unwrap_or_else(|| self.default_result.clone().map(SensitiveToken::new))
    }
}

async fn wait_for_permit(hold: Option<&Arc<Semaphore>>) -> TransportResult<()> {
    if let Some(hold) = hold {
        match hold.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(TransportError::Network("mock closed".to_string())),
        }
    }
    Ok(())
}
