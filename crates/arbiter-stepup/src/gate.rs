//! Integration contract for calling screens.
//!
//! A mutating action gated behind step-up verification:
//!
//! 1. validates its own form fields first, without touching the network
//! 2. requests a token; `None` means the operator cancelled, which is not an error
//! 3. spends the token on exactly one outgoing request
//! 4. never keeps the token afterwards
//!
//! Steps 3 and 4 are enforced by ownership: the token is moved into
//! [`GuardedAction::execute`] (or the closure given to [`with_token`]).

use std::future::Future;

use arbiter_core::{SensitiveAction, SensitiveToken};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::controller::SensitiveActionController;

/// Result of running an action through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    /// The operator confirmed and the action ran to completion.
    Completed(T),
    /// The operator cancelled the challenge; the action did not run.
    Cancelled,
}

impl<T> GateOutcome<T> {
    /// Whether the operator cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The action's output, if it ran.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// A mutating operation that the backend only accepts with a sensitive token.
#[async_trait]
pub trait GuardedAction: Send + Sized {
    /// What a successful run produces.
    type Output: Send;
    /// Validation or request failure.
    type Error: Send;

    /// Describe the action for logging.
    fn action(&self) -> SensitiveAction;

    /// Cheap, local validation of the form fields.
    ///
    /// Runs before a token is requested, so the operator is never asked for
    /// a code for a request that would be discarded anyway.
    ///
    /// # Errors
    ///
    /// Returns the validation failure to show next to the form.
    fn validate(&self) -> Result<(), Self::Error>;

    /// Perform the mutating request, attaching `token` to it.
    async fn execute(self, token: SensitiveToken) -> Result<Self::Output, Self::Error>;
}

/// Run `action` behind the step-up gate of `controller`.
///
/// # Errors
///
/// Returns the action's error if local validation fails (no token is
/// requested) or if the mutating request fails. Cancellation is reported as
/// [`GateOutcome::Cancelled`], not as an error.
pub async fn perform<A: GuardedAction>(
    controller: &SensitiveActionController,
    action: A,
) -> Result<GateOutcome<A::Output>, A::Error> {
    let described = action.action();
    action.validate()?;

    let Some(token) = controller.request_token().await else {
        info!(action = %described, "sensitive action aborted by operator");
        return Ok(GateOutcome::Cancelled);
    };

    debug!(action = %described, "running sensitive action");
    match action.execute(token).await {
        Ok(output) => Ok(GateOutcome::Completed(output)),
        Err(e) => {
            warn!(action = %described, "sensitive action failed");
            Err(e)
        },
    }
}

/// Closure form of [`perform`] for call sites without a dedicated action type.
///
/// Local validation is the caller's job and must happen before this call.
pub async fn with_token<F, Fut, T>(controller: &SensitiveActionController, f: F) -> GateOutcome<T>
where
    F: FnOnce(SensitiveToken) -> Fut,
    Fut: Future<Output = T>,
{
    match controller.request_token().await {
        Some(token) => GateOutcome::Completed(f(token).await),
        None => GateOutcome::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        let done: GateOutcome<u32> = GateOutcome::Completed(7);
        assert!(!done.is_cancelled());
        assert_eq!(done.completed(), Some(7));

        let cancelled: GateOutcome<u32> = GateOutcome::Cancelled;
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.completed(), None);
    }
}
