//! Helpers for driving a controller from tests.

use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use arbiter_core::SensitiveToken;
use arbiter_stepup::{ChallengePhase, ChallengeState, SensitiveActionController};
use tokio::task::JoinHandle;

/// How long harness helpers wait for a state before giving up.
pub const STATE_TIMEOUT: Duration = Duration::from_secs(5);

static LOGGING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Spawn `request_token` on its own task, as a calling screen would, and
/// wait until the challenge is ready for a code.
///
/// # Panics
///
/// Panics if the challenge does not open within [`STATE_TIMEOUT`].
pub async fn spawn_request(
    controller: &Arc<SensitiveActionController>,
) -> JoinHandle<Option<SensitiveToken>> {
    let caller = Arc::clone(controller);
    let handle = tokio::spawn(async move { caller.request_token().await });
    wait_for_state(controller, |s| {
        s.phase == ChallengePhase::AwaitingCode && !s.loading
    })
    .await;
    handle
}

/// Wait until the controller's state satisfies `predicate`.
///
/// # Panics
///
/// Panics if the state is not reached within [`STATE_TIMEOUT`].
pub async fn wait_for_state(
    controller: &SensitiveActionController,
    predicate: impl FnMut(&ChallengeState) -> bool,
) -> ChallengeState {
    let mut rx = controller.subscribe();
    match tokio::time::timeout(STATE_TIMEOUT, rx.wait_for(predicate)).await {
        Ok(Ok(state)) => state.clone(),
        Ok(Err(_)) => panic!("controller dropped while waiting for state"),
        Err(_) => panic!(
            "timed out waiting for state, last seen: {:?}",
            controller.state()
        ),
    }
}
