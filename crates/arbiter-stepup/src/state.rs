//! Observable state of the pending challenge.
//!
//! The controller publishes a fresh [`ChallengeState`] snapshot after every
//! transition. A dialog binds `visible`, `entered_code`, `error_message` and
//! `loading` directly; `phase` is the authoritative state machine:
//!
//! ```text
//!           request_token()            confirm() [well-formed code]
//!   Idle ───────────────────▶ AwaitingCode ─────────────────▶ Validating
//!    ▲                          │    ▲                            │
//!    │        cancel()          │    └── rejected or abandoned ───┤
//!    ├──────────────────────────┘                                 │
//!    └────────────────────── transport accepted ──────────────────┘
//! ```

use std::fmt;

/// Where the controller is in the step-up flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChallengePhase {
    /// No challenge open.
    #[default]
    Idle,
    /// Challenge open, waiting for the operator to enter and confirm a code.
    AwaitingCode,
    /// A code is being validated by the backend.
    Validating,
}

impl ChallengePhase {
    /// Whether a challenge is currently open.
    #[must_use]
    pub fn is_pending(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingCode => write!(f, "awaiting_code"),
            Self::Validating => write!(f, "validating"),
        }
    }
}

/// Snapshot of the pending challenge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChallengeState {
    /// State machine position.
    pub phase: ChallengePhase,
    /// Whether the challenge UI should be shown.
    pub visible: bool,
    /// What the operator has typed so far.
    pub entered_code: String,
    /// Last failure, shown inline. Cleared on new input and on each attempt.
    pub error_message: Option<String>,
    /// A backend call (issue or validate) is in flight.
    pub loading: bool,
}

impl ChallengeState {
    /// State right after a challenge is opened, before the code is issued.
    pub(crate) fn opened() -> Self {
        Self {
            phase: ChallengePhase::AwaitingCode,
            visible: true,
            entered_code: String::new(),
            error_message: None,
            loading: true,
        }
    }

    /// Whether this is the initial/terminal state.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == ChallengePhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle_and_hidden() {
        let state = ChallengeState::default();
        assert!(state.is_idle());
        assert!(!state.visible);
        assert!(!state.loading);
        assert!(state.entered_code.is_empty());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_opened_state() {
        let state = ChallengeState::opened();
        assert_eq!(state.phase, ChallengePhase::AwaitingCode);
        assert!(state.visible);
        assert!(state.phase.is_pending());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(ChallengePhase::AwaitingCode.to_string(), "awaiting_code");
        assert!(!ChallengePhase::Idle.is_pending());
        assert!(ChallengePhase::Validating.is_pending());
    }
}
