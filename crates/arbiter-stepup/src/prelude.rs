//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbiter_stepup::prelude::*;` to import all essential types.

pub use crate::{
    ChallengePhase, ChallengeState, ChallengeTransport, ConfirmOutcome, GateOutcome,
    GuardedAction, OneTimeCode, SensitiveActionController, SensitiveToken, TransportError,
    TransportResult, perform, with_token,
};
