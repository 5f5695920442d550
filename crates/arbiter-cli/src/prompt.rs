//! Terminal front end for the step-up challenge.
//!
//! The dialog runs as its own task next to the gated action. It watches the
//! controller's state, reads codes from the terminal while a challenge waits
//! for one, and drives `set_code`/`confirm`/`cancel`/`resend` exactly as a
//! graphical dialog would.

use std::future::Future;
use std::sync::Arc;

use arbiter_core::SensitiveAction;
use arbiter_stepup::{ChallengePhase, SensitiveActionController};
use dialoguer::{Input, theme::ColorfulTheme};
use tracing::debug;

use crate::theme::Theme;

/// What the operator typed at the code prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CodeInput {
    /// A code to submit.
    Code(String),
    /// Ask for a fresh code.
    Resend,
    /// Give up on the action.
    Cancel,
}

impl CodeInput {
    /// Interpret one line of input. Empty input cancels.
    pub(crate) fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Cancel,
            r if r.eq_ignore_ascii_case("r") => Self::Resend,
            code => Self::Code(code.to_owned()),
        }
    }
}

/// Binds a controller to the terminal.
pub(crate) struct CodePrompt {
    controller: Arc<SensitiveActionController>,
    max_attempts: u32,
}

impl CodePrompt {
    pub(crate) fn new(controller: Arc<SensitiveActionController>, max_attempts: u32) -> Self {
        Self {
            controller,
            max_attempts,
        }
    }

    /// Run `action` with the dialog attached, detaching it afterwards.
    pub(crate) async fn guard<F: Future>(&self, action: SensitiveAction, fut: F) -> F::Output {
        let dialog = tokio::spawn(drive(
            Arc::clone(&self.controller),
            action,
            self.max_attempts,
        ));
        let output = fut.await;
        dialog.abort();
        output
    }
}

async fn drive(controller: Arc<SensitiveActionController>, action: SensitiveAction, max_attempts: u32) {
    let mut rx = controller.subscribe();
    let mut attempts: u32 = 0;
    let mut announced = false;

    loop {
        let state = match rx
            .wait_for(|s| s.phase == ChallengePhase::AwaitingCode && !s.loading)
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => return,
        };

        if !announced {
            eprintln!(
                "\n{}",
                Theme::verification_box(
                    "Verification required",
                    &format!(
                        "To {action}, enter the 6-digit code sent to\nyour second factor. Leave empty to cancel,\ntype r to resend."
                    ),
                )
            );
            announced = true;
        }
        if let Some(message) = state.error_message.as_deref() {
            eprintln!("{}", Theme::error(message));
        }

        if attempts >= max_attempts {
            eprintln!("{}", Theme::warning("Too many attempts, giving up"));
            controller.cancel();
        } else {
            match read_input().await {
                CodeInput::Cancel => controller.cancel(),
                CodeInput::Resend => {
                    if controller.resend().await {
                        eprintln!("{}", Theme::info("A new code is on its way"));
                    }
                },
                CodeInput::Code(code) => {
                    attempts = attempts.saturating_add(1);
                    controller.set_code(code);
                    let outcome = controller.confirm().await;
                    debug!(attempt = attempts, accepted = outcome.is_accepted(), "code submitted");
                },
            }
        }

        if !controller.is_pending() {
            attempts = 0;
            announced = false;
        }
    }
}

async fn read_input() -> CodeInput {
    let line = tokio::task::spawn_blocking(|| {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Verification code")
            .allow_empty(true)
            .interact_text()
            .ok()
    })
    .await;

    match line {
        Ok(Some(line)) => CodeInput::parse(&line),
        // No terminal, or the read was interrupted.
        _ => CodeInput::Cancel,
    }
}
