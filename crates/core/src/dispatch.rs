//! Dispatch state machine.
//!
//! ```text
//! Idle ──begin──▶ Sending ──finish──▶ Sent
//!                    │
//!                    └─────finish───▶ Failed(reason)
//! ```
//!
//! `begin` is refused while `Sending`, which is what keeps a second click
//! from producing a second send. From `Sent` or `Failed` a new attempt may
//! begin; nothing retries on its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::ValidationError;

/// Errors from a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The request was incomplete; nothing was sent.
    #[error("invalid dispatch request: {0}")]
    Validation(#[from] ValidationError),

    /// Another attempt is still being sent.
    #[error("a dispatch is already in flight")]
    InFlight,

    /// The gateway refused the message or could not be reached.
    #[error("messaging gateway error: {reason}")]
    Gateway {
        /// Gateway-reported error text, or a generic description.
        reason: String,
    },
}

impl DispatchError {
    /// Message to show the user, with a fallback contact for gateway failures.
    #[must_use]
    pub fn user_message(&self, store_contact: Option<&str>) -> String {
        match self {
            Self::Validation(e) => format!("Please check your details: {e}."),
            Self::InFlight => "Your message is still being sent.".to_string(),
            Self::Gateway { reason } => {
                let retry = format!("We could not send your message ({reason}). Please try again");
                match store_contact {
                    Some(contact) => format!("{retry}, or contact us directly on {contact}."),
                    None => format!("{retry}."),
                }
            }
        }
    }
}

/// Lifecycle of the dispatch control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DispatchState {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// Waiting for the gateway.
    Sending,
    /// The gateway accepted the message.
    Sent,
    /// The attempt failed; carries a human-readable reason.
    Failed(String),
}

impl DispatchState {
    /// Whether a new attempt may start.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !matches!(self, Self::Sending)
    }

    /// Whether an attempt is in flight.
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        matches!(self, Self::Sending)
    }

    /// Whether the state is `Sent` or `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed(_))
    }

    /// Enter `Sending`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InFlight`] if already sending.
    pub fn begin(&mut self) -> Result<(), DispatchError> {
        if self.is_sending() {
            return Err(DispatchError::InFlight);
        }
        *self = Self::Sending;
        Ok(())
    }

    /// Leave `Sending` with the outcome of the attempt.
    pub fn finish(&mut self, outcome: Result<(), &DispatchError>) {
        *self = match outcome {
            Ok(()) => Self::Sent,
            Err(e) => Self::Failed(e.to_string()),
        };
    }

    /// Return to `Idle`, unless an attempt is in flight.
    pub fn reset(&mut self) {
        if !self.is_sending() {
            *self = Self::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_while_sending_is_refused() {
        let mut state = DispatchState::default();
        assert!(state.begin().is_ok());
        assert_eq!(state.begin(), Err(DispatchError::InFlight));
        assert!(!state.can_submit());
    }

    #[test]
    fn test_failed_is_terminal_but_resubmittable() {
        let mut state = DispatchState::Idle;
        state.begin().unwrap_or_default();
        state.finish(Err(&DispatchError::Gateway {
            reason: "rate limited".to_string(),
        }));

        assert!(state.is_terminal());
        assert!(matches!(&state, DispatchState::Failed(r) if r.contains("rate limited")));
        assert!(state.begin().is_ok());
        assert!(state.is_sending());
    }

    #[test]
    fn test_reset_does_not_interrupt_sending() {
        let mut state = DispatchState::Sending;
        state.reset();
        assert_eq!(state, DispatchState::Sending);

        state.finish(Ok(()));
        assert_eq!(state, DispatchState::Sent);
        state.reset();
        assert_eq!(state, DispatchState::Idle);
    }

    #[test]
    fn test_gateway_failure_message_suggests_contact() {
        let err = DispatchError::Gateway {
            reason: "invalid number".to_string(),
        };
        let msg = err.user_message(Some("+263242700000"));
        assert!(msg.contains("invalid number"));
        assert!(msg.contains("try again"));
        assert!(msg.contains("+263242700000"));
    }
}
