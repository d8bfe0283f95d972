//! Single-flight order dispatcher.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tradepost_core::{DispatchError, DispatchRequest, DispatchState, MessageComposer};

use crate::gateway::MessagingGateway;

/// Validates, renders and sends dispatch requests, one at a time.
///
/// The dispatcher owns the [`DispatchState`] behind the submit control. It
/// never touches the cart; see [`checkout`](crate::checkout::checkout).
#[derive(Debug)]
pub struct OrderDispatcher<G> {
    composer: MessageComposer,
    gateway: G,
    state: Mutex<DispatchState>,
}

impl<G: MessagingGateway> OrderDispatcher<G> {
    #[must_use]
    pub fn new(composer: MessageComposer, gateway: G) -> Self {
        Self {
            composer,
            gateway,
            state: Mutex::new(DispatchState::Idle),
        }
    }

    /// Current state of the submit control.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.lock().clone()
    }

    /// Return to `Idle` after showing a result. Ignored while sending.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// The composer used to render messages.
    #[must_use]
    pub const fn composer(&self) -> &MessageComposer {
        &self.composer
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// User-facing text for a failed dispatch.
    #[must_use]
    pub fn failure_message(&self, error: &DispatchError) -> String {
        error.user_message(self.composer.store_phone().as_deref())
    }

    /// Validate and send `request` once.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Validation`] before anything is sent; the state is
    ///   left as it was.
    /// - [`DispatchError::InFlight`] while another attempt is sending.
    /// - [`DispatchError::Gateway`] when the gateway refuses or cannot be
    ///   reached; the state becomes `Failed`.
    #[tracing::instrument(skip_all, fields(order = request.is_order()))]
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        let message = self.composer.build(request)?;

        let attempt = Attempt::begin(&self.state)?;
        let outcome = self
            .gateway
            .send(&message)
            .await
            .map_err(|e| DispatchError::Gateway { reason: e.reason() });

        match &outcome {
            Ok(()) => tracing::info!(recipient = %message.recipient_phone, "Message dispatched"),
            Err(e) => tracing::warn!(error = %e, "Dispatch failed"),
        }
        attempt.finish(outcome.as_ref().map(|_| ()));
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<DispatchState>) -> MutexGuard<'_, DispatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An attempt in `Sending`. Dropping it unfinished returns the state to `Idle`.
struct Attempt<'a> {
    state: &'a Mutex<DispatchState>,
    finished: bool,
}

impl<'a> Attempt<'a> {
    fn begin(state: &'a Mutex<DispatchState>) -> Result<Self, DispatchError> {
        lock(state).begin()?;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, outcome: Result<(), &DispatchError>) {
        lock(self.state).finish(outcome);
        self.finished = true;
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = DispatchState::Idle;
        }
    }
}
