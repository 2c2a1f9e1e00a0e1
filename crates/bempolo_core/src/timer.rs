//! crates/bempolo_core/src/timer.rs
//!
//! Session-owned cancellation for anything that completes after a suspension:
//! scripted delays and external calls.
//!
//! Every session owns a [`SessionClock`]. Before suspending, a flow takes a
//! [`Ticket`]; when the suspension ends it applies its effect only if the clock
//! still accepts that ticket. Closing or resetting the session cancels the
//! clock's token (waking every pending ticket) and bumps the generation, so a
//! late effect can never land on a dismissed or replaced session.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct SessionClock {
    generation: u64,
    token: CancellationToken,
    pending: Option<JoinHandle<()>>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            generation: 0,
            token: CancellationToken::new(),
            pending: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            token: self.token.clone(),
        }
    }

    /// True while the ticket's generation is live and not cancelled.
    pub fn accepts(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && !self.token.is_cancelled()
    }

    /// Keeps the handle of a spawned timer so it can be aborted on reset.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.pending.replace(handle) {
            if !previous.is_finished() {
                previous.abort();
            }
        }
    }

    /// Invalidates all outstanding tickets and starts a fresh generation.
    pub fn reset(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.token = CancellationToken::new();
        self.generation += 1;
    }

    /// Invalidates all outstanding tickets for good.
    pub fn shutdown(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Permission to apply one effect, valid for the generation it was taken in.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sleeps for `delay`. Returns `false` if the session was cancelled first.
    pub async fn sleep(&self, delay: Duration) -> bool {
        self.run(tokio::time::sleep(delay)).await.is_some()
    }

    /// Drives `fut` to completion unless the session is cancelled first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
