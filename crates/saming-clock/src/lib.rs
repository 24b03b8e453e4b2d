//! Ticketed one-shot phase timer for room actors.
//!
//! Turn-based rooms don't tick — they sleep until a single phase deadline
//! and otherwise react only to player messages. [`PhaseTimer`] holds at
//! most one pending deadline, tagged with a caller-chosen *ticket*
//! identifying the phase it was armed for. The room controller re-checks
//! the ticket when the timer fires, so a deadline that outlives its phase
//! (the host skipped ahead) is discarded instead of advancing the wrong
//! phase.
//!
//! # Integration
//!
//! The timer is designed to sit inside a room actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         ticket = timer.fired() => {
//!             let events = room.timer_fired(ticket);
//!             dispatch(events);
//!         }
//!     }
//!     timer.sync(room.timer_ticket().zip(remaining_deadline(&room)));
//! }
//! ```
//!
//! When nothing is armed, [`PhaseTimer::fired`] pends forever — the
//! `select!` simply never takes that branch.

use std::time::Duration;

use tokio::time::{self, Instant};

/// A one-shot deadline carrying a phase ticket.
///
/// One `PhaseTimer` per room actor. `T` is the ticket type — anything
/// small, copyable, and comparable (the room layer uses `(phase, round)`).
#[derive(Debug)]
pub struct PhaseTimer<T> {
    armed: Option<(T, Instant)>,
}

impl<T: Copy + Eq + std::fmt::Debug> PhaseTimer<T> {
    /// Creates an unarmed timer.
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Arms the timer to fire `after` from now, replacing any pending
    /// deadline.
    pub fn arm(&mut self, ticket: T, after: Duration) {
        tracing::debug!(?ticket, after_ms = after.as_millis() as u64, "timer armed");
        self.armed = Some((ticket, Instant::now() + after));
    }

    /// Drops the pending deadline, if any. Idempotent.
    pub fn cancel(&mut self) {
        if self.armed.take().is_some() {
            tracing::debug!("timer cancelled");
        }
    }

    /// The ticket of the pending deadline, if armed.
    pub fn ticket(&self) -> Option<T> {
        self.armed.map(|(ticket, _)| ticket)
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Reconciles the timer with what the room currently wants.
    ///
    /// `want` is the room's desired `(ticket, remaining)` — `None` when
    /// the current phase is untimed. A deadline already armed with the
    /// same ticket is left running; anything else is replaced. This is
    /// what lets the actor call `sync` after every operation without
    /// resetting a phase's deadline mid-phase.
    pub fn sync(&mut self, want: Option<(T, Duration)>) {
        match want {
            None => self.cancel(),
            Some((ticket, remaining)) => {
                if self.ticket() != Some(ticket) {
                    self.arm(ticket, remaining);
                }
            }
        }
    }

    /// Resolves with the ticket when the deadline passes, disarming the
    /// timer. Pends forever while unarmed.
    ///
    /// Cancellation-safe: dropping the future (another `select!` branch
    /// won) leaves the deadline armed.
    pub async fn fired(&mut self) -> T {
        let Some((ticket, deadline)) = self.armed else {
            std::future::pending::<()>().await;
            unreachable!()
        };
        time::sleep_until(deadline).await;
        self.armed = None;
        tracing::debug!(?ticket, "timer fired");
        ticket
    }
}

impl<T: Copy + Eq + std::fmt::Debug> Default for PhaseTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}
