//! Action types for the deterministic engine.

use crate::{Event, LogEvent};
use byzsim_types::Phase;
use std::time::Duration;

/// Identifies a cancellable timer.
///
/// Phase timers are keyed by the round that scheduled them so a reset can
/// cancel exactly the pending transitions of the stale round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Automatic-mode phase transition timer.
    Phase { round: u64, target: Phase },
    /// Manual-mode inter-phase settling timer.
    Settle { round: u64 },
}

impl TimerId {
    /// The event delivered when this timer fires.
    pub fn into_event(self) -> Event {
        match self {
            TimerId::Phase { round, target } => Event::PhaseTimer { round, target },
            TimerId::Settle { round } => Event::SettleElapsed { round },
        }
    }
}

/// Actions the engine wants the runner to perform.
///
/// Actions are **commands** - they describe something to do. The runner
/// executes them and converts timer firings back into events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set a timer to fire after a delay.
    SetTimer { id: TimerId, delay: Duration },

    /// Cancel a previously set timer. Cancelling an absent timer is a no-op.
    CancelTimer { id: TimerId },

    /// Publish a structured notification to the presentation stream.
    Emit(LogEvent),
}
