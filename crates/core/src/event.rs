//! Event types for the deterministic engine.

use byzsim_types::Phase;

/// All timer-driven inputs the engine can receive.
///
/// Caller commands (start, advance, reset, reassign) are direct methods on
/// the engine because they report typed errors back to the caller; events
/// carry only the scheduled work the runner replays from its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A scheduled phase transition for an automatic round came due.
    ///
    /// Carries the round it was scheduled for; the engine ignores firings
    /// whose round no longer matches (stale timers after reset).
    PhaseTimer { round: u64, target: Phase },

    /// The inter-phase settling delay of a manual advance elapsed.
    SettleElapsed { round: u64 },
}
